//! Graph API client for the WhatsApp `/messages` endpoint.
//!
//! The client is cheap to clone and shared by every request handler. It makes
//! exactly one attempt per call; failures are reported to the caller, which
//! only logs them.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::whatsapp::FlowInvocation;
use crate::Config;

/// Errors from a Graph API call.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid Graph API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Graph API request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Graph API request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Status and raw body returned by the Graph API.
#[derive(Debug, Clone)]
pub struct GraphResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Client for sending WhatsApp messages through the Graph API.
#[derive(Clone)]
pub struct GraphClient {
    inner: Arc<GraphClientInner>,
}

struct GraphClientInner {
    http: Client,
    messages_url: Url,
    access_token: String,
}

impl GraphClient {
    /// Create a client for the phone number and API version in `config`.
    pub fn new(config: &Config) -> Result<Self, GraphError> {
        let messages_url = messages_url(
            &config.graph_api_base_url,
            &config.graph_api_version,
            &config.phone_number_id,
        )?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.graph_request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GraphError::Client)?;

        Ok(Self {
            inner: Arc::new(GraphClientInner {
                http,
                messages_url,
                access_token: config.access_token.clone(),
            }),
        })
    }

    /// Fully resolved `/messages` endpoint.
    pub fn messages_url(&self) -> &Url {
        &self.inner.messages_url
    }

    /// Send one interactive flow message.
    ///
    /// Any HTTP response, including 4xx/5xx, is returned as `Ok`; only
    /// transport failures are errors.
    pub async fn send_flow(&self, invocation: &FlowInvocation) -> Result<GraphResponse, GraphError> {
        info!(
            to = %invocation.recipient,
            flow_id = %invocation.flow_id,
            "graph_flow_send_starting"
        );

        let result = self
            .inner
            .http
            .post(self.inner.messages_url.clone())
            .bearer_auth(&self.inner.access_token)
            .json(&invocation.to_message())
            .send()
            .await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                error!(to = %invocation.recipient, error = %e, "graph_flow_send_timeout");
                return Err(GraphError::Timeout(e));
            }
            Err(e) => {
                error!(to = %invocation.recipient, error = %e, "graph_flow_send_error");
                return Err(GraphError::Transport(e));
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status_code = status.as_u16(), error = %e, "graph_response_body_unreadable");
                String::new()
            }
        };
        let response = GraphResponse { status, body };

        if status.is_success() {
            info!(
                to = %invocation.recipient,
                status_code = status.as_u16(),
                response = %response.body,
                "graph_flow_sent"
            );
        } else {
            warn!(
                to = %invocation.recipient,
                status_code = status.as_u16(),
                response = %response.body,
                "graph_flow_rejected"
            );
        }

        Ok(response)
    }
}

/// Build `{base}/{version}/{phone_number_id}/messages`.
fn messages_url(base: &str, version: &str, phone_number_id: &str) -> Result<Url, GraphError> {
    let mut base = Url::parse(base)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!(
        "{}/{}/messages",
        version.trim_matches('/'),
        phone_number_id
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_default_host() {
        let url = messages_url("https://graph.facebook.com", "v19.0", "106540352242922").unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/v19.0/106540352242922/messages"
        );
    }

    #[test]
    fn test_messages_url_keeps_base_path() {
        let url = messages_url("http://127.0.0.1:9000/graph", "/v20.0/", "42").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/graph/v20.0/42/messages");
    }

    #[test]
    fn test_messages_url_invalid_base() {
        let err = messages_url("not a url", "v19.0", "42").unwrap_err();
        assert!(matches!(err, GraphError::InvalidEndpoint(_)));
    }
}
