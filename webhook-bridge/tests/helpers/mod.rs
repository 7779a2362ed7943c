//! Test helpers for HTTP integration tests.
//!
//! `TestApp` drives the real router through `tower::ServiceExt::oneshot`.
//! `MockGraph` is a Graph API stand-in served by axum on an ephemeral port
//! that records every request it receives.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode, Uri};
use axum::Router;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

use flowbridge::{router, AppState, Config, GraphClient};

pub const VERIFY_TOKEN: &str = "s3cret-verify";
pub const ACCESS_TOKEN: &str = "EAAG-test-access";
pub const PHONE_NUMBER_ID: &str = "106540352242922";
pub const FLOW_ID: &str = "1187351356327089";
pub const FLOW_TOKEN: &str = "onboarding-v1";
pub const FLOW_CTA: &str = "Start shopping";

/// A request received by the mock Graph API.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    status: StatusCode,
}

/// Graph API stand-in.
pub struct MockGraph {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockGraph {
    /// Serve a mock that answers every request with `status`.
    pub async fn start(status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            status,
        };
        let app = Router::new().fallback(capture).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Graph API");
        let addr = listener.local_addr().expect("mock has no local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock Graph API failed");
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

async fn capture(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let captured = CapturedRequest {
        method,
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };
    state.requests.lock().expect("mock lock poisoned").push(captured);

    let reply = if state.status.is_success() {
        r#"{"messaging_product":"whatsapp","messages":[{"id":"wamid.test"}]}"#
    } else {
        r#"{"error":{"message":"Invalid OAuth access token.","code":190}}"#
    };
    (state.status, reply.to_string())
}

/// Configuration pointing at `graph_base_url`.
pub fn test_config(graph_base_url: &str) -> Config {
    let vars = [
        ("WHATSAPP_ACCESS_TOKEN", ACCESS_TOKEN.to_string()),
        ("VERIFY_TOKEN", VERIFY_TOKEN.to_string()),
        ("Whatsapp_ID", PHONE_NUMBER_ID.to_string()),
        ("FLOW_ID", FLOW_ID.to_string()),
        ("FLOW_TOKEN", FLOW_TOKEN.to_string()),
        ("FLOW_CTA", FLOW_CTA.to_string()),
        ("GRAPH_API_BASE_URL", graph_base_url.to_string()),
        ("GRAPH_REQUEST_TIMEOUT_MS", "5000".to_string()),
    ];
    Config::from_lookup(|name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    })
    .expect("test config must be complete")
}

/// The full router wired to a Graph API at `graph_base_url`.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(graph_base_url: &str) -> Self {
        let config = test_config(graph_base_url);
        let graph = GraphClient::new(&config).expect("Failed to create Graph client");
        Self {
            router: router(AppState::new(config, graph)),
        }
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("invalid request");
        self.oneshot(request).await
    }

    pub async fn post_json(&self, body: impl Into<String>) -> Response<Body> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .expect("invalid request");
        self.oneshot(request).await
    }
}

/// Collect a response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body is not UTF-8")
}

/// A webhook notification carrying one text message.
pub fn text_message_webhook(from: &str, text: &str) -> String {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "102290129340398",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {
                        "display_phone_number": "15550783881",
                        "phone_number_id": PHONE_NUMBER_ID
                    },
                    "contacts": [{"profile": {"name": "Customer"}, "wa_id": from}],
                    "messages": [{
                        "from": from,
                        "id": "wamid.HBgLMjU0NzEyMzQ1Njc4FQIAEhgg",
                        "timestamp": "1749416383",
                        "type": "text",
                        "text": {"body": text}
                    }]
                }
            }]
        }]
    })
    .to_string()
}
