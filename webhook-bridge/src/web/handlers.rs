//! Webhook endpoint handlers.
//!
//! The POST handler always acknowledges with `200 OK`: WhatsApp retries any
//! other status, and a payload that failed once will fail again.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::graph::GraphClient;
use crate::web::verify::{verify_subscription, VerificationRequest};
use crate::whatsapp::{extract_message, FlowInvocation, PayloadError};
use crate::Config;

/// Name reported by the health check.
pub const SERVICE_NAME: &str = "whatsapp-flow-bridge";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph: GraphClient,
}

impl AppState {
    pub fn new(config: Config, graph: GraphClient) -> Self {
        Self {
            config: Arc::new(config),
            graph,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

// =============================================================================
// Subscription Handshake
// =============================================================================

/// `GET /webhook`: echo the challenge if the verify token matches.
///
/// An undecodable query string fails the handshake like any other mismatch.
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let request = match query {
        Ok(Query(pairs)) => VerificationRequest::from_pairs(pairs),
        Err(e) => {
            warn!(error = %e, "webhook_verify_query_invalid");
            return (StatusCode::FORBIDDEN, "Verification failed").into_response();
        }
    };

    info!(
        mode = ?request.mode,
        has_token = request.token.is_some(),
        has_challenge = request.challenge.is_some(),
        "webhook_verify_received"
    );

    match verify_subscription(&request, &state.config.verify_token) {
        Some(challenge) => {
            info!("webhook_verified");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                challenge.to_string(),
            )
                .into_response()
        }
        None => (StatusCode::FORBIDDEN, "Verification failed").into_response(),
    }
}

// =============================================================================
// Inbound Messages
// =============================================================================

/// `POST /webhook`: answer every inbound message with the onboarding flow.
///
/// The body is taken as raw bytes so that malformed JSON or a missing
/// content type is logged here instead of being rejected by an extractor.
/// A body that cannot be buffered (over the size limit, aborted upload) is
/// acknowledged as well.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> (StatusCode, &'static str) {
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            warn!(status_code = e.status().as_u16(), error = %e, "webhook_body_unreadable");
            return (StatusCode::OK, "OK");
        }
    };

    info!(body_length = body.len(), "webhook_received");

    let message = match extract_message(&body) {
        Ok(message) => message,
        Err(PayloadError::NoMessages { statuses }) => {
            info!(statuses = statuses, "webhook_without_messages");
            return (StatusCode::OK, "OK");
        }
        Err(e) => {
            warn!(reason = e.kind(), error = %e, "webhook_payload_unusable");
            return (StatusCode::OK, "OK");
        }
    };

    info!(
        from = %message.sender_phone_number,
        message_id = ?message.message_id,
        message_type = %message.kind,
        text_length = message.text_body.len(),
        "webhook_message_extracted"
    );

    let invocation = FlowInvocation::onboarding(&state.config.flow, message.sender_phone_number);

    if let Err(e) = state.graph.send_flow(&invocation).await {
        error!(to = %invocation.recipient, error = %e, "onboarding_flow_failed");
    }

    (StatusCode::OK, "OK")
}
