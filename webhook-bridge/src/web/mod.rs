//! Web server module for the WhatsApp webhook.
//!
//! - `GET /webhook` answers the subscription handshake
//! - `POST /webhook` turns each inbound message into one flow trigger
//! - `GET /health` for container probes

pub mod handlers;
pub mod verify;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{health, receive_webhook, verify_webhook, AppState, HealthResponse, SERVICE_NAME};
pub use verify::{verify_subscription, VerificationRequest};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
