//! Flowbridge - WhatsApp webhook bridge.
//!
//! Verifies the WhatsApp Business webhook subscription and answers every
//! inbound user message with a fixed onboarding Flow sent through the Graph API.
//!
//! ## Request Flow
//!
//! ```text
//! WhatsApp → POST /webhook → extract_message → FlowInvocation → Graph API /messages
//! ```

pub mod config;
pub mod graph;
pub mod web;
pub mod whatsapp;

// Re-export commonly used types
pub use config::{Config, ConfigError, FlowConfig};
pub use graph::{GraphClient, GraphError, GraphResponse};
pub use web::{router, AppState};
pub use whatsapp::{FlowInvocation, InboundMessage};
