//! WhatsApp Cloud API message types.
//!
//! - `payload`: inbound webhook envelope and message extraction
//! - `flow`: outbound interactive flow message

pub mod flow;
pub mod payload;

pub use flow::{FlowInvocation, FlowMessage, FLOW_MESSAGE_VERSION};
pub use payload::{extract_message, InboundMessage, PayloadError, WebhookEnvelope};
