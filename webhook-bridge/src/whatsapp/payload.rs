//! Inbound webhook envelope parsing.
//!
//! WhatsApp nests every notification as
//! `entry[].changes[].value.messages[]`. Only the first message of the first
//! change of the first entry is forwarded.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;

/// Why an inbound body did not yield a message.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid webhook JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("webhook has no entries")]
    NoEntry,

    #[error("entry has no changes")]
    NoChange,

    #[error("change has no value")]
    NoValue,

    #[error("change carries no messages ({statuses} status updates)")]
    NoMessages { statuses: usize },

    #[error("message has no sender")]
    MissingSender,
}

impl PayloadError {
    /// Short snake_case tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PayloadError::InvalidJson(_) => "invalid_json",
            PayloadError::NoEntry => "no_entry",
            PayloadError::NoChange => "no_change",
            PayloadError::NoValue => "no_value",
            PayloadError::NoMessages { .. } => "no_messages",
            PayloadError::MissingSender => "missing_sender",
        }
    }
}

/// Top-level webhook notification.
///
/// Lists are kept untyped; only the element on the forwarded path is
/// deserialized, so a malformed sibling cannot spoil it.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub entry: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<Value>,
    /// Delivery/read receipts; only counted
    #[serde(default)]
    pub statuses: Vec<Value>,
}

/// A message as it appears on the wire.
#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: String,
}

/// The sender and text of a forwarded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender's phone number in WhatsApp's international format, no `+`
    pub sender_phone_number: String,
    /// Text body, empty for non-text messages
    pub text_body: String,
    /// Message type as reported by WhatsApp (`text`, `image`, ...)
    pub kind: String,
    /// WhatsApp message id (`wamid.*`), if present
    pub message_id: Option<String>,
}

/// Deserialize the first element of an untyped list.
fn first_of<T: DeserializeOwned>(items: Vec<Value>, empty: PayloadError) -> Result<T, PayloadError> {
    let item = items.into_iter().next().ok_or(empty)?;
    Ok(serde_json::from_value(item)?)
}

impl WebhookEnvelope {
    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Pull the first message out of the envelope.
    pub fn first_message(self) -> Result<InboundMessage, PayloadError> {
        let entry: Entry = first_of(self.entry, PayloadError::NoEntry)?;
        let change: Change = first_of(entry.changes, PayloadError::NoChange)?;
        let value = change.value.ok_or(PayloadError::NoValue)?;
        let statuses = value.statuses.len();
        let message: RawMessage = first_of(value.messages, PayloadError::NoMessages { statuses })?;

        let sender_phone_number = message
            .from
            .filter(|from| !from.is_empty())
            .ok_or(PayloadError::MissingSender)?;

        Ok(InboundMessage {
            sender_phone_number,
            text_body: message.text.map(|t| t.body).unwrap_or_default(),
            kind: message.kind.unwrap_or_else(|| "unknown".to_string()),
            message_id: message.id,
        })
    }
}

/// Parse a raw body and extract its first message.
pub fn extract_message(body: &[u8]) -> Result<InboundMessage, PayloadError> {
    WebhookEnvelope::from_slice(body)?.first_message()
}
