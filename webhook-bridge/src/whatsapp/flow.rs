//! Outbound interactive flow message.
//!
//! Every inbound message is answered with the same onboarding flow, so the
//! only per-request input is the recipient.

use serde::Serialize;

use crate::config::FlowConfig;

/// Flow message schema version understood by the Graph API.
pub const FLOW_MESSAGE_VERSION: &str = "3";

/// One flow trigger addressed to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowInvocation {
    pub recipient: String,
    pub flow_id: String,
    pub flow_token: String,
    pub cta_label: String,
    pub body: String,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub screen: Option<String>,
}

impl FlowInvocation {
    /// Build the onboarding flow for `recipient`.
    pub fn onboarding(flow: &FlowConfig, recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            flow_id: flow.flow_id.clone(),
            flow_token: flow.flow_token.clone(),
            cta_label: flow.cta.clone(),
            body: flow.body.clone(),
            header: flow.header.clone(),
            footer: flow.footer.clone(),
            screen: flow.screen.clone(),
        }
    }

    /// Graph API `/messages` request body.
    pub fn to_message(&self) -> FlowMessage<'_> {
        FlowMessage {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: &self.recipient,
            kind: "interactive",
            interactive: Interactive {
                kind: "flow",
                header: self.header.as_deref().map(|text| Header { kind: "text", text }),
                body: Text { text: &self.body },
                footer: self.footer.as_deref().map(|text| Text { text }),
                action: Action {
                    name: "flow",
                    parameters: FlowParameters {
                        flow_message_version: FLOW_MESSAGE_VERSION,
                        flow_token: &self.flow_token,
                        flow_id: &self.flow_id,
                        flow_cta: &self.cta_label,
                        flow_action: "navigate",
                        flow_action_payload: self
                            .screen
                            .as_deref()
                            .map(|screen| ActionPayload { screen }),
                    },
                },
            },
        }
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FlowMessage<'a> {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub interactive: Interactive<'a>,
}

#[derive(Debug, Serialize)]
pub struct Interactive<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header<'a>>,
    pub body: Text<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Text<'a>>,
    pub action: Action<'a>,
}

#[derive(Debug, Serialize)]
pub struct Header<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Text<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Action<'a> {
    pub name: &'static str,
    pub parameters: FlowParameters<'a>,
}

#[derive(Debug, Serialize)]
pub struct FlowParameters<'a> {
    pub flow_message_version: &'static str,
    pub flow_token: &'a str,
    pub flow_id: &'a str,
    pub flow_cta: &'a str,
    pub flow_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_action_payload: Option<ActionPayload<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ActionPayload<'a> {
    pub screen: &'a str,
}
