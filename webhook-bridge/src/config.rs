//! Configuration module for environment variable parsing.
//!
//! Every setting is read once at startup. Several settings accept more than one
//! variable name because deployments have used both the legacy names
//! (`Whatsapp_ID`, `VERIFY_TOKEN`) and the newer `WHATSAPP_*` ones.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default Graph API host.
pub const DEFAULT_GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";

/// Graph API version the messages endpoint is pinned to.
pub const DEFAULT_GRAPH_API_VERSION: &str = "v19.0";

/// Label on the button that opens the flow.
pub const DEFAULT_FLOW_CTA: &str = "Get Started";

/// Body text of the interactive flow message.
pub const DEFAULT_FLOW_BODY: &str = "Welcome! Tap below to get started.";

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {setting} (set one of: {})", .vars.join(", "))]
    Missing {
        setting: &'static str,
        vars: &'static [&'static str],
    },

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Static content of the onboarding flow message.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Published flow identifier
    pub flow_id: String,

    /// Opaque token echoed back by WhatsApp when the flow completes
    pub flow_token: String,

    /// Call-to-action button label
    pub cta: String,

    /// Interactive message body text
    pub body: String,

    /// Optional text header
    pub header: Option<String>,

    /// Optional footer
    pub footer: Option<String>,

    /// First screen to navigate to, if the flow should not start at its default
    pub screen: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret for the subscription handshake
    pub verify_token: String,

    /// Bearer token for Graph API calls
    pub access_token: String,

    /// WhatsApp Business phone number id the messages are sent from
    pub phone_number_id: String,

    /// Graph API host, overridable for staging and tests
    pub graph_api_base_url: String,

    /// Graph API version segment, e.g. `v19.0`
    pub graph_api_version: String,

    /// Optional timeout for outbound Graph API calls
    pub graph_request_timeout: Option<Duration>,

    /// Onboarding flow sent in reply to every message
    pub flow: FlowConfig,

    // =========================================================================
    // Present in the deployment environment but unused by the bridge
    // =========================================================================
    /// Document store connection string
    pub mongo_uri: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let first = |vars: &[&str]| vars.iter().find_map(|name| get(name));
        let require = |setting: &'static str, vars: &'static [&'static str]| {
            first(vars).ok_or(ConfigError::Missing { setting, vars })
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            None => 5000,
        };

        let graph_request_timeout = match get("GRAPH_REQUEST_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    warn!(
                        env_var = "GRAPH_REQUEST_TIMEOUT_MS",
                        value = %raw,
                        "Invalid timeout, outbound calls will not time out"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(Config {
            port,

            verify_token: require("verify token", &["VERIFY_TOKEN", "WHATSAPP_VERIFY_TOKEN"])?,

            access_token: require(
                "access token",
                &["WHATSAPP_ACCESS_TOKEN", "WHATSAPP_TOKEN"],
            )?,

            phone_number_id: require(
                "phone number id",
                &["Whatsapp_ID", "WHATSAPP_ID", "WHATSAPP_PHONE_NUMBER_ID"],
            )?,

            graph_api_base_url: get("GRAPH_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GRAPH_API_BASE_URL.to_string()),

            graph_api_version: get("GRAPH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.to_string()),

            graph_request_timeout,

            flow: FlowConfig {
                flow_id: require("flow id", &["FLOW_ID"])?,
                flow_token: require("flow token", &["FLOW_TOKEN"])?,
                cta: get("FLOW_CTA").unwrap_or_else(|| DEFAULT_FLOW_CTA.to_string()),
                body: get("FLOW_BODY").unwrap_or_else(|| DEFAULT_FLOW_BODY.to_string()),
                header: get("FLOW_HEADER"),
                footer: get("FLOW_FOOTER"),
                screen: get("FLOW_SCREEN"),
            },

            mongo_uri: get("MONGO_URI"),

            openai_api_key: first(&["API_KEY_OPENAI", "OPENAI_API_KEY"]),
        })
    }
}
