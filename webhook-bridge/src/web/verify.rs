//! Webhook subscription handshake.
//!
//! When a callback URL is registered, Meta sends
//! `GET /webhook?hub.mode=subscribe&hub.verify_token=...&hub.challenge=...`
//! and expects the challenge echoed back.
//! Reference: https://developers.facebook.com/docs/graph-api/webhooks/getting-started#verification-requests

use tracing::warn;

/// Mode Meta sends when subscribing a callback URL.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Handshake query parameters.
///
/// All fields are optional so that a malformed handshake is rejected with 403
/// rather than a query extraction error.
#[derive(Debug, Default)]
pub struct VerificationRequest {
    pub mode: Option<String>,
    pub token: Option<String>,
    pub challenge: Option<String>,
}

impl VerificationRequest {
    /// Build from decoded query pairs. The first occurrence of a repeated
    /// key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut request = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "hub.mode" => &mut request.mode,
                "hub.verify_token" => &mut request.token,
                "hub.challenge" => &mut request.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        request
    }
}

/// Check a handshake against the configured verify token.
///
/// Returns the challenge to echo on success, `None` on failure. A missing
/// challenge on an otherwise valid handshake echoes an empty string.
pub fn verify_subscription<'a>(
    request: &'a VerificationRequest,
    expected_token: &str,
) -> Option<&'a str> {
    if request.mode.as_deref() != Some(SUBSCRIBE_MODE) {
        warn!(mode = ?request.mode, "webhook_verify_wrong_mode");
        return None;
    }

    let token = match request.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => {
            warn!("webhook_verify_token_missing");
            return None;
        }
    };

    if expected_token.is_empty() || !constant_time_eq(token.as_bytes(), expected_token.as_bytes()) {
        warn!("webhook_verify_token_mismatch");
        return None;
    }

    Some(request.challenge.as_deref().unwrap_or(""))
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
