//! Webhook signature verification.
//!
//! The receiver only depends on the [`SignatureVerifier`] verdict contract.
//! [`HmacSha256Verifier`] is the default scheme: the `X-Webhook-Signature`
//! header carries the lowercase hex HMAC-SHA256 of the raw body, optionally
//! prefixed with `sha256=`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use super::types::WebhookEvent;

type HmacSha256 = Hmac<Sha256>;

/// A parsed, authenticated event batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub events: Vec<WebhookEvent>,
}

/// Verdict returned by a [`SignatureVerifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub valid: bool,
    /// Set only when `valid` is false.
    pub error: Option<String>,
    pub payload: Option<WebhookPayload>,
}

impl Verification {
    pub fn valid(payload: WebhookPayload) -> Self {
        Self {
            valid: true,
            error: None,
            payload: Some(payload),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
            payload: None,
        }
    }
}

/// Decides whether a payload is authentic and parses it if so.
///
/// Implementations must be deterministic and must report malformed input
/// as an invalid verdict, never by panicking.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, payload: &[u8], signature: &str, secret: &str) -> Verification;
}

/// HMAC-SHA256 over the raw body, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Verifier;

impl SignatureVerifier for HmacSha256Verifier {
    fn verify(&self, payload: &[u8], signature: &str, secret: &str) -> Verification {
        let signature = signature.trim();
        if signature.is_empty() {
            return Verification::invalid("missing signature");
        }
        if secret.is_empty() {
            return Verification::invalid("webhook secret not configured");
        }

        let provided = signature.strip_prefix("sha256=").unwrap_or(signature);
        let expected = sign(secret, payload);

        if !constant_time_compare(&expected, &provided.to_ascii_lowercase()) {
            debug!(
                expected_length = expected.len(),
                actual_length = provided.len(),
                "webhook_signature_mismatch"
            );
            return Verification::invalid("signature mismatch");
        }

        match serde_json::from_slice::<WebhookPayload>(payload) {
            Ok(batch) => Verification::valid(batch),
            Err(e) => Verification::invalid(format!("invalid payload: {e}")),
        }
    }
}

/// Compute the hex HMAC-SHA256 of `payload` keyed by `secret`.
pub fn sign(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
