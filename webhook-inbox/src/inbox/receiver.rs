//! Authenticated webhook intake.
//!
//! ```text
//! raw body + signature → verifier → NewWebhook → store.add() → log
//! ```
//!
//! Valid and invalid deliveries are both recorded and both acknowledged.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use super::store::WebhookStore;
use super::types::{NewWebhook, RawBody, ReceivedWebhook};
use super::verifier::{SignatureVerifier, Verification};

/// Fallback error text for a verifier that rejects without saying why.
const UNSPECIFIED_ERROR: &str = "verification failed";

/// Verifies deliveries and records the outcome in a [`WebhookStore`].
#[derive(Clone)]
pub struct WebhookReceiver {
    store: Arc<WebhookStore>,
    verifier: Arc<dyn SignatureVerifier>,
    secret: Arc<str>,
}

impl WebhookReceiver {
    pub fn new(
        store: Arc<WebhookStore>,
        verifier: Arc<dyn SignatureVerifier>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            store,
            verifier,
            secret: Arc::from(secret.into()),
        }
    }

    /// Verify and record one delivery. Never fails: an inauthentic delivery
    /// is returned as a record with `valid == false`.
    pub fn receive(&self, body: Bytes, signature: &str) -> ReceivedWebhook {
        let verdict = self.verifier.verify(&body, signature, &self.secret);
        self.record(build_record(verdict, body))
    }

    /// Record a delivery as invalid without consulting the verifier, for
    /// signatures that cannot even be read (e.g. a non-UTF-8 header).
    pub fn reject(&self, body: Bytes, error: &str) -> ReceivedWebhook {
        self.record(build_record(Verification::invalid(error), body))
    }

    fn record(&self, webhook: NewWebhook) -> ReceivedWebhook {
        let record = self.store.add(webhook);

        if record.valid {
            info!(
                id = %record.id,
                events = %record.event_names(),
                "webhook_received_valid"
            );
        } else {
            warn!(
                id = %record.id,
                error = record.error.as_deref().unwrap_or_default(),
                "webhook_received_invalid"
            );
        }

        record
    }
}

/// Events are taken only from a valid verdict, even if the verifier parsed
/// something before rejecting.
fn build_record(verdict: Verification, body: Bytes) -> NewWebhook {
    let Verification {
        valid,
        error,
        payload,
    } = verdict;

    let events = match payload {
        Some(payload) if valid => payload.events,
        _ => Vec::new(),
    };

    let error = if valid {
        None
    } else {
        Some(
            error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| UNSPECIFIED_ERROR.to_string()),
        )
    };

    NewWebhook {
        valid,
        error,
        events,
        raw_body: Some(RawBody::from(body)),
    }
}
