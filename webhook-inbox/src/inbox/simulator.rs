//! Synthetic deliveries for local development.
//!
//! Bypasses signature verification entirely. Only wired to the simulate
//! endpoint; [`super::WebhookReceiver`] has no path into it.

use std::sync::Arc;

use tracing::info;

use super::store::WebhookStore;
use super::types::{now_timestamp, EventData, NewWebhook, ReceivedWebhook, WebhookEvent};

/// Appends unsigned, always-valid records to a [`WebhookStore`].
#[derive(Clone)]
pub struct WebhookSimulator {
    store: Arc<WebhookStore>,
}

impl WebhookSimulator {
    pub fn new(store: Arc<WebhookStore>) -> Self {
        Self { store }
    }

    /// Record a single event stamped with the current time. No raw body.
    pub fn simulate(&self, event: impl Into<String>, data: EventData) -> ReceivedWebhook {
        let record = self.store.add(NewWebhook {
            valid: true,
            error: None,
            events: vec![WebhookEvent {
                event: event.into(),
                timestamp: now_timestamp(),
                is_test: None,
                data,
            }],
            raw_body: None,
        });

        info!(id = %record.id, events = %record.event_names(), "webhook_simulated");

        record
    }
}
