//! Webhook inbox - authenticated webhook intake with an in-memory history.
//!
//! Deliveries pushed by the remote platform are verified, normalized into
//! [`inbox::WebhookEvent`]s and kept in a bounded, newest-first
//! [`inbox::WebhookStore`] for inspection. Nothing is persisted.
//!
//! ## Architecture
//!
//! ```text
//! POST /webhooks/playcamp → web::receive_webhook → WebhookReceiver → verifier
//!                                                        ↓
//!            GET/DELETE /api/webhooks/received ← WebhookStore ← WebhookSimulator ← POST /api/webhooks/simulate
//! ```

pub mod config;
pub mod error;
pub mod inbox;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::ConfigError;
pub use inbox::{
    EventData, HmacSha256Verifier, ReceivedWebhook, SignatureVerifier, WebhookEvent,
    WebhookReceiver, WebhookSimulator, WebhookStore,
};
pub use web::{router, AppState};
