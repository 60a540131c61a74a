//! Webhook inbox core.
//!
//! - `types`: event model and stored record shapes
//! - `store`: bounded, thread-safe, newest-first history
//! - `verifier`: signature verification contract and default HMAC scheme
//! - `receiver`: verify + record for real deliveries
//! - `simulator`: unsigned records for local testing

pub mod receiver;
pub mod simulator;
pub mod store;
pub mod types;
pub mod verifier;

pub use receiver::WebhookReceiver;
pub use simulator::WebhookSimulator;
pub use store::WebhookStore;
pub use types::{EventData, NewWebhook, RawBody, ReceivedWebhook, WebhookEvent};
pub use verifier::{HmacSha256Verifier, SignatureVerifier, Verification, WebhookPayload};
