//! Library error types.
//!
//! Everything here is a startup-time condition. Per-request failures at the
//! HTTP boundary live in [`crate::web::ApiError`], and verification failures
//! are not errors at all: they are recorded in the inbox as data.

use thiserror::Error;

/// Invalid or missing configuration. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `WEBHOOK_SECRET` is unset or blank.
    #[error("WEBHOOK_SECRET environment variable is required")]
    MissingSecret,

    /// A numeric variable could not be parsed.
    #[error("invalid value for {name}: {value:?} (expected a positive integer)")]
    InvalidNumber { name: &'static str, value: String },

    /// The webhook store was asked to hold zero records.
    #[error("webhook store capacity must be greater than zero")]
    ZeroCapacity,
}
