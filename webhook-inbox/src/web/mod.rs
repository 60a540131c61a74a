//! HTTP boundary for the webhook inbox.
//!
//! ```text
//! POST   /webhooks/playcamp        receive a signed delivery
//! GET    /api/webhooks/received    list retained deliveries, newest first
//! DELETE /api/webhooks/received    clear retained deliveries
//! POST   /api/webhooks/simulate    record an unsigned test delivery
//! GET    /health                   liveness
//! ```

pub mod error;
pub mod handlers;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ErrorResponse};
pub use handlers::{
    clear_received, health, list_received, receive_webhook, simulate_webhook, AppState,
    ClearedResponse, HealthResponse, ReceivedResponse, SimulateRequest, SimulatedResponse,
    INVALID_SIGNATURE_HEADER, SIGNATURE_HEADER,
};

pub const RECEIVE_PATH: &str = "/webhooks/playcamp";
pub const RECEIVED_PATH: &str = "/api/webhooks/received";
pub const SIMULATE_PATH: &str = "/api/webhooks/simulate";
pub const HEALTH_PATH: &str = "/health";

/// Build the application router with tracing and CORS layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(RECEIVE_PATH, post(receive_webhook))
        .route(RECEIVED_PATH, get(list_received).delete(clear_received))
        .route(SIMULATE_PATH, post(simulate_webhook))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser UIs call the management endpoints cross-origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
