//! Webhook endpoint handlers.
//!
//! The receive handler only:
//! 1. Reads the raw body (the one failure surfaced to the sender)
//! 2. Hands body + signature to the receiver, which verifies and records
//! 3. Returns `{"received": true}`, valid or not
//!
//! Signature failures show up in the inbox listing, never in the response.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::inbox::{
    EventData, ReceivedWebhook, SignatureVerifier, WebhookReceiver, WebhookSimulator,
    WebhookStore,
};
use crate::web::error::ApiError;
use crate::Config;

/// Header carrying the sender's signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Recorded error for a signature header that is not valid UTF-8.
pub const INVALID_SIGNATURE_HEADER: &str = "invalid signature header";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<WebhookStore>,
    pub receiver: WebhookReceiver,
    pub simulator: WebhookSimulator,
}

impl AppState {
    pub fn new(config: Config, verifier: Arc<dyn SignatureVerifier>) -> Result<Self, ConfigError> {
        let store = Arc::new(WebhookStore::new(config.store_capacity)?);
        let receiver =
            WebhookReceiver::new(store.clone(), verifier, config.webhook_secret.clone());
        let simulator = WebhookSimulator::new(store.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            receiver,
            simulator,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Receiver
// =============================================================================

/// Receipt acknowledgement, identical for valid and invalid deliveries.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ReceivedResponse {
    pub received: bool,
}

/// `POST /webhooks/playcamp`
pub async fn receive_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ReceivedResponse>, ApiError> {
    // None: header present but unreadable. A missing header is an empty
    // signature and left to the verifier.
    let signature = match request.headers().get(SIGNATURE_HEADER) {
        None => Some(String::new()),
        Some(v) => v.to_str().ok().map(str::to_string),
    };

    let body = axum::body::to_bytes(request.into_body(), state.config.max_body_bytes)
        .await
        .map_err(|e| {
            warn!(error = %e, "webhook_body_read_failed");
            ApiError::BodyRead
        })?;

    match signature {
        Some(signature) => state.receiver.receive(body, &signature),
        None => state.receiver.reject(body, INVALID_SIGNATURE_HEADER),
    };

    Ok(Json(ReceivedResponse { received: true }))
}

// =============================================================================
// Inbox management
// =============================================================================

/// `GET /api/webhooks/received`
pub async fn list_received(State(state): State<AppState>) -> Json<Vec<ReceivedWebhook>> {
    Json(state.store.list())
}

/// Clear acknowledgement.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ClearedResponse {
    pub cleared: bool,
}

/// `DELETE /api/webhooks/received`
pub async fn clear_received(State(state): State<AppState>) -> Json<ClearedResponse> {
    let removed = state.store.clear();
    info!(removed = removed, "received_webhooks_cleared");
    Json(ClearedResponse { cleared: true })
}

// =============================================================================
// Simulator
// =============================================================================

/// Simulate request body. `data` is kept as sent.
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub event: String,
    #[serde(default)]
    pub data: EventData,
}

/// Simulate acknowledgement.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulatedResponse {
    pub simulated: bool,
}

/// `POST /api/webhooks/simulate`
///
/// Unsigned. Goes straight to the simulator, never through the receiver.
pub async fn simulate_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SimulatedResponse>, ApiError> {
    let request: SimulateRequest = serde_json::from_slice(&body).map_err(ApiError::InvalidJson)?;

    state.simulator.simulate(request.event, request.data);

    Ok(Json(SimulatedResponse { simulated: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::verifier::{sign, HmacSha256Verifier};
    use crate::web::{router, RECEIVED_PATH, RECEIVE_PATH, SIMULATE_PATH};
    use axum::{
        body::Body,
        http::{HeaderValue, Method, Request, StatusCode},
        response::Response,
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SECRET: &str = "whsec_test";

    fn test_config() -> Config {
        Config {
            port: 0,
            webhook_secret: SECRET.to_string(),
            store_capacity: 50,
            max_body_bytes: 4096,
        }
    }

    fn app() -> (AppState, Router) {
        let state = AppState::new(test_config(), Arc::new(HmacSha256Verifier)).unwrap();
        (state.clone(), router(state))
    }

    fn delivery() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "events": [
                {
                    "event": "payment.completed",
                    "timestamp": "2024-05-01T10:00:00Z",
                    "isTest": true,
                    "data": {"transactionId": "txn_1"}
                },
                {
                    "event": "sponsor.created",
                    "timestamp": "2024-05-01T10:00:01Z",
                    "data": {"userId": "u_1"}
                }
            ]
        }))
        .unwrap()
    }

    fn post_delivery(body: impl Into<Body>, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(RECEIVE_PATH)
            .header("content-type", "application/json");
        if let Some(sig) = signature {
            builder = builder.header("X-Webhook-Signature", sig);
        }
        builder.body(body.into()).unwrap()
    }

    fn empty(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn list(app: &Router) -> Value {
        let response = app
            .clone()
            .oneshot(empty(Method::GET, RECEIVED_PATH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app();
        let response = app.oneshot(empty(Method::GET, "/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_receive_valid_delivery() {
        let (_, app) = app();
        let body = delivery();
        let sig = sign(SECRET, &body);

        let response = app
            .clone()
            .oneshot(post_delivery(body, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"received": true}));

        let listed = list(&app).await;
        let first = &listed[0];
        assert_eq!(first["id"], "wh_1");
        assert_eq!(first["valid"], true);
        assert!(first.get("error").is_none());
        assert_eq!(first["events"][0]["event"], "payment.completed");
        assert_eq!(first["events"][0]["isTest"], true);
        assert!(first["events"][1].get("isTest").is_none());
        assert_eq!(first["rawBody"]["events"][1]["data"]["userId"], "u_1");
        assert!(first["receivedAt"].is_string());
    }

    #[tokio::test]
    async fn test_receive_bad_signature_still_acknowledged() {
        let (_, app) = app();
        let body = delivery();
        let sig = sign("not-the-secret", &body);

        let response = app
            .clone()
            .oneshot(post_delivery(body, Some(&sig)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"received": true}));

        let listed = list(&app).await;
        let first = &listed[0];
        assert_eq!(first["valid"], false);
        assert_eq!(first["error"], "signature mismatch");
        assert_eq!(first["events"], json!([]));
    }

    #[tokio::test]
    async fn test_receive_missing_signature_header() {
        let (state, app) = app();

        let response = app.oneshot(post_delivery(delivery(), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listed = state.store.list();
        assert_eq!(listed[0].error.as_deref(), Some("missing signature"));
    }

    #[tokio::test]
    async fn test_receive_non_utf8_signature_header() {
        let (state, app) = app();
        let mut request = post_delivery(delivery(), None);
        request.headers_mut().insert(
            SIGNATURE_HEADER,
            HeaderValue::from_bytes(b"sha256=\xff\xfe").unwrap(),
        );

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"received": true}));

        let listed = state.store.list();
        assert!(!listed[0].valid);
        assert_eq!(listed[0].error.as_deref(), Some(INVALID_SIGNATURE_HEADER));
        assert!(listed[0].events.is_empty());
        assert!(listed[0].raw_body.is_some());
    }

    #[tokio::test]
    async fn test_list_returns_event_data_verbatim() {
        let (_, app) = app();
        let data = r#"{"zeta":1,"alpha":12345678901234567890123,"amount":1.50}"#;
        let body = format!(
            r#"{{"events":[{{"event":"payment.completed","timestamp":"t","data":{data}}}]}}"#
        );
        let sig = sign(SECRET, body.as_bytes());

        app.clone()
            .oneshot(post_delivery(body, Some(&sig)))
            .await
            .unwrap();

        let response = app
            .oneshot(empty(Method::GET, RECEIVED_PATH))
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        #[derive(Deserialize)]
        struct Listed {
            events: Vec<Box<serde_json::value::RawValue>>,
        }
        let listed: Vec<Listed> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            listed[0].events[0].get(),
            format!(r#"{{"event":"payment.completed","timestamp":"t","data":{data}}}"#)
        );
    }

    #[tokio::test]
    async fn test_receive_non_json_body_is_kept_as_string() {
        let (state, app) = app();
        let body = b"plain text".to_vec();
        let sig = sign(SECRET, &body);

        app.clone()
            .oneshot(post_delivery(body, Some(&sig)))
            .await
            .unwrap();

        assert!(!state.store.list()[0].valid);
        assert_eq!(list(&app).await[0]["rawBody"], "plain text");
    }

    #[tokio::test]
    async fn test_receive_unreadable_body() {
        let (state, app) = app();
        state.simulator.simulate("before", EventData::null());

        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"events\":")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let body = Body::from_stream(futures::stream::iter(chunks));

        let response = app.oneshot(post_delivery(body, Some("sig"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "failed to read body"})
        );

        let listed = state.store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].events[0].event, "before");
    }

    #[tokio::test]
    async fn test_receive_oversized_body() {
        let (state, app) = app();
        let body = vec![b'x'; test_config().max_body_bytes + 1];

        let response = app.oneshot(post_delivery(body, Some("sig"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.store.list().is_empty());
    }

    #[tokio::test]
    async fn test_clear_received() {
        let (state, app) = app();
        state.simulator.simulate("a", EventData::null());
        state.simulator.simulate("b", EventData::null());

        let response = app
            .clone()
            .oneshot(empty(Method::DELETE, RECEIVED_PATH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"cleared": true}));
        assert_eq!(list(&app).await, json!([]));

        // Counter survives the clear.
        assert_eq!(state.simulator.simulate("c", EventData::null()).id, "wh_3");
    }

    #[tokio::test]
    async fn test_simulate() {
        let (_, app) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri(SIMULATE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"event":"test.ping","data":{"x":1}}"#))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"simulated": true}));

        let listed = list(&app).await;
        let first = &listed[0];
        assert_eq!(first["valid"], true);
        assert_eq!(first["events"].as_array().unwrap().len(), 1);
        assert_eq!(first["events"][0]["event"], "test.ping");
        assert_eq!(first["events"][0]["data"], json!({"x": 1}));
        assert!(first.get("rawBody").is_none());
    }

    #[tokio::test]
    async fn test_simulate_invalid_json() {
        let (state, app) = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri(SIMULATE_PATH)
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "invalid JSON body"}));
        assert!(state.store.list().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_bounded() {
        let config = Config {
            store_capacity: 2,
            ..test_config()
        };
        let state = AppState::new(config, Arc::new(HmacSha256Verifier)).unwrap();
        let app = router(state.clone());

        for name in ["A", "B", "C"] {
            state.simulator.simulate(name, EventData::null());
        }

        let listed = list(&app).await;
        let names: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|wh| wh["events"][0]["event"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let (_, app) = app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(RECEIVED_PATH)
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "DELETE")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_app_state_rejects_zero_capacity() {
        let config = Config {
            store_capacity: 0,
            ..test_config()
        };
        let result = AppState::new(config, Arc::new(HmacSha256Verifier));
        assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
    }
}
