//! Event model and stored record shapes.
//!
//! Field names are camelCase on the wire. Optional fields stay optional:
//! an absent `isTest` means "unspecified", which is not the same as `false`.

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// One normalized notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    /// Event type identifier, e.g. `payment.completed`
    pub event: String,
    /// Producer-supplied occurrence time, kept verbatim
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_test: Option<bool>,
    /// Opaque payload, passed through uninterpreted
    #[serde(default)]
    pub data: EventData,
}

/// Event payload kept as the producer's exact JSON text.
///
/// Never parsed into a `serde_json::Value`: key order, number spelling and
/// big integers survive storage and listing unchanged. Absent data is `null`.
#[derive(Debug, Clone, Default)]
pub struct EventData(Option<Box<RawValue>>);

impl EventData {
    /// Absent payload, serialized as `null`.
    pub fn null() -> Self {
        EventData(None)
    }

    /// Wrap JSON text after checking that it is well formed.
    pub fn from_json(json: impl Into<String>) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.into()).map(|raw| EventData(Some(raw)))
    }

    /// The JSON text as received.
    pub fn get(&self) -> &str {
        self.0.as_deref().map_or("null", RawValue::get)
    }

    pub fn is_null(&self) -> bool {
        self.get() == "null"
    }
}

impl From<Box<RawValue>> for EventData {
    fn from(raw: Box<RawValue>) -> Self {
        EventData(Some(raw))
    }
}

impl PartialEq for EventData {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for EventData {}

impl Serialize for EventData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(raw) => raw.serialize(serializer),
            None => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for EventData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Box<RawValue>>::deserialize(deserializer).map(EventData)
    }
}

/// Undecoded request body kept for forensic replay.
///
/// Serialized verbatim when it is valid JSON, otherwise as a lossy UTF-8
/// string so a listing never fails on a garbage delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody(pub Bytes);

impl RawBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for RawBody {
    fn from(bytes: Bytes) -> Self {
        RawBody(bytes)
    }
}

impl Serialize for RawBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::from_slice::<&RawValue>(&self.0) {
            Ok(raw) => raw.serialize(serializer),
            Err(_) => serializer.serialize_str(&String::from_utf8_lossy(&self.0)),
        }
    }
}

/// A delivery attempt that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWebhook {
    pub valid: bool,
    pub error: Option<String>,
    pub events: Vec<WebhookEvent>,
    pub raw_body: Option<RawBody>,
}

/// A delivery attempt (valid or invalid) as retained by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedWebhook {
    /// `wh_<n>`, assigned by the store
    pub id: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<WebhookEvent>,
    /// Store-assigned insertion time
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<RawBody>,
}

impl ReceivedWebhook {
    /// Comma-joined event names, used in log lines.
    pub fn event_names(&self) -> String {
        self.events
            .iter()
            .map(|e| e.event.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Current UTC time as RFC 3339 with second precision (`2026-01-02T03:04:05Z`).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
