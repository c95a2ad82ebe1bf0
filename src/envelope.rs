//! The JSON object written as the response body.
//!
//! ```text
//! {"status":400,"error":{"message":"invalid id"},"timestamp":"0001-01-01T00:00:00Z"}
//! {"status":200,"data":{"id":7},"error":{},"timestamp":"2026-10-16T09:12:44.031Z"}
//! ```
//!
//! `error` is always there. `data` only when a body was set. `timestamp` is the
//! zero instant until a body was set.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Wire form of an unset timestamp.
pub(crate) const ZERO_TIMESTAMP: &str = "0001-01-01T00:00:00Z";

/// Written in place of an envelope that could not be serialized.
pub(crate) const FALLBACK_BODY: &[u8] =
    br#"{"status":500,"error":{"message":"internal server error"},"timestamp":"0001-01-01T00:00:00Z"}"#;

// ── ErrorPayload ──────────────────────────────────────────────────────────────

/// The `error` member of an [`Envelope`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    message: String,
}

impl ErrorPayload {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    /// `None` when no error was set (or it rendered to an empty string).
    pub fn message(&self) -> Option<&str> {
        (!self.message.is_empty()).then_some(self.message.as_str())
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// Response body accumulated by a [`ResponseBuilder`](crate::ResponseBuilder).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    pub(crate) status: u16,
    #[serde(skip_serializing_if = "is_absent")]
    pub(crate) data: Option<Value>,
    pub(crate) error: ErrorPayload,
    #[serde(serialize_with = "serialize_timestamp")]
    pub(crate) timestamp: Option<DateTime<Utc>>,
}

impl Envelope {
    pub(crate) fn new(status: u16) -> Self {
        Self { status, data: None, error: ErrorPayload::default(), timestamp: None }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn data(&self) -> Option<&Value> { self.data.as_ref() }
    pub fn error(&self) -> &ErrorPayload { &self.error }

    /// When the body was set. `None` serializes as `0001-01-01T00:00:00Z`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> { self.timestamp }
}

// A JSON `null` payload is dropped like an unset one.
fn is_absent(data: &Option<Value>) -> bool {
    matches!(data, None | Some(Value::Null))
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(t) => serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None    => serializer.serialize_str(ZERO_TIMESTAMP),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn fresh_envelope_has_error_object_and_zero_timestamp() {
        let body = serde_json::to_value(Envelope::new(400)).unwrap();
        assert_eq!(
            body,
            json!({ "status": 400, "error": {}, "timestamp": ZERO_TIMESTAMP }),
        );
    }

    #[test]
    fn null_data_is_omitted() {
        let mut env = Envelope::new(200);
        env.data = Some(Value::Null);
        let body = serde_json::to_value(&env).unwrap();
        assert!(body.get("data").is_none());
    }

    #[test]
    fn empty_message_is_omitted() {
        let mut env = Envelope::new(500);
        env.error = ErrorPayload::new(String::new());
        assert_eq!(env.error().message(), None);
        let text = serde_json::to_string(&env).unwrap();
        assert!(text.contains(r#""error":{}"#), "{text}");
    }

    #[test]
    fn timestamp_is_rfc3339_utc() {
        let mut env = Envelope::new(200);
        env.timestamp = Some(Utc.with_ymd_and_hms(2026, 10, 16, 9, 12, 44).unwrap());
        let body = serde_json::to_value(&env).unwrap();
        assert_eq!(body["timestamp"], "2026-10-16T09:12:44Z");
    }

    #[test]
    fn fallback_body_is_a_valid_envelope() {
        let body: Value = serde_json::from_slice(FALLBACK_BODY).unwrap();
        assert_eq!(body["status"], 500);
        assert_eq!(body["error"]["message"], "internal server error");
        assert_eq!(body["timestamp"], ZERO_TIMESTAMP);
    }
}
