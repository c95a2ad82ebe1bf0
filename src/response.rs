//! The fluent response builder.
//!
//! Pick a status, chain what you need, finalize once:
//!
//! ```rust
//! use bytes::Bytes;
//! use http_body_util::Full;
//!
//! let mut res = http::Response::new(Full::new(Bytes::new()));
//!
//! envelope::bad_request(&mut res)
//!     .as_json()
//!     .apply_security_headers()
//!     .set_error("invalid id")
//!     .finalize()
//!     .unwrap();
//!
//! assert_eq!(res.status(), 400);
//! assert_eq!(res.headers()["content-type"], "application/json");
//! ```

use std::fmt;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};
use crate::envelope::{Envelope, ErrorPayload, FALLBACK_BODY};
use crate::error::Error;
use crate::finite::Finite;
use crate::headers::{self, CorsPolicy};
use crate::sink::Sink;

// ── Shortcuts ─────────────────────────────────────────────────────────────────

/// `200 OK`
pub fn success<S: Sink + ?Sized>(sink: &mut S) -> ResponseBuilder<'_, S> {
    ResponseBuilder::success(sink)
}

/// `202 Accepted`
pub fn accepted<S: Sink + ?Sized>(sink: &mut S) -> ResponseBuilder<'_, S> {
    ResponseBuilder::accepted(sink)
}

/// `400 Bad Request`
pub fn bad_request<S: Sink + ?Sized>(sink: &mut S) -> ResponseBuilder<'_, S> {
    ResponseBuilder::bad_request(sink)
}

/// `500 Internal Server Error`
pub fn server_error<S: Sink + ?Sized>(sink: &mut S) -> ResponseBuilder<'_, S> {
    ResponseBuilder::server_error(sink)
}

/// Any status code. See [`ResponseBuilder::with_status`].
pub fn with_status<S: Sink + ?Sized>(sink: &mut S, code: u16) -> ResponseBuilder<'_, S> {
    ResponseBuilder::with_status(sink, code)
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Accumulates one JSON response and writes it to a [`Sink`].
///
/// Every mutator takes `self` and hands it back, so calls chain. Header
/// mutators write through to the sink immediately; body and error live in the
/// [`Envelope`] until [`finalize`](Self::finalize), which consumes the builder.
/// There is no way to touch the response after it has been written.
pub struct ResponseBuilder<'a, S: Sink + ?Sized> {
    sink: &'a mut S,
    clock: &'a dyn Clock,
    envelope: Envelope,
    // A `set_body` payload that failed to serialize. Reported at finalize.
    fault: Option<serde_json::Error>,
}

impl<'a, S: Sink + ?Sized> ResponseBuilder<'a, S> {
    pub fn success(sink: &'a mut S) -> Self { Self::open(sink, StatusCode::OK.as_u16()) }
    pub fn accepted(sink: &'a mut S) -> Self { Self::open(sink, StatusCode::ACCEPTED.as_u16()) }
    pub fn bad_request(sink: &'a mut S) -> Self { Self::open(sink, StatusCode::BAD_REQUEST.as_u16()) }
    pub fn server_error(sink: &'a mut S) -> Self { Self::open(sink, StatusCode::INTERNAL_SERVER_ERROR.as_u16()) }

    /// Starts a response with an arbitrary status code.
    ///
    /// The code is not validated. It always lands in the envelope; the sink's
    /// status line is only set when `code` is a valid HTTP status (100–999).
    pub fn with_status(sink: &'a mut S, code: u16) -> Self { Self::open(sink, code) }

    fn open(sink: &'a mut S, status: u16) -> Self {
        Self { sink, clock: &SystemClock, envelope: Envelope::new(status), fault: None }
    }

    pub fn envelope(&self) -> &Envelope { &self.envelope }
    pub fn status(&self) -> u16 { self.envelope.status }

    /// Time source for subsequent [`set_body`](Self::set_body) calls.
    pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
        self.clock = clock;
        self
    }

    /// `Content-Type: application/json`
    pub fn as_json(self) -> Self {
        self.sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Sets the payload and stamps the envelope with the current time.
    ///
    /// The timestamp is taken now, not at finalize. A payload that has no JSON
    /// form (a map with non-string keys, a NaN or infinite float anywhere in
    /// it) is not an error here; [`finalize`](Self::finalize) reports it.
    pub fn set_body<T: Serialize>(mut self, data: T) -> Self {
        self.envelope.timestamp = Some(self.clock.now());
        match serde_json::to_value(Finite(&data)) {
            Ok(value) => {
                self.envelope.data = Some(value);
                self.fault = None;
            }
            Err(e) => {
                self.envelope.data = None;
                self.fault = Some(e);
            }
        }
        self
    }

    /// Sets `error.message` to `err`'s display text. Leaves `data` alone.
    pub fn set_error(mut self, err: impl fmt::Display) -> Self {
        self.envelope.error = ErrorPayload::new(err.to_string());
        self
    }

    /// `nosniff`, `DENY` framing, legacy XSS filter on, and a
    /// `strict-origin-when-cross-origin` referrer policy.
    pub fn apply_security_headers(self) -> Self {
        headers::apply_security(self.sink.headers_mut());
        self
    }

    /// Applies [`CorsPolicy::default()`]: any origin, credentials allowed.
    pub fn apply_cors(self) -> Self {
        self.apply_cors_with(&CorsPolicy::default())
    }

    pub fn apply_cors_with(self, policy: &CorsPolicy) -> Self {
        policy.apply(self.sink.headers_mut());
        self
    }

    /// Sets one header, replacing any earlier value. Names or values that are
    /// not valid HTTP are logged and skipped.
    pub fn set_header(self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (key, value) = (key.as_ref(), value.as_ref());
        match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.sink.headers_mut().insert(name, value);
            }
            _ => warn!(key, value, "skipping invalid header"),
        }
        self
    }

    pub fn set_headers<K, V>(self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        headers.into_iter().fold(self, |b, (k, v)| b.set_header(k, v))
    }

    /// Serializes the envelope and writes it to the sink.
    ///
    /// If the envelope cannot be serialized, the sink gets a `500` with a
    /// fixed JSON error body instead and [`Error::Json`] is returned. A sink
    /// write failure comes back as [`Error::Io`].
    pub fn finalize(self) -> Result<(), Error> {
        let Self { sink, envelope, fault, .. } = self;

        let body = match fault.map_or_else(|| serde_json::to_vec(&envelope), Err) {
            Ok(body) => body,
            Err(e) => {
                error!(status = envelope.status, error = %e, "response envelope is not serializable");
                sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                sink.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                write(sink, Bytes::from_static(FALLBACK_BODY), 500)?;
                return Err(Error::Json(e));
            }
        };

        match StatusCode::from_u16(envelope.status) {
            Ok(status) => sink.set_status(status),
            Err(_) => warn!(status = envelope.status, "not a valid HTTP status; leaving sink status as is"),
        }

        write(sink, Bytes::from(body), envelope.status)
    }
}

fn write<S: Sink + ?Sized>(sink: &mut S, body: Bytes, status: u16) -> Result<(), Error> {
    let len = body.len();
    match sink.write_body(body) {
        Ok(()) => {
            debug!(status, bytes = len, "response written");
            Ok(())
        }
        Err(e) => {
            error!(status, error = %e, "failed to write response body");
            Err(Error::Io(e))
        }
    }
}
