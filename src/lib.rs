//! # envelope
//!
//! A fluent builder for JSON HTTP responses. One envelope shape, every time.
//!
//! ```text
//! {"status":200,"data":{"id":7},"error":{},"timestamp":"2026-10-16T09:12:44.031Z"}
//! ```
//!
//! ## The contract
//!
//! Pick a status, chain the headers and payload you need, finalize once.
//! Headers go straight to the response; the body is serialized and written
//! on [`ResponseBuilder::finalize`], which consumes the builder. Nothing can be
//! changed after the body is out.
//!
//! What envelope does not do: routing, request parsing, middleware,
//! authentication. Your framework owns those and hands you something to
//! write into, a [`Sink`].
//!
//! The envelope's status is also written to the response's status line, so a
//! `bad_request` goes out as `400`, not as a `200` carrying `"status":400`.
//!
//! Faults are values, not panics. A payload serde cannot serialize becomes a
//! fixed `500` JSON body plus [`Error::Json`] (NaN and infinities
//! included, rather than a quiet `null`); a dead client becomes
//! [`Error::Io`]. Both are logged through `tracing`.
//!
//! ## Quick start
//!
//! ```rust
//! use bytes::Bytes;
//! use http_body_util::Full;
//!
//! #[derive(serde::Serialize)]
//! struct User { id: u32, name: &'static str }
//!
//! let mut res = http::Response::new(Full::new(Bytes::new()));
//!
//! envelope::success(&mut res)
//!     .as_json()
//!     .apply_security_headers()
//!     .apply_cors()
//!     .set_header("cache-control", "no-store")
//!     .set_body(User { id: 7, name: "alice" })
//!     .finalize()
//!     .unwrap();
//!
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.headers()["x-frame-options"], "DENY");
//! ```

mod clock;
mod envelope;
mod error;
mod finite;
mod headers;
mod response;
mod sink;

pub use clock::{Clock, SystemClock};
pub use envelope::{Envelope, ErrorPayload};
pub use error::Error;
pub use headers::{CorsPolicy, SECURITY_HEADERS};
pub use response::{accepted, bad_request, server_error, success, with_status, ResponseBuilder};
pub use sink::{Sink, WireSink};
