//! Where a finalized envelope goes.
//!
//! A [`Sink`] is the smallest slice of an HTTP response object the builder
//! needs: a header map, a status line, and one body write. Two are provided:
//!
//! - `http::Response<Full<Bytes>>`, the value a hyper `service_fn` returns.
//! - [`WireSink`], which writes raw HTTP/1.1 onto any [`std::io::Write`].
//!
//! Bring your own for anything else.

use std::io::{self, Write};

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode};
use http_body_util::Full;

/// A writable HTTP response.
///
/// The builder touches headers and status freely while it is open and calls
/// [`write_body`](Sink::write_body) exactly once, last.
pub trait Sink {
    fn headers_mut(&mut self) -> &mut HeaderMap;
    fn set_status(&mut self, status: StatusCode);
    fn write_body(&mut self, body: Bytes) -> io::Result<()>;
}

impl Sink for http::Response<Full<Bytes>> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        http::Response::headers_mut(self)
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn write_body(&mut self, body: Bytes) -> io::Result<()> {
        *self.body_mut() = Full::new(body);
        Ok(())
    }
}

// ── WireSink ──────────────────────────────────────────────────────────────────

/// Serialises the response as HTTP/1.1 onto a byte stream.
///
/// Status and headers are buffered until the body arrives, then everything
/// goes out in order: status line, `content-length`, headers, blank line,
/// body. A caller-supplied `content-length` is ignored; the real one wins.
///
/// ```rust
/// use envelope::{Sink, WireSink};
///
/// let mut sink = WireSink::new(Vec::new());
/// sink.write_body("{}".into()).unwrap();
/// assert_eq!(sink.into_inner(), b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\n{}");
/// ```
pub struct WireSink<W> {
    writer: W,
    status: StatusCode,
    headers: HeaderMap,
}

impl<W: Write> WireSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, status: StatusCode::OK, headers: HeaderMap::new() }
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> Sink for WireSink<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    fn set_status(&mut self, status: StatusCode) { self.status = status; }

    fn write_body(&mut self, body: Bytes) -> io::Result<()> {
        let reason = self.status.canonical_reason().unwrap_or("");
        write!(self.writer, "HTTP/1.1 {} {}\r\n", self.status.as_u16(), reason)?;
        write!(self.writer, "content-length: {}\r\n", body.len())?;
        for (name, value) in &self.headers {
            if name == CONTENT_LENGTH {
                continue;
            }
            self.writer.write_all(name.as_str().as_bytes())?;
            self.writer.write_all(b": ")?;
            self.writer.write_all(value.as_bytes())?;
            self.writer.write_all(b"\r\n")?;
        }
        self.writer.write_all(b"\r\n")?;
        self.writer.write_all(&body)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http_body_util::BodyExt;

    #[test]
    fn wire_sink_writes_head_before_body() {
        let mut sink = WireSink::new(Vec::new());
        sink.set_status(StatusCode::BAD_REQUEST);
        sink.headers_mut().insert("content-type", HeaderValue::from_static("application/json"));
        sink.headers_mut().insert("content-length", HeaderValue::from_static("999"));
        sink.write_body(Bytes::from_static(b"{\"a\":1}")).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "HTTP/1.1 400 Bad Request\r\n\
             content-length: 7\r\n\
             content-type: application/json\r\n\
             \r\n\
             {\"a\":1}",
        );
    }

    #[test]
    fn wire_sink_unknown_reason_is_blank() {
        let mut sink = WireSink::new(Vec::new());
        sink.set_status(StatusCode::from_u16(599).unwrap());
        sink.write_body(Bytes::new()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("HTTP/1.1 599 \r\n"), "{out}");
    }

    #[tokio::test]
    async fn http_response_sink_replaces_body() {
        let mut res = http::Response::new(Full::new(Bytes::from_static(b"stale")));
        Sink::set_status(&mut res, StatusCode::ACCEPTED);
        Sink::headers_mut(&mut res).insert("x-a", HeaderValue::from_static("1"));
        res.write_body(Bytes::from_static(b"fresh")).unwrap();

        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()["x-a"], "1");
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"fresh");
    }
}
