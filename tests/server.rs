//! End-to-end: envelopes built inside a real hyper server and read back off
//! the socket.

use std::convert::Infallible;
use std::io;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn handle(req: hyper::Request<Incoming>) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let mut res = http::Response::new(Full::new(Bytes::new()));

    match req.uri().path() {
        "/user" => envelope::success(&mut res)
            .as_json()
            .apply_security_headers()
            .set_body(json!({ "id": 7 }))
            .finalize()
            .unwrap(),
        _ => envelope::bad_request(&mut res)
            .as_json()
            .apply_cors()
            .set_error(io::Error::other("invalid id"))
            .finalize()
            .unwrap(),
    }

    Ok(res)
}

/// Serves exactly one connection and returns the raw response to `GET path`.
async fn fetch(path: &str) -> (String, Value) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        ConnBuilder::new(TokioExecutor::new())
            .serve_connection(TokioIo::new(stream), service_fn(handle))
            .await
            .unwrap();
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    client.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    client.read_to_end(&mut raw).await.unwrap();
    server.await.unwrap();

    let raw = String::from_utf8(raw).unwrap();
    let (head, body) = raw.split_once("\r\n\r\n").expect("no header terminator");
    (head.to_ascii_lowercase(), serde_json::from_str(body).unwrap())
}

// ---------------------------------------------------------------------------
// Test: success envelope carries data, timestamp and the status line matches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn success_round_trip() {
    let (head, body) = fetch("/user").await;

    assert!(head.starts_with("http/1.1 200 ok"), "{head}");
    assert!(head.contains("content-type: application/json"), "{head}");
    assert!(head.contains("x-frame-options: deny"), "{head}");

    assert_eq!(body["status"], 200);
    assert_eq!(body["data"], json!({ "id": 7 }));
    assert_eq!(body["error"], json!({}));
    let stamp = body["timestamp"].as_str().unwrap();
    assert_ne!(stamp, "0001-01-01T00:00:00Z");
    assert!(stamp.parse::<chrono::DateTime<chrono::Utc>>().is_ok(), "{stamp}");
}

// ---------------------------------------------------------------------------
// Test: error envelope has no data and the zero timestamp
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_round_trip() {
    let (head, body) = fetch("/nope").await;

    assert!(head.starts_with("http/1.1 400 bad request"), "{head}");
    assert!(head.contains("access-control-allow-origin: *"), "{head}");
    assert!(head.contains("access-control-allow-credentials: true"), "{head}");

    assert_eq!(
        body,
        json!({
            "status": 400,
            "error": { "message": "invalid id" },
            "timestamp": "0001-01-01T00:00:00Z",
        }),
    );
}
