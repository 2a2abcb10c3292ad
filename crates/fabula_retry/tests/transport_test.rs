//! `ReqwestTransport` against a local socket.
//!
//! These tests use the real clock and loopback TCP, so timing assertions are
//! kept coarse.

use fabula_core::{Method, NetworkFailureKind, Outcome, RequestDescriptor};
use fabula_retry::{CallExecutor, ReqwestTransport, RetryConfig, Transport, TransportFailure};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as it arrived on the wire.
struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).into_owned();
            let captured = Captured {
                head,
                body: Vec::new(),
            };
            let length: usize = captured
                .header("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return Captured {
                    body: buf[end + 4..end + 4 + length].to_vec(),
                    ..captured
                };
            }
        }
    }
    Captured {
        head: String::from_utf8_lossy(&buf).into_owned(),
        body: Vec::new(),
    }
}

/// Serve one request with `body` and hand back what the client sent.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let captured = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write");
        socket.shutdown().await.ok();
        captured
    });
    (format!("http://{}", addr), handle)
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::new().expect("client")
}

#[tokio::test]
async fn test_read_verb_sends_payload_as_query() {
    let (base, server) = serve_once(200, r#"{"ok":true}"#).await;
    let descriptor = RequestDescriptor::builder()
        .url(format!("{}/v1/profiles", base))
        .method(Method::Get)
        .json(json!({"code": "te", "limit": 2, "skip": null}))
        .build()
        .expect("valid descriptor");

    let response = transport().send(&descriptor).await.expect("response");
    let request = server.await.expect("server");

    assert_eq!(response.status(), 200);
    let line = request.request_line();
    assert!(line.starts_with("GET /v1/profiles?"), "{line}");
    assert!(line.contains("code=te"), "{line}");
    assert!(line.contains("limit=2"), "{line}");
    assert!(!line.contains("skip"), "{line}");
    assert!(request.body.is_empty());
    assert_eq!(request.header("content-length"), None);
}

#[tokio::test]
async fn test_write_verb_sends_json_body() {
    let (base, server) = serve_once(201, r#"{"id":"x"}"#).await;
    let descriptor = RequestDescriptor::builder()
        .url(format!("{}/v1/chat/completions", base))
        .bearer("sk-test")
        .json(json!({"model": "demo", "temperature": 0.7}))
        .build()
        .expect("valid descriptor");

    let response = transport().send(&descriptor).await.expect("response");
    let request = server.await.expect("server");

    assert_eq!(response.status(), 201);
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(request.request_line(), "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    let body: Value = serde_json::from_slice(&request.body).expect("json body");
    assert_eq!(body, json!({"model": "demo", "temperature": 0.7}));
}

#[tokio::test]
async fn test_binary_payload_on_read_verb_is_rejected() {
    let descriptor = RequestDescriptor::builder()
        .url("http://127.0.0.1:9/v1/clips")
        .method(Method::Get)
        .binary(vec![1, 2, 3], "video/mp4")
        .build()
        .expect("valid descriptor");

    match transport().send(&descriptor).await {
        Err(TransportFailure::Other(message)) => assert!(message.contains("binary"), "{message}"),
        other => panic!("expected a local failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let descriptor = RequestDescriptor::builder()
        .url(format!("http://{}/v1/audio/speech", addr))
        .json(json!({"input": "In the beginning"}))
        .timeout(Duration::from_millis(200))
        .build()
        .expect("valid descriptor");

    let failure = transport().send(&descriptor).await.expect_err("timeout");
    assert_eq!(failure, TransportFailure::Timeout);
}

#[tokio::test]
async fn test_closed_port_is_connect_failure_with_cause() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let descriptor = RequestDescriptor::builder()
        .url(format!("http://{}/v1/chat/completions", addr))
        .json(json!({"model": "demo"}))
        .build()
        .expect("valid descriptor");

    match transport().send(&descriptor).await {
        Err(TransportFailure::Connect(message)) => {
            assert!(
                message.to_lowercase().contains("connection refused"),
                "cause missing from {message}"
            );
        }
        other => panic!("expected a connect failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_connection_is_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });

    let executor = CallExecutor::with_transport(transport(), RetryConfig::default());
    let descriptor = RequestDescriptor::builder()
        .url(format!("http://{}/v1/chat", addr))
        .json(json!({"model": "demo"}))
        .max_retries(3u32)
        .retry_delay(Duration::from_millis(10))
        .build()
        .expect("valid descriptor");

    match executor.execute(&descriptor).await {
        Outcome::ExhaustedRetries { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(*last, Outcome::NetworkFailure(NetworkFailureKind::Disconnected));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
}
