//! Retry policy tests for the call executor.
//!
//! All tests run on a paused tokio clock, so retry delays are observed
//! exactly without sleeping in real time.

use fabula_core::{Method, NetworkFailureKind, Outcome, RequestDescriptor};
use fabula_retry::mock::{Reply, ScriptedTransport};
use fabula_retry::{CallExecutor, RetryConfig};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

fn descriptor(max_retries: u32, retry_delay: Duration) -> RequestDescriptor {
    RequestDescriptor::builder()
        .url("https://api.example.com/v1/chat/completions")
        .bearer("sk-test")
        .json(json!({"model": "demo"}))
        .max_retries(max_retries)
        .retry_delay(retry_delay)
        .build()
        .expect("valid descriptor")
}

fn executor(transport: ScriptedTransport) -> CallExecutor<ScriptedTransport> {
    CallExecutor::with_transport(transport, RetryConfig::default())
}

fn gaps(transport: &ScriptedTransport) -> Vec<Duration> {
    transport
        .requests()
        .windows(2)
        .map(|pair| pair[1].at - pair[0].at)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_is_not_retried() {
    let executor = executor(ScriptedTransport::always(Reply::text(401, "invalid api key")));
    let started = Instant::now();

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    assert_eq!(
        outcome,
        Outcome::ClientError {
            status: 401,
            body: "invalid api key".to_string()
        }
    );
    assert_eq!(executor.transport().call_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_every_client_status_stops_after_one_attempt() {
    for status in 400..=499u16 {
        let executor = executor(ScriptedTransport::always(Reply::text(status, "nope")));
        let outcome = executor.execute(&descriptor(4, Duration::from_secs(1))).await;

        assert!(
            matches!(outcome, Outcome::ClientError { status: s, .. } if s == status),
            "status {status} gave {outcome}"
        );
        assert_eq!(executor.transport().call_count(), 1, "status {status}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_exhaust_all_attempts() {
    for status in [500u16, 502, 503, 504, 599] {
        let executor = executor(ScriptedTransport::always(Reply::status(status)));
        let started = Instant::now();

        let outcome = executor.execute(&descriptor(4, Duration::from_secs(3))).await;

        assert_eq!(
            outcome,
            Outcome::ExhaustedRetries {
                attempts: 4,
                last: Box::new(Outcome::ServerError { status }),
            }
        );
        assert_eq!(executor.transport().call_count(), 4);
        assert_eq!(gaps(executor.transport()), vec![Duration::from_secs(3); 3]);
        assert_eq!(started.elapsed(), Duration::from_secs(9));
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_success_makes_one_attempt() {
    let executor = executor(ScriptedTransport::always(Reply::json(200, json!({"ok": true}))));

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    let response = outcome.response().expect("success");
    assert_eq!(response.status(), 200);
    assert_eq!(executor.transport().call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_two_service_unavailable() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::status(503),
        Reply::status(503),
        Reply::json(200, json!({"choices": []})),
    ]);
    let executor = executor(transport);
    let started = Instant::now();

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    assert!(outcome.is_success());
    assert_eq!(executor.transport().call_count(), 3);
    assert_eq!(gaps(executor.transport()), vec![Duration::from_secs(2); 2]);
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_success_stops_retrying_early() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::timeout(),
        Reply::status(200),
        Reply::status(500),
    ]);
    let executor = executor(transport);

    let outcome = executor.execute(&descriptor(5, Duration::from_millis(500))).await;

    assert!(outcome.is_success());
    assert_eq!(executor.transport().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_network_failures_are_retried() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::connect_failure(),
        Reply::timeout(),
        Reply::timeout(),
    ]);
    let executor = executor(transport);

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(1))).await;

    assert_eq!(
        outcome,
        Outcome::ExhaustedRetries {
            attempts: 3,
            last: Box::new(Outcome::NetworkFailure(NetworkFailureKind::Timeout)),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropped_connection_recovers_on_retry() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::disconnect(),
        Reply::json(200, json!({"ok": true})),
    ]);
    let executor = executor(transport.clone());

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    assert!(outcome.is_success());
    assert_eq!(transport.call_count(), 2);
    assert_eq!(gaps(&transport), vec![Duration::from_secs(2)]);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_failure_is_not_retried() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::other("invalid header value"),
        Reply::status(200),
    ]);
    let executor = executor(transport);

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    assert_eq!(outcome, Outcome::Unexpected("invalid header value".to_string()));
    assert_eq!(executor.transport().call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_client_error_after_transient_failure_stops() {
    let transport = ScriptedTransport::sequence(vec![
        Reply::status(502),
        Reply::text(422, "bad prompt"),
        Reply::status(200),
    ]);
    let executor = executor(transport);

    let outcome = executor.execute(&descriptor(3, Duration::from_secs(2))).await;

    assert_eq!(outcome.status(), Some(422));
    assert_eq!(executor.transport().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget_never_waits() {
    let executor = executor(ScriptedTransport::always(Reply::status(503)));
    let started = Instant::now();

    let outcome = executor.execute(&descriptor(1, Duration::from_secs(10))).await;

    assert!(matches!(outcome, Outcome::ExhaustedRetries { attempts: 1, .. }));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_calls_are_independent() {
    let executor = executor(ScriptedTransport::always(Reply::text(200, "ok")));
    let descriptor = descriptor(3, Duration::from_secs(2));

    let first = executor.execute(&descriptor).await;
    let second = executor.execute(&descriptor).await;

    assert!(first.is_success());
    assert_eq!(first, second);
    assert_eq!(executor.transport().call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_descriptor_inherits_configured_policy() -> anyhow::Result<()> {
    let config = RetryConfig::default()
        .with_max_retries(2)
        .with_retry_delay_ms(250)
        .with_timeout_secs(5);
    let executor = CallExecutor::with_transport(ScriptedTransport::always(Reply::status(500)), config);

    let descriptor = executor
        .descriptor("https://api.example.com/v1/images/generations")
        .method(Method::Get)
        .build()?;
    assert_eq!(*descriptor.timeout(), Duration::from_secs(5));

    let outcome = executor.execute(&descriptor).await;
    assert!(matches!(outcome, Outcome::ExhaustedRetries { attempts: 2, .. }));
    assert_eq!(gaps(executor.transport()), vec![Duration::from_millis(250)]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_execute_ok_maps_failures_to_errors() {
    let executor = executor(ScriptedTransport::always(Reply::text(403, "forbidden")));

    let err = executor
        .execute_ok(&descriptor(3, Duration::from_secs(2)))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(403));
}
