//! HttpSink against real sockets
//!
//! mockito stands in for the forwarding endpoint; the failure cases use bare
//! TCP listeners to produce refused and silent peers.

use message_sink::{DeliveryError, DeliveryRequest, DeliveryTimeouts, HttpSink, MessageSink};
use mockito::Matcher;
use std::net::TcpListener;
use std::time::{Duration, Instant};

const BODY: &str = r#"{"sender": "+15551234567", "message": "Hello", "timestamp": 1700000000000}"#;

fn short_timeouts() -> DeliveryTimeouts {
    DeliveryTimeouts {
        connect: Duration::from_millis(500),
        read: Duration::from_millis(300),
    }
}

#[tokio::test]
async fn test_posts_json_body_and_accepts_200() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/sms")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact(BODY.to_string()))
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let sink = HttpSink::new(&format!("{}/sms", server.url()), DeliveryTimeouts::default()).unwrap();
    let receipt = sink
        .deliver(DeliveryRequest::json(BODY.as_bytes().to_vec()))
        .await
        .unwrap();

    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_any_2xx_is_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/sms")
        .with_status(204)
        .create_async()
        .await;

    let sink = HttpSink::new(&format!("{}/sms", server.url()), DeliveryTimeouts::default()).unwrap();
    let receipt = sink.deliver(DeliveryRequest::json(b"{}".to_vec())).await.unwrap();
    assert_eq!(receipt.status, 204);
}

#[tokio::test]
async fn test_500_is_non_success_status_with_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/sms")
        .with_status(500)
        .with_body("backend down")
        .expect(1)
        .create_async()
        .await;

    let sink = HttpSink::new(&format!("{}/sms", server.url()), DeliveryTimeouts::default()).unwrap();
    let err = sink
        .deliver(DeliveryRequest::json(BODY.as_bytes().to_vec()).with_correlation_id("unit-0"))
        .await
        .unwrap_err();

    match err {
        DeliveryError::NonSuccessStatus {
            status,
            body,
            context,
        } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend down");
            assert_eq!(context.correlation_id.as_deref(), Some("unit-0"));
        }
        other => panic!("expected NonSuccessStatus, got {other:?}"),
    }
    // Exactly one attempt: no retry
    mock.assert_async().await;
}

#[tokio::test]
async fn test_refused_connection() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let sink = HttpSink::new(&format!("http://127.0.0.1:{port}/sms"), short_timeouts()).unwrap();
    let err = sink.deliver(DeliveryRequest::json(vec![])).await.unwrap_err();
    assert!(
        matches!(err, DeliveryError::ConnectionRefused { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_silent_peer_times_out_within_bounds() {
    // Accepted by the kernel backlog, never answered
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let sink = HttpSink::new(&format!("http://127.0.0.1:{port}/sms"), short_timeouts()).unwrap();
    let started = Instant::now();
    let err = sink.deliver(DeliveryRequest::json(vec![])).await.unwrap_err();

    assert!(matches!(err, DeliveryError::Timeout { .. }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
    drop(listener);
}

#[tokio::test]
async fn test_unresolvable_host_fails_without_hanging() {
    let sink = HttpSink::new("http://forwarder.invalid/sms", short_timeouts()).unwrap();
    let started = Instant::now();
    let err = sink.deliver(DeliveryRequest::json(vec![])).await.unwrap_err();

    assert!(
        matches!(
            err,
            DeliveryError::UnresolvedHost { .. } | DeliveryError::Timeout { .. }
        ),
        "got {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}
