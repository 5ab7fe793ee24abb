//! # Message Sink
//!
//! Delivery side of the forwarder: a [`MessageSink`] takes one encoded
//! [`DeliveryRequest`] and makes exactly one attempt to hand it to the
//! forwarding endpoint. The production sink is [`HttpSink`]; the sinks in
//! [`test_utils`] stand in for it in tests.
//!
//! There is no retry, backoff or queueing anywhere in this crate. A failed
//! attempt is reported to the caller and the request is dropped.

pub mod error;
pub mod http;
pub mod metadata;
pub mod request;
pub mod stats;
pub mod test_utils;

use async_trait::async_trait;
use std::fmt::Debug;

pub use error::{DeliveryError, SendContext};
pub use http::{DeliveryTimeouts, HttpSink};
pub use metadata::SinkMetadata;
pub use request::{DeliveryReceipt, DeliveryRequest, JSON_CONTENT_TYPE};
pub use stats::{DeliveryStats, StatsSnapshot};

/// A destination for encoded messages that abstracts away transport details
#[async_trait]
pub trait MessageSink: Send + Sync + Debug {
    /// Make a single delivery attempt
    ///
    /// `Ok` only for a 2xx answer. The request is consumed either way.
    async fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError>;

    /// Get sink metadata for debugging/monitoring
    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CollectorSink, FailingSink, SlowSink};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_collector_keeps_bodies_in_order() {
        let sink = CollectorSink::new();

        for body in ["one", "two", "three"] {
            let receipt = sink
                .deliver(DeliveryRequest::json(body.as_bytes().to_vec()))
                .await
                .unwrap();
            assert_eq!(receipt.status, 200);
        }

        assert_eq!(sink.request_count(), 3);
        let received = sink.received_payloads();
        assert_eq!(received[0], b"one");
        assert_eq!(received[2], b"three");
        assert!(sink
            .received_requests()
            .iter()
            .all(|r| r.content_type == JSON_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn test_collector_fails_marked_payloads_only() {
        let sink = CollectorSink::new();
        sink.fail_payloads_containing("poison");

        let err = sink
            .deliver(DeliveryRequest::json(b"{\"message\": \"poison\"}".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(sink
            .deliver(DeliveryRequest::json(b"{\"message\": \"fine\"}".to_vec()))
            .await
            .is_ok());

        assert_eq!(sink.request_count(), 1);
        assert_eq!(sink.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_delivery_is_one_shot() {
        let sink = CollectorSink::with_name("one-shot");
        sink.fail_next_delivery();
        assert!(sink.deliver(DeliveryRequest::json(vec![1])).await.is_err());
        assert!(sink.deliver(DeliveryRequest::json(vec![2])).await.is_ok());
        assert_eq!(sink.metadata().name, "one-shot");
    }

    #[tokio::test]
    async fn test_fail_next_deliveries_counts_down() {
        let sink = CollectorSink::new();
        sink.fail_next_deliveries(2);
        assert!(sink.deliver(DeliveryRequest::json(vec![1])).await.is_err());
        assert!(sink.deliver(DeliveryRequest::json(vec![2])).await.is_err());
        assert!(sink.deliver(DeliveryRequest::json(vec![3])).await.is_ok());
        assert_eq!(sink.failure_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_sink_counts_attempts() {
        let sink = FailingSink::refusing();
        let err = sink.deliver(DeliveryRequest::json(vec![])).await.unwrap_err();
        assert_eq!(err.kind(), "connection_refused");
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn test_slow_sink_tracks_concurrency() {
        let sink = Arc::new(SlowSink::new(50));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.deliver(DeliveryRequest::json(vec![i])).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(sink.completed(), 4);
        assert!(sink.peak_in_flight() >= 2);
    }
}
