//! In-memory sinks for exercising the pipeline without a network

use crate::{
    DeliveryError, DeliveryReceipt, DeliveryRequest, MessageSink, SendContext, SinkMetadata,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A sink that collects request bodies with bounded storage
#[derive(Debug)]
pub struct CollectorSink {
    /// Bounded queue to prevent memory leaks
    requests: Arc<Mutex<VecDeque<DeliveryRequest>>>,
    max_requests: usize,
    /// Remaining deliveries to fail
    fail_next: AtomicUsize,
    /// Requests whose body contains this marker are answered with a 500
    fail_marker: Mutex<Option<Vec<u8>>>,
    delivered: AtomicU64,
    failed: AtomicU64,
    name: String,
}

impl CollectorSink {
    /// Create a new collector sink with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_requests: usize) -> Self {
        Self {
            requests: Arc::new(Mutex::new(VecDeque::with_capacity(max_requests.min(1024)))),
            max_requests,
            fail_next: AtomicUsize::new(0),
            fail_marker: Mutex::new(None),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            name: "test-collector".to_string(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let mut sink = Self::new();
        sink.name = name.into();
        sink
    }

    /// Get all accepted request bodies
    pub fn received_payloads(&self) -> Vec<Vec<u8>> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.payload.clone())
            .collect()
    }

    /// Get all accepted requests
    pub fn received_requests(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().iter().cloned().collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of deliveries answered with an error
    pub fn failure_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Configure to fail the next delivery
    pub fn fail_next_delivery(&self) {
        self.fail_next_deliveries(1);
    }

    /// Configure to fail the next `count` deliveries
    pub fn fail_next_deliveries(&self, count: usize) {
        self.fail_next.store(count, Ordering::Relaxed);
    }

    /// Reject every body containing `marker`
    pub fn fail_payloads_containing(&self, marker: impl AsRef<[u8]>) {
        *self.fail_marker.lock() = Some(marker.as_ref().to_vec());
    }

    fn should_fail(&self, request: &DeliveryRequest) -> bool {
        if self
            .fail_next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
        {
            return true;
        }
        match self.fail_marker.lock().as_deref() {
            Some(marker) if !marker.is_empty() => request
                .payload
                .windows(marker.len())
                .any(|window| window == marker),
            _ => false,
        }
    }
}

impl Default for CollectorSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSink for CollectorSink {
    async fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError> {
        if self.should_fail(&request) {
            self.failed.fetch_add(1, Ordering::Relaxed);
            return Err(DeliveryError::non_success_status(
                500,
                "Simulated failure",
                request.context(),
            ));
        }

        {
            let mut requests = self.requests.lock();
            if requests.len() >= self.max_requests {
                requests.pop_front();
            }
            requests.push_back(request);
        }
        self.delivered.fetch_add(1, Ordering::Relaxed);

        Ok(DeliveryReceipt {
            status: 200,
            body: String::new(),
        })
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new(self.name.clone(), "collector").with_endpoint("memory://test")
    }
}

/// A sink that always fails with the same error
#[derive(Debug)]
pub struct FailingSink {
    error: DeliveryError,
    attempts: AtomicU64,
}

impl FailingSink {
    pub fn new(error: DeliveryError) -> Self {
        Self {
            error,
            attempts: AtomicU64::new(0),
        }
    }

    /// Fails every request as a refused connection
    pub fn refusing() -> Self {
        Self::new(DeliveryError::ConnectionRefused {
            endpoint: "http://127.0.0.1:9/".to_string(),
        })
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl Default for FailingSink {
    fn default() -> Self {
        Self::new(DeliveryError::non_success_status(
            500,
            "Simulated failure",
            SendContext::new(0),
        ))
    }
}

#[async_trait]
impl MessageSink for FailingSink {
    async fn deliver(&self, request: DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Err(match &self.error {
            DeliveryError::NonSuccessStatus { status, body, .. } => {
                DeliveryError::non_success_status(*status, body.clone(), request.context())
            }
            other => other.clone(),
        })
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("failing-sink", "test-failing")
    }
}

/// A sink that simulates slow endpoints and tracks concurrency
#[derive(Debug)]
pub struct SlowSink {
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicU64,
}

impl SlowSink {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Highest number of deliveries observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSink for SlowSink {
    async fn deliver(&self, _request: DeliveryRequest) -> Result<DeliveryReceipt, DeliveryError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(DeliveryReceipt {
            status: 200,
            body: String::new(),
        })
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("slow-sink", "test-slow")
            .with_endpoint(format!("slow://{}ms", self.delay.as_millis()))
    }
}
