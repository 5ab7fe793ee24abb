//! # Background Runner
//!
//! Moves the encode→deliver half of the pipeline off the caller's thread.
//! [`BackgroundRunner::schedule`] returns immediately; each record becomes one
//! task on the forwarder's runtime and runs to completion on its own.
//!
//! ## Guarantees
//!
//! - One delivery attempt per scheduled record, never retried
//! - No ordering between records, and one record's failure never touches another
//! - At most `max_in_flight` deliveries run at once; the rest wait for a permit
//!   and are never dropped
//! - Stopping the service does not cancel anything already scheduled

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use codec::encode_record;
use message_sink::{DeliveryError, DeliveryRequest, DeliveryStats, MessageSink, StatsSnapshot};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify, Semaphore};
use tracing::{debug, error, info};
use types::MessageRecord;

/// Default bound on concurrently running deliveries
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// What happened to one scheduled record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { status: u16 },
    Failed(DeliveryError),
    /// Never reached the sink
    Unencodable(String),
}

/// Published on the report channel after each attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sender: String,
    pub timestamp: i64,
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Delivered { .. })
    }
}

#[derive(Debug)]
struct RunnerInner {
    handle: Handle,
    sink: Arc<dyn MessageSink>,
    permits: Arc<Semaphore>,
    stats: Arc<DeliveryStats>,
    in_flight: AtomicUsize,
    idle: Notify,
    reports: Option<mpsc::UnboundedSender<DeliveryReport>>,
}

/// Fire-and-forget scheduler for encode+deliver tasks
#[derive(Debug, Clone)]
pub struct BackgroundRunner {
    inner: Arc<RunnerInner>,
}

impl BackgroundRunner {
    pub fn new(handle: Handle, sink: Arc<dyn MessageSink>, max_in_flight: usize) -> Self {
        Self::build(handle, sink, max_in_flight, None)
    }

    /// Runner that also publishes a [`DeliveryReport`] per record
    pub fn with_reports(
        handle: Handle,
        sink: Arc<dyn MessageSink>,
        max_in_flight: usize,
    ) -> (Self, mpsc::UnboundedReceiver<DeliveryReport>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::build(handle, sink, max_in_flight, Some(tx)), rx)
    }

    fn build(
        handle: Handle,
        sink: Arc<dyn MessageSink>,
        max_in_flight: usize,
        reports: Option<mpsc::UnboundedSender<DeliveryReport>>,
    ) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                handle,
                sink,
                permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
                stats: Arc::new(DeliveryStats::new()),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                reports,
            }),
        }
    }

    /// Hand a record to a background task and return
    ///
    /// Safe to call from synchronous code on any thread.
    pub fn schedule(&self, record: MessageRecord) {
        let guard = InFlightGuard::enter(self.inner.clone());
        let inner = self.inner.clone();
        debug!(
            sender = record.sender(),
            timestamp = record.timestamp(),
            in_flight = self.in_flight(),
            "Scheduling delivery"
        );

        self.inner.handle.spawn(async move {
            let _guard = guard;
            let _permit = inner.permits.clone().acquire_owned().await.ok();
            let outcome = deliver_one(&inner, &record).await;
            if let Some(reports) = &inner.reports {
                let _ = reports.send(DeliveryReport {
                    sender: record.sender().to_string(),
                    timestamp: record.timestamp(),
                    outcome,
                });
            }
        });
    }

    /// Tasks scheduled and not yet finished
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn sink(&self) -> &Arc<dyn MessageSink> {
        &self.inner.sink
    }

    /// Wait until every scheduled task has finished
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// [`wait_idle`](Self::wait_idle) with an upper bound; `false` on timeout
    pub async fn wait_idle_for(&self, limit: Duration) -> bool {
        tokio::time::timeout(limit, self.wait_idle()).await.is_ok()
    }
}

async fn deliver_one(inner: &RunnerInner, record: &MessageRecord) -> DeliveryOutcome {
    let payload = match encode_record(record) {
        Ok(payload) => payload,
        Err(e) => {
            inner.stats.record_unencodable();
            error!(
                sender = record.sender(),
                timestamp = record.timestamp(),
                kind = "encode",
                "Failed to encode record, message dropped: {}",
                e
            );
            return DeliveryOutcome::Unencodable(e.to_string());
        }
    };

    let request = DeliveryRequest::json(payload)
        .with_correlation_id(format!("{}@{}", record.sender(), record.timestamp()));
    inner.stats.record_attempt();

    match inner.sink.deliver(request).await {
        Ok(receipt) => {
            inner.stats.record_success();
            info!(
                sender = record.sender(),
                timestamp = record.timestamp(),
                status = receipt.status,
                "Forwarded message"
            );
            DeliveryOutcome::Delivered {
                status: receipt.status,
            }
        }
        Err(e) => {
            inner.stats.record_failure(&e);
            match &e {
                DeliveryError::NonSuccessStatus { status, body, .. } => error!(
                    sender = record.sender(),
                    timestamp = record.timestamp(),
                    kind = e.kind(),
                    status = *status,
                    response_body = %body,
                    "Endpoint rejected message, dropped"
                ),
                _ => error!(
                    sender = record.sender(),
                    timestamp = record.timestamp(),
                    kind = e.kind(),
                    "Delivery failed, message dropped: {}",
                    e
                ),
            }
            DeliveryOutcome::Failed(e)
        }
    }
}

/// Counts a task from scheduling until its future is dropped
#[derive(Debug)]
struct InFlightGuard {
    inner: Arc<RunnerInner>,
}

impl InFlightGuard {
    fn enter(inner: Arc<RunnerInner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::AcqRel);
        Self { inner }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use message_sink::test_utils::{CollectorSink, FailingSink, SlowSink};

    fn record(sender: &str, body: &str) -> MessageRecord {
        MessageRecord::new(Some(sender.to_string()), Some(body.to_string()), 1_700_000_000_000)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_schedule_delivers_encoded_body() {
        let sink = Arc::new(CollectorSink::new());
        let runner = BackgroundRunner::new(Handle::current(), sink.clone(), 4);

        runner.schedule(record("+15551234567", "Hello"));
        runner.wait_idle().await;

        assert_eq!(
            sink.received_payloads(),
            vec![br#"{"sender": "+15551234567", "message": "Hello", "timestamp": 1700000000000}"#.to_vec()]
        );
        let stats = runner.stats();
        assert_eq!(stats.attempted, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(runner.in_flight(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failures_are_reported_not_retried() {
        let sink = Arc::new(FailingSink::refusing());
        let (runner, mut reports) = BackgroundRunner::with_reports(Handle::current(), sink.clone(), 4);

        runner.schedule(record("+1", "a"));
        let report = reports.recv().await.unwrap();

        assert!(!report.is_delivered());
        assert!(matches!(
            report.outcome,
            DeliveryOutcome::Failed(DeliveryError::ConnectionRefused { .. })
        ));
        runner.wait_idle().await;
        assert_eq!(sink.attempts(), 1);
        assert_eq!(runner.stats().unreachable, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_is_bounded() {
        let sink = Arc::new(SlowSink::new(30));
        let runner = BackgroundRunner::new(Handle::current(), sink.clone(), 2);

        for i in 0..8 {
            runner.schedule(record("+1", &i.to_string()));
        }
        assert!(runner.in_flight() > 0);
        assert!(runner.wait_idle_for(Duration::from_secs(5)).await);

        assert_eq!(sink.completed(), 8);
        assert!(sink.peak_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_nothing_scheduled() {
        let runner = BackgroundRunner::new(Handle::current(), Arc::new(CollectorSink::new()), 1);
        assert!(runner.wait_idle_for(Duration::from_millis(50)).await);
    }
}
