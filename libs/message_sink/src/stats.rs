//! Delivery outcome counters
//!
//! Observability only: nothing reads these to decide whether to retry.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DeliveryError;

/// Lock-free counters shared by every delivery task
#[derive(Debug, Default)]
pub struct DeliveryStats {
    attempted: AtomicU64,
    delivered: AtomicU64,
    rejected: AtomicU64,
    timeouts: AtomicU64,
    unreachable: AtomicU64,
    transport_faults: AtomicU64,
    unencodable: AtomicU64,
}

/// Point-in-time copy of [`DeliveryStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub attempted: u64,
    pub delivered: u64,
    /// Answered with a non-2xx status
    pub rejected: u64,
    pub timeouts: u64,
    /// Unresolved host or refused connection
    pub unreachable: u64,
    pub transport_faults: u64,
    /// Records that never reached the sink
    pub unencodable: u64,
}

impl StatsSnapshot {
    pub fn failed(&self) -> u64 {
        self.rejected + self.timeouts + self.unreachable + self.transport_faults
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted={} delivered={} rejected={} timeouts={} unreachable={} transport_faults={} unencodable={}",
            self.attempted,
            self.delivered,
            self.rejected,
            self.timeouts,
            self.unreachable,
            self.transport_faults,
            self.unencodable
        )
    }
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &DeliveryError) {
        let counter = match error {
            DeliveryError::NonSuccessStatus { .. } => &self.rejected,
            DeliveryError::Timeout { .. } => &self.timeouts,
            DeliveryError::UnresolvedHost { .. } | DeliveryError::ConnectionRefused { .. } => {
                &self.unreachable
            }
            DeliveryError::Transport { .. }
            | DeliveryError::InvalidEndpoint { .. }
            | DeliveryError::ClientBuild(_) => &self.transport_faults,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unencodable(&self) {
        self.unencodable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            transport_faults: self.transport_faults.load(Ordering::Relaxed),
            unencodable: self.unencodable.load(Ordering::Relaxed),
        }
    }
}
