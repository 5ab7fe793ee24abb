//! Observational service state

use std::sync::atomic::{AtomicBool, Ordering};

/// Running flag for the background worker
///
/// Written only on start/stop transitions and read by status reporting.
/// Nothing in the pipeline branches on it.
#[derive(Debug, Default)]
pub struct ServiceState {
    running: AtomicBool,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark running; returns the previous value
    pub fn mark_running(&self) -> bool {
        self.running.swap(true, Ordering::AcqRel)
    }

    /// Mark stopped; returns the previous value
    pub fn mark_stopped(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
