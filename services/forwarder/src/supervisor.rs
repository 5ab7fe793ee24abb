//! Restart policy applied when the host removes the service's task
//!
//! The pipeline itself knows nothing about restarts; the host reports the
//! termination here and the supervisor decides whether to start again.

use forwarder_config::RestartPolicy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::service::{ForwarderService, StartError};

#[derive(Debug)]
pub struct Supervisor {
    service: Arc<ForwarderService>,
    policy: RestartPolicy,
    restarts: AtomicU64,
}

impl Supervisor {
    pub fn new(service: Arc<ForwarderService>, policy: RestartPolicy) -> Self {
        Self {
            service,
            policy,
            restarts: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> RestartPolicy {
        self.policy
    }

    /// Successful restarts so far
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// The host removed the task; returns whether the service was started again
    pub fn on_task_removed(&self) -> Result<bool, StartError> {
        match self.policy {
            RestartPolicy::Never => {
                info!("Task removed, restart policy is never; leaving service stopped");
                self.service.stop();
                Ok(false)
            }
            RestartPolicy::Sticky => {
                info!("Task removed, restarting forwarder service");
                match self.service.on_process_restart_requested() {
                    Ok(()) => {
                        self.restarts.fetch_add(1, Ordering::Relaxed);
                        Ok(true)
                    }
                    Err(e) => {
                        warn!("Restart refused: {}", e);
                        Err(e)
                    }
                }
            }
        }
    }
}
