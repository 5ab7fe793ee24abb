//! # Forwarder Service
//!
//! The host-facing surface. Every entry point is synchronous and returns
//! promptly: decoding happens on the caller's thread, delivery happens on the
//! runner's tasks, and nothing that goes wrong downstream is reported back to
//! the caller.

use std::sync::Arc;

use codec::decode_batch;
use forwarder_config::ForwarderConfig;
use message_sink::{DeliveryError, DeliveryTimeouts, HttpSink, MessageSink};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use types::ServiceState;

use crate::lifecycle::{Broadcast, LifecycleEvent};
use crate::preconditions::Preconditions;
use crate::runner::BackgroundRunner;
use crate::status::StatusReport;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    #[error("SMS permissions not granted; grant them before starting the forwarder")]
    PermissionsMissing,
}

#[derive(Debug)]
pub struct ForwarderService {
    state: Arc<ServiceState>,
    runner: BackgroundRunner,
    preconditions: Arc<dyn Preconditions>,
    require_permissions: bool,
}

impl ForwarderService {
    pub fn new(runner: BackgroundRunner, preconditions: Arc<dyn Preconditions>) -> Self {
        Self {
            state: Arc::new(ServiceState::default()),
            runner,
            preconditions,
            require_permissions: true,
        }
    }

    /// Wire an [`HttpSink`] and runner from configuration
    pub fn from_config(
        config: &ForwarderConfig,
        handle: Handle,
        preconditions: Arc<dyn Preconditions>,
    ) -> Result<Self, DeliveryError> {
        let sink: Arc<dyn MessageSink> = Arc::new(HttpSink::new(
            &config.delivery.endpoint_url,
            DeliveryTimeouts {
                connect: config.delivery.connect_timeout(),
                read: config.delivery.read_timeout(),
            },
        )?);
        let runner = BackgroundRunner::new(handle, sink, config.runner.max_in_flight);
        Ok(Self::new(runner, preconditions).with_require_permissions(config.service.require_permissions))
    }

    pub fn with_require_permissions(mut self, require: bool) -> Self {
        self.require_permissions = require;
        self
    }

    pub fn state(&self) -> &Arc<ServiceState> {
        &self.state
    }

    pub fn runner(&self) -> &BackgroundRunner {
        &self.runner
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Inbound-message event: decode every unit and schedule each record
    ///
    /// Forwarding does not depend on the running flag; the host delivers
    /// these broadcasts whether or not the service is started.
    pub fn on_message_received<U: AsRef<[u8]>>(&self, units: &[U], format: Option<&str>) {
        let batch = decode_batch(units, format);
        if batch.records.is_empty() {
            return;
        }
        debug!(
            records = batch.records.len(),
            failures = batch.failures.len(),
            "Scheduling decoded batch"
        );
        for record in batch.records {
            self.runner.schedule(record);
        }
    }

    /// Host asks for the process to come back after its task was removed
    pub fn on_process_restart_requested(&self) -> Result<(), StartError> {
        debug!("Restart requested");
        self.start()
    }

    /// Mark the service running; repeated calls re-affirm
    pub fn start(&self) -> Result<(), StartError> {
        if self.require_permissions && !self.preconditions.permissions_granted() {
            warn!("Refusing to start: SMS permissions not granted");
            return Err(StartError::PermissionsMissing);
        }

        if self.state.mark_running() {
            debug!("Forwarder service already running");
        } else {
            info!("Forwarder service started");
            if !self.preconditions.battery_optimization_exempt() {
                warn!("Battery optimization is enabled; the host may suspend forwarding");
            }
        }
        Ok(())
    }

    /// Mark the service stopped; deliveries already scheduled still run
    pub fn stop(&self) {
        if self.state.mark_stopped() {
            info!(
                in_flight = self.runner.in_flight(),
                "Forwarder service stopped"
            );
        }
    }

    /// Dispatch one platform broadcast
    pub fn handle_broadcast(&self, broadcast: &Broadcast) {
        match broadcast.event() {
            LifecycleEvent::MessageReceived => match &broadcast.pdus {
                Some(pdus) if !pdus.is_empty() => {
                    self.on_message_received(pdus, broadcast.format.as_deref())
                }
                Some(_) => debug!("Inbound message broadcast carried no PDUs"),
                None => warn!("Inbound message broadcast without PDU extras"),
            },
            LifecycleEvent::BootCompleted => {
                info!(action = %broadcast.action, "Boot completed, starting forwarder service");
                if let Err(e) = self.start() {
                    warn!("Could not start after boot: {}", e);
                }
            }
            LifecycleEvent::Ignored => {
                debug!(action = %broadcast.action, "Ignoring broadcast");
            }
        }
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            permissions_granted: self.preconditions.permissions_granted(),
            battery_optimization_exempt: self.preconditions.battery_optimization_exempt(),
            running: self.is_running(),
            endpoint: self.runner.sink().metadata().endpoint,
            in_flight: self.runner.in_flight(),
            stats: self.runner.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditions::StaticPreconditions;
    use message_sink::test_utils::CollectorSink;

    fn service(preconditions: Arc<StaticPreconditions>) -> (ForwarderService, Arc<CollectorSink>) {
        let sink = Arc::new(CollectorSink::new());
        let runner = BackgroundRunner::new(Handle::current(), sink.clone(), 4);
        (ForwarderService::new(runner, preconditions), sink)
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (service, _) = service(Arc::new(StaticPreconditions::granted()));
        assert!(!service.is_running());
        service.start().unwrap();
        service.start().unwrap();
        assert!(service.is_running());
        service.stop();
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_start_requires_permissions() {
        let preconditions = Arc::new(StaticPreconditions::new(false, true));
        let (service, _) = service(preconditions.clone());

        assert_eq!(service.start(), Err(StartError::PermissionsMissing));
        assert!(!service.is_running());

        preconditions.set_permissions_granted(true);
        service.start().unwrap();
        assert!(service.is_running());
    }

    #[tokio::test]
    async fn test_permission_gate_can_be_disabled() {
        let (service, _) = service(Arc::new(StaticPreconditions::new(false, false)));
        let service = service.with_require_permissions(false);
        service.start().unwrap();
        assert!(service.status().running);
    }

    #[tokio::test]
    async fn test_unrelated_broadcast_is_ignored() {
        let (service, sink) = service(Arc::new(StaticPreconditions::granted()));
        service.handle_broadcast(&Broadcast::new("android.intent.action.SCREEN_ON"));
        service.runner().wait_idle().await;
        assert!(!service.is_running());
        assert_eq!(sink.request_count(), 0);
    }

    #[tokio::test]
    async fn test_message_broadcast_without_extras_is_noop() {
        let (service, sink) = service(Arc::new(StaticPreconditions::granted()));
        service.handle_broadcast(&Broadcast::new(crate::lifecycle::ACTION_SMS_RECEIVED));
        service.handle_broadcast(&Broadcast::sms_received(vec![], Some("3gpp")));
        service.runner().wait_idle().await;
        assert_eq!(sink.request_count(), 0);
    }
}
