//! SMS forwarder host binary
//!
//! Stands in for the platform: reads broadcasts as newline-delimited JSON on
//! stdin and dispatches them to the forwarder service.
//!
//! ```text
//! {"action": "android.intent.action.BOOT_COMPLETED"}
//! {"action": "android.provider.Telephony.SMS_RECEIVED", "format": "3gpp", "pdus": ["0004..."]}
//! {"action": "task_removed"}
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use forwarder_config::ForwarderConfig;
use sms_forwarder::{
    init_tracing, Broadcast, BroadcastLine, ForwarderService, StaticPreconditions, Supervisor,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Synthetic action: the host removed the service's task
const ACTION_TASK_REMOVED: &str = "task_removed";

/// How long shutdown waits for deliveries still in flight
const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(name = "sms_forwarder")]
#[command(about = "Forward inbound SMS PDUs to an HTTP endpoint as JSON")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report SMS permissions as missing (exercises the start gate)
    #[arg(long)]
    deny_permissions: bool,

    /// Start immediately instead of waiting for a boot broadcast
    #[arg(long)]
    start: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = ForwarderConfig::load(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runner.worker_threads)
        .thread_name("sms-forwarder")
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run(config, args))
}

async fn run(config: ForwarderConfig, args: Args) -> Result<()> {
    info!("Starting SMS forwarder");
    info!(
        endpoint = %config.delivery.endpoint_url,
        max_in_flight = config.runner.max_in_flight,
        "Configuration loaded"
    );

    let preconditions = Arc::new(StaticPreconditions::new(!args.deny_permissions, true));
    let service = Arc::new(
        ForwarderService::from_config(&config, tokio::runtime::Handle::current(), preconditions)
            .context("Failed to create forwarder service")?,
    );
    let supervisor = Supervisor::new(service.clone(), config.service.restart_policy);

    if args.start {
        if let Err(e) = service.start() {
            warn!("Service not started: {}", e);
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("Failed to read stdin")? {
                Some(line) => dispatch(&service, &supervisor, &line),
                None => {
                    info!("Input closed");
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    service.stop();
    if !service.runner().wait_idle_for(SHUTDOWN_GRACE).await {
        warn!(
            in_flight = service.runner().in_flight(),
            "Deliveries still in flight at shutdown"
        );
    }
    info!("SMS forwarder stopped\n{}", service.status());
    Ok(())
}

fn dispatch(service: &ForwarderService, supervisor: &Supervisor, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let parsed: BroadcastLine = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Skipping malformed broadcast line: {}", e);
            return;
        }
    };

    if parsed.action == ACTION_TASK_REMOVED {
        if let Err(e) = supervisor.on_task_removed() {
            warn!("Supervisor could not restart service: {}", e);
        }
        return;
    }

    match Broadcast::try_from(parsed) {
        Ok(broadcast) => service.handle_broadcast(&broadcast),
        Err(e) => error!("Skipping broadcast with undecodable PDU hex: {}", e),
    }
}
