//! Human-readable service status

use std::fmt;

use message_sink::StatsSnapshot;

/// Snapshot of everything a host UI shows about the forwarder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub permissions_granted: bool,
    pub battery_optimization_exempt: bool,
    pub running: bool,
    pub endpoint: Option<String>,
    pub in_flight: usize,
    pub stats: StatsSnapshot,
}

impl StatusReport {
    /// Permissions granted and the service running
    pub fn is_forwarding(&self) -> bool {
        self.permissions_granted && self.running
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SMS permissions: {} {}",
            mark(self.permissions_granted),
            if self.permissions_granted { "granted" } else { "not granted" }
        )?;
        writeln!(
            f,
            "Battery optimization: {} {}",
            mark(self.battery_optimization_exempt),
            if self.battery_optimization_exempt {
                "disabled"
            } else {
                "enabled (disable for reliability)"
            }
        )?;
        writeln!(
            f,
            "Background service: {} {}",
            mark(self.running),
            if self.running { "running" } else { "stopped" }
        )?;
        if let Some(endpoint) = &self.endpoint {
            writeln!(f, "Endpoint: {endpoint}")?;
        }
        writeln!(f, "In flight: {}", self.in_flight)?;
        writeln!(f, "Deliveries: {}", self.stats)?;

        if self.is_forwarding() {
            write!(f, "SMS forwarding active")
        } else if !self.permissions_granted {
            write!(f, "Grant SMS permissions first")
        } else {
            write!(f, "Start the background service")
        }
    }
}
