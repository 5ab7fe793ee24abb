//! Host-side gates checked before the service starts

use std::sync::atomic::{AtomicBool, Ordering};

/// What the host reports about the forwarder's standing
pub trait Preconditions: Send + Sync + std::fmt::Debug {
    /// Receive/read SMS permissions (and whatever else the host requires) are granted
    fn permissions_granted(&self) -> bool;

    /// The host will not suspend the process to save power
    fn battery_optimization_exempt(&self) -> bool;
}

/// Fixed answers, for hosts without a permission model
///
/// Both flags can be flipped at runtime to model a user granting or revoking
/// permissions.
#[derive(Debug)]
pub struct StaticPreconditions {
    permissions: AtomicBool,
    battery_exempt: AtomicBool,
}

impl StaticPreconditions {
    pub fn new(permissions_granted: bool, battery_optimization_exempt: bool) -> Self {
        Self {
            permissions: AtomicBool::new(permissions_granted),
            battery_exempt: AtomicBool::new(battery_optimization_exempt),
        }
    }

    /// Everything granted
    pub fn granted() -> Self {
        Self::new(true, true)
    }

    pub fn set_permissions_granted(&self, granted: bool) {
        self.permissions.store(granted, Ordering::Release);
    }

    pub fn set_battery_optimization_exempt(&self, exempt: bool) {
        self.battery_exempt.store(exempt, Ordering::Release);
    }
}

impl Default for StaticPreconditions {
    fn default() -> Self {
        Self::granted()
    }
}

impl Preconditions for StaticPreconditions {
    fn permissions_granted(&self) -> bool {
        self.permissions.load(Ordering::Acquire)
    }

    fn battery_optimization_exempt(&self) -> bool {
        self.battery_exempt.load(Ordering::Acquire)
    }
}
