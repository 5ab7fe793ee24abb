//! # SMS Forwarder Service
//!
//! ## Purpose
//!
//! Receives inbound SMS broadcasts, decodes their PDUs and forwards each
//! message as a JSON POST to a configured endpoint.
//!
//! ## Architecture Role
//!
//! ```text
//! host broadcast → [ForwarderService] → codec::decode_batch → [BackgroundRunner]
//!                        ↓                                          ↓
//!                  start / stop / status               encode_record → MessageSink
//! ```
//!
//! The host thread only ever decodes and schedules. Delivery runs on tokio
//! tasks, one per message, with a single attempt each.

pub mod lifecycle;
pub mod preconditions;
pub mod runner;
pub mod service;
pub mod status;
pub mod supervisor;
pub mod telemetry;

pub use lifecycle::{Broadcast, BroadcastLine, LifecycleEvent};
pub use preconditions::{Preconditions, StaticPreconditions};
pub use runner::{BackgroundRunner, DeliveryOutcome, DeliveryReport, DEFAULT_MAX_IN_FLIGHT};
pub use service::{ForwarderService, StartError};
pub use status::StatusReport;
pub use supervisor::Supervisor;
pub use telemetry::init_tracing;
