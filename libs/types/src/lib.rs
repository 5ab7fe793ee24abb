//! # SMS Forwarder Types
//!
//! Shared type system for the message-capture-and-forward pipeline.
//!
//! ## Design Philosophy
//!
//! - **Immutable records**: a [`MessageRecord`] is built once by the decoder and
//!   consumed once by the delivery step. There is no mutating API.
//! - **Transport time only**: timestamps come from the origin transport, never
//!   from the local clock.
//! - **Owned state cells**: [`ServiceState`] is an explicit atomic cell shared by
//!   `Arc`, not a process-wide global.
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{FormatTag, MessageRecord, ServiceState, UNKNOWN_SENDER};
//!
//! let record = MessageRecord::new(None, Some("Hello".to_string()), 1_700_000_000_000);
//! assert_eq!(record.sender(), UNKNOWN_SENDER);
//!
//! let format = FormatTag::from_tag(Some("3gpp"));
//! assert_eq!(format, FormatTag::Gsm3gpp);
//!
//! let state = ServiceState::new();
//! assert!(!state.is_running());
//! ```

pub mod format;
pub mod record;
pub mod state;

pub use format::FormatTag;
pub use record::{MessageRecord, UNKNOWN_SENDER};
pub use state::ServiceState;
