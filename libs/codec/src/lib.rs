//! # SMS Forwarder Codec
//!
//! ## Purpose
//!
//! The "rules" layer of the forwarding pipeline:
//! - Decoding raw inbound protocol units (3GPP TS 23.040 SMS-DELIVER PDUs)
//!   into [`MessageRecord`](types::MessageRecord) values
//! - Encoding a record into the JSON wire body sent to the forwarding endpoint
//! - Building SMS-DELIVER PDUs for fixtures and demo hosts
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/message_sink
//!     ↑           ↓              ↓
//! MessageRecord  PDU decode    HTTP delivery
//! FormatTag      JSON encode
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Network transport logic (belongs in message_sink)
//! - Scheduling or lifecycle handling (belongs in services/forwarder)
//!
//! Decoding is pure computation. A malformed unit only ever fails itself:
//! [`decode_batch`] logs the failure and keeps going.

pub mod builder;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod gsm7;
pub mod payload;
pub mod pdu;

pub use builder::{Alphabet, DeliverPduBuilder};
pub use decoder::{decode_batch, decode_unit, DecodedBatch, UnitFailure};
pub use error::{CodecError, CodecResult, DecodeError};
pub use payload::{encode_record, WirePayload};
pub use pdu::{DataCoding, DeliverPdu};
