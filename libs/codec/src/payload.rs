//! JSON wire payload for the forwarding endpoint
//!
//! The body is a single-line object with a fixed member order:
//!
//! ```text
//! {"sender": "+15551234567", "message": "Hello", "timestamp": 1700000000000}
//! ```
//!
//! String escaping is serde_json's, so quotes, backslashes and control
//! characters in the sender or message can never break the object.

use std::borrow::Cow;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use types::MessageRecord;

use crate::error::CodecResult;

/// Wire shape of one forwarded message
///
/// Field order here is the order on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload<'a> {
    #[serde(borrow)]
    pub sender: Cow<'a, str>,
    #[serde(borrow)]
    pub message: Cow<'a, str>,
    pub timestamp: i64,
}

impl<'a> From<&'a MessageRecord> for WirePayload<'a> {
    fn from(record: &'a MessageRecord) -> Self {
        Self {
            sender: Cow::Borrowed(record.sender()),
            message: Cow::Borrowed(record.body()),
            timestamp: record.timestamp(),
        }
    }
}

/// Compact output with a space after `:` and `,`
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Encode a record as the request body
pub fn encode_record(record: &MessageRecord) -> CodecResult<Vec<u8>> {
    let mut body = Vec::with_capacity(64 + record.sender().len() + record.body().len());
    let mut serializer = Serializer::with_formatter(&mut body, SpacedFormatter);
    WirePayload::from(record).serialize(&mut serializer)?;
    Ok(body)
}
