//! Parsed inbound message record

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel substituted when the transport carries no origin address
pub const UNKNOWN_SENDER: &str = "Unknown";

/// One parsed inbound message
///
/// Constructed by the decoder, one per protocol unit, and consumed exactly once
/// by the encode+deliver step. Fields are private so a record cannot change
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRecord {
    sender: String,
    body: String,
    timestamp: i64,
}

impl MessageRecord {
    /// Build a record, applying the sentinel and empty-body defaults
    ///
    /// An empty sender is treated like an absent one and also becomes
    /// [`UNKNOWN_SENDER`], so the wire body never carries `"sender": ""`.
    pub fn new(sender: Option<String>, body: Option<String>, timestamp: i64) -> Self {
        Self {
            sender: sender
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            body: body.unwrap_or_default(),
            timestamp,
        }
    }

    /// Origin address, or [`UNKNOWN_SENDER`]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Text content, possibly empty
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Milliseconds since the Unix epoch, as stamped by the transport
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whether the sender sentinel was substituted
    pub fn has_unknown_sender(&self) -> bool {
        self.sender == UNKNOWN_SENDER
    }
}

impl fmt::Display for MessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from={} at={} ({} chars)",
            self.sender,
            self.timestamp,
            self.body.chars().count()
        )
    }
}
