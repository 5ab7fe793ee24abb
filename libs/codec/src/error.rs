//! Codec errors for PDU decoding and payload encoding
//!
//! Each decode variant carries enough context (field, offset, raw octet) to
//! tell a truncated unit apart from an unsupported one in the logs.

use thiserror::Error;

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Failure to decode a single protocol unit
///
/// Always isolated to the unit that produced it; a batch keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Unit ended before a field could be read
    #[error("Truncated unit: {field} needs {needed} bytes at offset {offset}, unit has {len}")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// Format tag has no decoder
    #[error("Unsupported format tag {tag:?}: only \"3gpp\" units are decoded")]
    UnsupportedFormat { tag: String },

    /// Unit is not an SMS-DELIVER (submit, status report or reserved)
    #[error("Unsupported message type indicator {mti:#04b}: expected SMS-DELIVER (0b00)")]
    UnsupportedMessageType { mti: u8 },

    /// User data is compressed (TS 23.042), which is not supported
    #[error("Compressed user data is not supported (dcs {dcs:#04x})")]
    Compressed { dcs: u8 },

    /// Service centre timestamp does not describe a real instant
    #[error("Invalid service centre timestamp: {detail}")]
    InvalidTimestamp { detail: String },

    /// User data header length runs past the user data
    #[error("User data header length {header_len} exceeds user data of {available} bytes")]
    InvalidUserDataHeader { header_len: usize, available: usize },
}

impl DecodeError {
    pub fn truncated(field: &'static str, offset: usize, needed: usize, len: usize) -> Self {
        Self::Truncated {
            field,
            offset,
            needed,
            len,
        }
    }

    pub fn invalid_timestamp(detail: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            detail: detail.into(),
        }
    }

    /// Short stable label for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Truncated { .. } => "truncated",
            DecodeError::UnsupportedFormat { .. } => "unsupported_format",
            DecodeError::UnsupportedMessageType { .. } => "unsupported_message_type",
            DecodeError::Compressed { .. } => "compressed",
            DecodeError::InvalidTimestamp { .. } => "invalid_timestamp",
            DecodeError::InvalidUserDataHeader { .. } => "invalid_user_data_header",
        }
    }
}

/// Top-level codec error
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Serializer failure; escaping is total over text so this is not expected
    #[error("Failed to encode wire payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Character has no GSM 7-bit representation
    #[error("Character {ch:?} is not in the GSM 7-bit alphabet")]
    Unencodable { ch: char },

    /// Field does not fit its PDU length octet
    #[error("{field} too long: {len} exceeds limit of {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Value cannot be represented in its PDU field
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },
}

impl CodecError {
    pub fn field_too_long(field: &'static str, len: usize, max: usize) -> Self {
        Self::FieldTooLong { field, len, max }
    }
}
