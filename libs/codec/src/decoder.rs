//! Batch decoding of inbound protocol units into message records
//!
//! A batch is the list of raw units delivered by one inbound-message
//! broadcast. Each unit is decoded on its own: one that fails is reported in
//! [`DecodedBatch::failures`] and logged, and the rest of the batch carries on.
//! Multi-part messages are not reassembled, so every unit becomes its own
//! record.

use tracing::{debug, warn};
use types::{FormatTag, MessageRecord};

use crate::error::DecodeError;
use crate::pdu::DeliverPdu;

/// Decode failure for one unit of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    /// Position of the unit in the batch
    pub index: usize,
    pub error: DecodeError,
}

/// Outcome of decoding a batch
#[derive(Debug, Default)]
pub struct DecodedBatch {
    /// Records in batch order
    pub records: Vec<MessageRecord>,
    pub failures: Vec<UnitFailure>,
}

impl DecodedBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }
}

/// Decode one unit under the given format
pub fn decode_unit(unit: &[u8], format: &FormatTag) -> Result<MessageRecord, DecodeError> {
    match format {
        FormatTag::Gsm3gpp => DeliverPdu::parse(unit).map(DeliverPdu::into_record),
        other => Err(DecodeError::UnsupportedFormat {
            tag: other.as_str().to_string(),
        }),
    }
}

/// Decode every unit in `units`
///
/// `format` is the tag carried by the broadcast; absent means "3gpp".
pub fn decode_batch<U: AsRef<[u8]>>(units: &[U], format: Option<&str>) -> DecodedBatch {
    let mut batch = DecodedBatch::default();
    if units.is_empty() {
        debug!("Inbound batch carried no units");
        return batch;
    }

    let format = FormatTag::from_tag(format);
    for (index, unit) in units.iter().enumerate() {
        match decode_unit(unit.as_ref(), &format) {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                warn!(
                    index,
                    format = %format,
                    kind = error.kind(),
                    unit_len = unit.as_ref().len(),
                    "Dropping undecodable unit: {}",
                    error
                );
                batch.failures.push(UnitFailure { index, error });
            }
        }
    }

    debug!(
        format = %format,
        decoded = batch.records.len(),
        failed = batch.failures.len(),
        "Decoded inbound batch"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_PDU: &str = "00040B915155214365F700003211412231020005C8329BFD06";

    #[test]
    fn test_empty_batch_is_noop() {
        let batch = decode_batch::<Vec<u8>>(&[], None);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_default_format_is_3gpp() {
        let units = vec![hex::decode(HELLO_PDU).unwrap()];
        let batch = decode_batch(&units, None);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].sender(), "+15551234567");
    }

    #[test]
    fn test_bad_unit_does_not_stop_batch() {
        let good = hex::decode(HELLO_PDU).unwrap();
        let units = vec![vec![0x00, 0x04], good.clone(), good];
        let batch = decode_batch(&units, Some("3gpp"));
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].index, 0);
    }

    #[test]
    fn test_3gpp2_units_are_unsupported() {
        let units = vec![hex::decode(HELLO_PDU).unwrap()];
        let batch = decode_batch(&units, Some("3gpp2"));
        assert!(batch.records.is_empty());
        assert_eq!(
            batch.failures[0].error,
            DecodeError::UnsupportedFormat {
                tag: "3gpp2".to_string()
            }
        );
    }
}
