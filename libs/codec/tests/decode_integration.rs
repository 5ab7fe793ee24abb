//! Integration tests for inbound batch decoding
//!
//! These tests build realistic SMS-DELIVER units and drive them through the
//! batch decoder and the wire encoder together.

use codec::{
    decode_batch, encode_record, Alphabet, DecodeError, DeliverPduBuilder, WirePayload,
};
use proptest::prelude::*;

const TS: i64 = 1_700_000_000_000;

#[test]
fn test_quoted_multiline_body_survives_decode_and_encode() {
    let unit = DeliverPduBuilder::new("+15551234567", "He said \"hi\"\nBye", TS)
        .build()
        .expect("Failed to build unit");

    let batch = decode_batch(&[unit], Some("3gpp"));
    assert!(batch.failures.is_empty());
    assert_eq!(batch.records[0].body(), "He said \"hi\"\nBye");

    let body = String::from_utf8(encode_record(&batch.records[0]).unwrap()).unwrap();
    assert!(body.contains(r#""message": "He said \"hi\"\nBye""#));
}

#[test]
fn test_mixed_batch_keeps_order_and_isolates_failures() {
    let first = DeliverPduBuilder::new("+4915112345678", "first", TS)
        .smsc("+31624000000")
        .build()
        .unwrap();
    let mut submit = first.clone();
    // SMSC length 7 puts the first octet at index 8
    submit[8] = 0x01;
    let third = DeliverPduBuilder::new("Shop", "Ünïcödé ✓", TS + 1_000)
        .timezone_quarters(8)
        .build()
        .unwrap();

    let batch = decode_batch(&[first, submit, third], None);

    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.records[0].sender(), "+4915112345678");
    assert_eq!(batch.records[0].body(), "first");
    assert_eq!(batch.records[1].sender(), "Shop");
    assert_eq!(batch.records[1].body(), "Ünïcödé ✓");
    assert_eq!(batch.records[1].timestamp(), TS + 1_000);

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].index, 1);
    assert_eq!(
        batch.failures[0].error,
        DecodeError::UnsupportedMessageType { mti: 1 }
    );
}

#[test]
fn test_unknown_format_fails_every_unit() {
    let unit = DeliverPduBuilder::new("+1", "x", TS).build().unwrap();
    let batch = decode_batch(&[unit.clone(), unit], Some("ims"));
    assert!(batch.records.is_empty());
    assert_eq!(batch.failures.len(), 2);
    assert!(batch
        .failures
        .iter()
        .all(|f| f.error.kind() == "unsupported_format"));
}

#[test]
fn test_eight_bit_unit_has_empty_body() {
    let mut unit = DeliverPduBuilder::new("+15551234567", "Hello", TS)
        .build()
        .unwrap();
    // DCS sits after SMSC(1) first octet(1) OA(2+6) PID(1)
    unit[11] = 0x04;
    let batch = decode_batch(&[unit], None);
    assert_eq!(batch.records[0].body(), "");
}

#[test]
fn test_wire_body_parses_back() {
    let unit = DeliverPduBuilder::new("", "no sender", TS)
        .alphabet(Alphabet::Ucs2)
        .build()
        .unwrap();
    let batch = decode_batch(&[unit], None);
    let body = encode_record(&batch.records[0]).unwrap();
    let payload: WirePayload<'_> = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload.sender, "Unknown");
    assert_eq!(payload.message, "no sender");
    assert_eq!(payload.timestamp, TS);
}

proptest! {
    #[test]
    fn prop_truncated_units_never_panic(cut in 0usize..40) {
        let unit = DeliverPduBuilder::new("+15551234567", "Hello there", TS)
            .build()
            .unwrap();
        let cut = cut.min(unit.len());
        let batch = decode_batch(&[&unit[..cut]], None);
        prop_assert_eq!(batch.records.len() + batch.failures.len(), 1);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let batch = decode_batch(&[bytes], None);
        prop_assert_eq!(batch.records.len() + batch.failures.len(), 1);
    }

    #[test]
    fn prop_gsm_text_round_trips(body in "[A-Za-z0-9 .,!?@£$]{0,140}") {
        let unit = DeliverPduBuilder::new("+15551234567", body.clone(), TS)
            .alphabet(Alphabet::Gsm7)
            .build()
            .unwrap();
        let batch = decode_batch(&[unit], None);
        prop_assert_eq!(batch.records[0].body(), body.as_str());
    }
}
