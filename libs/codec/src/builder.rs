//! # SMS-DELIVER PDU Builder
//!
//! ## Purpose
//!
//! Builds well-formed SMS-DELIVER PDUs, the mirror of [`crate::pdu`]. Used for
//! fixtures in tests and by demo hosts that need to fabricate inbound traffic.
//!
//! ```rust
//! use codec::{decode_unit, DeliverPduBuilder};
//! use types::FormatTag;
//!
//! let unit = DeliverPduBuilder::new("+15551234567", "Hello", 1_700_000_000_000)
//!     .build()
//!     .unwrap();
//! let record = decode_unit(&unit, &FormatTag::Gsm3gpp).unwrap();
//! assert_eq!(record.body(), "Hello");
//! ```

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

use crate::constants::*;
use crate::error::{CodecError, CodecResult};
use crate::gsm7;

/// Alphabet used for the user data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alphabet {
    /// GSM 7-bit when every character fits, UCS-2 otherwise
    #[default]
    Auto,
    Gsm7,
    Ucs2,
}

/// Concatenation reference carried in a user data header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Concatenation {
    reference: u8,
    total: u8,
    sequence: u8,
}

/// Builder for one SMS-DELIVER unit
#[derive(Debug, Clone)]
pub struct DeliverPduBuilder {
    sender: String,
    body: String,
    timestamp_ms: i64,
    tz_quarters: i8,
    smsc: Option<String>,
    alphabet: Alphabet,
    concatenation: Option<Concatenation>,
}

impl DeliverPduBuilder {
    /// `sender` starting with `+` is international, all-digit is national,
    /// anything else is alphanumeric. An empty sender encodes an empty address.
    pub fn new(sender: impl Into<String>, body: impl Into<String>, timestamp_ms: i64) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
            timestamp_ms,
            tz_quarters: 0,
            smsc: None,
            alphabet: Alphabet::Auto,
            concatenation: None,
        }
    }

    /// Timezone of the service centre timestamp, in quarter hours east of UTC
    pub fn timezone_quarters(mut self, quarters: i8) -> Self {
        self.tz_quarters = quarters;
        self
    }

    /// Prefix a service centre address (international digits)
    pub fn smsc(mut self, address: impl Into<String>) -> Self {
        self.smsc = Some(address.into());
        self
    }

    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Mark this unit as part `sequence` of `total` of a concatenated message
    pub fn concatenated(mut self, reference: u8, total: u8, sequence: u8) -> Self {
        self.concatenation = Some(Concatenation {
            reference,
            total,
            sequence,
        });
        self
    }

    pub fn build(&self) -> CodecResult<Vec<u8>> {
        let mut pdu = Vec::with_capacity(32 + self.body.len() * 2);

        match &self.smsc {
            Some(smsc) => {
                let digits = encode_bcd(smsc.trim_start_matches('+'))?;
                pdu.push((digits.len() + 1) as u8);
                pdu.push(TOA_EXTENSION | TON_INTERNATIONAL | NPI_ISDN);
                pdu.extend_from_slice(&digits);
            }
            None => pdu.push(0x00),
        }

        let mut first_octet = MTI_DELIVER | MMS_NO_MORE;
        if self.concatenation.is_some() {
            first_octet |= UDHI_BIT;
        }
        pdu.push(first_octet);

        self.push_address(&mut pdu)?;
        pdu.push(0x00); // PID: plain SMS

        let header = self.user_data_header();
        let use_ucs2 = match self.alphabet {
            Alphabet::Ucs2 => true,
            Alphabet::Gsm7 => false,
            Alphabet::Auto => gsm7::string_to_septets(&self.body).is_err(),
        };
        pdu.push(if use_ucs2 { 0x08 } else { 0x00 });
        pdu.extend_from_slice(&self.encode_timestamp()?);

        if use_ucs2 {
            let mut user_data = header;
            for unit in self.body.encode_utf16() {
                user_data.extend_from_slice(&unit.to_be_bytes());
            }
            check_len("user data", user_data.len(), MAX_USER_DATA_OCTETS)?;
            pdu.push(user_data.len() as u8);
            pdu.extend_from_slice(&user_data);
        } else {
            let septets = gsm7::string_to_septets(&self.body)?;
            let header_septets = (header.len() * 8 + 6) / 7;
            let udl = header_septets + septets.len();
            check_len("user data", udl, MAX_GSM7_SEPTETS)?;
            pdu.push(udl as u8);
            pdu.extend_from_slice(&gsm7::pack_septets(&septets, &header));
        }

        Ok(pdu)
    }

    fn push_address(&self, pdu: &mut Vec<u8>) -> CodecResult<()> {
        let sender = self.sender.as_str();
        if sender.is_empty() {
            pdu.extend_from_slice(&[0x00, TOA_EXTENSION | NPI_ISDN]);
            return Ok(());
        }

        let digits = sender.strip_prefix('+').unwrap_or(sender);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            check_digits(digits.len())?;
            let ton = if sender.starts_with('+') {
                TON_INTERNATIONAL
            } else {
                0x00
            };
            pdu.push(digits.len() as u8);
            pdu.push(TOA_EXTENSION | ton | NPI_ISDN);
            pdu.extend_from_slice(&encode_bcd(digits)?);
            return Ok(());
        }

        let septets = gsm7::string_to_septets(sender)?;
        let packed = gsm7::pack_septets(&septets, &[]);
        let semi_octets = (septets.len() * 7 + 3) / 4;
        check_digits(semi_octets)?;
        pdu.push(semi_octets as u8);
        pdu.push(TOA_EXTENSION | TON_ALPHANUMERIC);
        pdu.extend_from_slice(&packed);
        Ok(())
    }

    fn user_data_header(&self) -> Vec<u8> {
        match self.concatenation {
            Some(c) => vec![0x05, 0x00, 0x03, c.reference, c.total, c.sequence],
            None => Vec::new(),
        }
    }

    fn encode_timestamp(&self) -> CodecResult<[u8; SCTS_LEN]> {
        // Two BCD digits of quarter hours
        if self.tz_quarters.unsigned_abs() > MAX_TZ_QUARTERS {
            return Err(CodecError::OutOfRange {
                field: "timezone quarters",
                value: i64::from(self.tz_quarters),
            });
        }
        let out_of_range = || CodecError::OutOfRange {
            field: "timestamp",
            value: self.timestamp_ms,
        };
        let zone = FixedOffset::east_opt(i32::from(self.tz_quarters) * 15 * 60)
            .ok_or_else(out_of_range)?;
        let utc = DateTime::from_timestamp_millis(self.timestamp_ms).ok_or_else(out_of_range)?;
        let local = utc.with_timezone(&zone);
        if !(1990..2090).contains(&local.year()) {
            return Err(out_of_range());
        }

        let mut tz = bcd(self.tz_quarters.unsigned_abs());
        if self.tz_quarters < 0 {
            tz |= SCTS_TZ_NEGATIVE;
        }
        Ok([
            bcd((local.year() % 100) as u8),
            bcd(local.month() as u8),
            bcd(local.day() as u8),
            bcd(local.hour() as u8),
            bcd(local.minute() as u8),
            bcd(local.second() as u8),
            tz,
        ])
    }
}

/// Swapped-nibble BCD for a value below 100
fn bcd(value: u8) -> u8 {
    ((value % 10) << 4) | (value / 10 % 10)
}

fn encode_bcd(digits: &str) -> CodecResult<Vec<u8>> {
    check_digits(digits.len())?;
    let nibbles: Vec<u8> = digits
        .bytes()
        .map(|b| b.wrapping_sub(b'0') & 0x0F)
        .collect();
    Ok(nibbles
        .chunks(2)
        .map(|pair| pair[0] | (pair.get(1).copied().unwrap_or(BCD_FILLER) << 4))
        .collect())
}

fn check_digits(len: usize) -> CodecResult<()> {
    if len > MAX_ADDRESS_DIGITS {
        return Err(CodecError::field_too_long("address", len, MAX_ADDRESS_DIGITS));
    }
    Ok(())
}

fn check_len(field: &'static str, len: usize, max: usize) -> CodecResult<()> {
    if len > max {
        return Err(CodecError::field_too_long(field, len, max));
    }
    Ok(())
}
