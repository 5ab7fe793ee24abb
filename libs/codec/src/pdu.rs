//! # SMS-DELIVER PDU Parser
//!
//! ## Purpose
//!
//! Bounds-checked parser for 3GPP TS 23.040 SMS-DELIVER PDUs as handed over by
//! the platform's inbound-message broadcast (SMSC address prefix included).
//!
//! ## Layout
//!
//! ```text
//! [SMSC len][SMSC..][first octet][OA len][OA TOA][OA digits..][PID][DCS][SCTS x7][UDL][UD..]
//! ```
//!
//! Every read goes through [`PduReader`], so a short unit fails with
//! [`DecodeError::Truncated`] naming the field that ran off the end instead of
//! panicking on an index.

use chrono::{FixedOffset, NaiveDate, TimeZone};
use types::MessageRecord;

use crate::constants::*;
use crate::error::DecodeError;
use crate::gsm7;

/// Character set of the user data, from the data coding scheme octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCoding {
    Gsm7,
    EightBit,
    Ucs2,
}

impl DataCoding {
    /// Classify a data coding scheme octet (3GPP TS 23.038 section 4)
    pub fn from_dcs(dcs: u8) -> Result<Self, DecodeError> {
        match dcs >> 4 {
            // General data coding and automatic-deletion groups
            0x0..=0x7 => {
                if dcs & 0x20 != 0 {
                    return Err(DecodeError::Compressed { dcs });
                }
                Ok(match (dcs >> 2) & 0x03 {
                    0x01 => DataCoding::EightBit,
                    0x02 => DataCoding::Ucs2,
                    _ => DataCoding::Gsm7,
                })
            }
            // Message waiting indication, discard / store
            0xC | 0xD => Ok(DataCoding::Gsm7),
            // Message waiting indication, store, UCS-2
            0xE => Ok(DataCoding::Ucs2),
            // Data coding / message class
            0xF => Ok(if dcs & 0x04 != 0 {
                DataCoding::EightBit
            } else {
                DataCoding::Gsm7
            }),
            // Reserved groups are read as the default alphabet
            _ => Ok(DataCoding::Gsm7),
        }
    }
}

/// Parsed SMS-DELIVER unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverPdu {
    /// Originating address; `None` when the address field is empty
    pub originating_address: Option<String>,
    pub protocol_id: u8,
    pub data_coding: DataCoding,
    /// Service centre timestamp in milliseconds since the Unix epoch (UTC)
    pub timestamp_ms: i64,
    /// Raw user data header, if the UDHI bit was set
    pub user_data_header: Option<Vec<u8>>,
    /// Message text; `None` for 8-bit data, which carries no text body
    pub text: Option<String>,
}

impl DeliverPdu {
    /// Parse one unit
    pub fn parse(unit: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = PduReader::new(unit);

        let smsc_len = usize::from(reader.u8("SMSC length")?);
        reader.take(smsc_len, "SMSC address")?;

        let first_octet = reader.u8("first octet")?;
        let mti = first_octet & MTI_MASK;
        if mti != MTI_DELIVER {
            return Err(DecodeError::UnsupportedMessageType { mti });
        }
        let has_header = first_octet & UDHI_BIT != 0;

        let originating_address = parse_address(&mut reader)?;
        let protocol_id = reader.u8("protocol identifier")?;
        let dcs = reader.u8("data coding scheme")?;
        let data_coding = DataCoding::from_dcs(dcs)?;
        let timestamp_ms = parse_timestamp(reader.take(SCTS_LEN, "service centre timestamp")?)?;

        let udl = usize::from(reader.u8("user data length")?);
        let (user_data_header, text) = parse_user_data(&mut reader, data_coding, udl, has_header)?;

        Ok(Self {
            originating_address,
            protocol_id,
            data_coding,
            timestamp_ms,
            user_data_header,
            text,
        })
    }

    /// Reduce to the record the pipeline forwards
    pub fn into_record(self) -> MessageRecord {
        MessageRecord::new(self.originating_address, self.text, self.timestamp_ms)
    }
}

/// Bounds-checked cursor over a unit
struct PduReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> PduReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, field)?[0])
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self.offset + n;
        if end > self.data.len() {
            return Err(DecodeError::truncated(field, self.offset, n, self.data.len()));
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

fn parse_address(reader: &mut PduReader<'_>) -> Result<Option<String>, DecodeError> {
    let digits = usize::from(reader.u8("originating address length")?);
    let toa = reader.u8("originating address type")?;
    let octets = reader.take((digits + 1) / 2, "originating address")?;

    if digits == 0 {
        return Ok(None);
    }

    if toa & TON_MASK == TON_ALPHANUMERIC {
        let septets = gsm7::unpack_septets(octets, 0, digits * 4 / 7)?;
        let name = gsm7::septets_to_string(&septets);
        return Ok(Some(name).filter(|n| !n.is_empty()));
    }

    let mut address = String::with_capacity(digits + 1);
    if toa & TON_MASK == TON_INTERNATIONAL {
        address.push('+');
    }
    let nibbles = octets
        .iter()
        .flat_map(|&octet| [octet & 0x0F, octet >> 4])
        .take(digits);
    for nibble in nibbles {
        match nibble {
            BCD_FILLER => break,
            0..=9 => address.push(char::from(b'0' + nibble)),
            _ => address.push(BCD_EXTENDED_DIGITS[usize::from(nibble - 10)]),
        }
    }
    Ok(Some(address))
}

/// Decode a swapped-nibble BCD octet
fn bcd(octet: u8) -> Option<u32> {
    let tens = octet & 0x0F;
    let ones = octet >> 4;
    (tens <= 9 && ones <= 9).then(|| u32::from(tens) * 10 + u32::from(ones))
}

fn parse_timestamp(scts: &[u8]) -> Result<i64, DecodeError> {
    let mut fields = [0u32; 6];
    for (slot, &octet) in fields.iter_mut().zip(scts) {
        *slot = bcd(octet)
            .ok_or_else(|| DecodeError::invalid_timestamp(format!("non-BCD octet {octet:#04x}")))?;
    }
    let [yy, month, day, hour, minute, second] = fields;

    let tz_octet = scts[6];
    let quarters = bcd(tz_octet & !SCTS_TZ_NEGATIVE)
        .ok_or_else(|| DecodeError::invalid_timestamp(format!("non-BCD timezone {tz_octet:#04x}")))?;
    let offset_secs = quarters as i32 * 15 * 60;
    let offset_secs = if tz_octet & SCTS_TZ_NEGATIVE != 0 {
        -offset_secs
    } else {
        offset_secs
    };

    let year = yy as i32;
    let year = if year >= SCTS_CENTURY_PIVOT {
        1900 + year
    } else {
        2000 + year
    };

    let local = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            DecodeError::invalid_timestamp(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            ))
        })?;
    let zone = FixedOffset::east_opt(offset_secs)
        .ok_or_else(|| DecodeError::invalid_timestamp(format!("offset {offset_secs}s")))?;

    zone.from_local_datetime(&local)
        .single()
        .map(|instant| instant.timestamp_millis())
        .ok_or_else(|| DecodeError::invalid_timestamp("ambiguous local time"))
}

fn parse_user_data(
    reader: &mut PduReader<'_>,
    coding: DataCoding,
    udl: usize,
    has_header: bool,
) -> Result<(Option<Vec<u8>>, Option<String>), DecodeError> {
    let user_data = reader.rest();

    let header = if has_header {
        let header_len = usize::from(*user_data.first().ok_or_else(|| {
            DecodeError::truncated("user data header length", reader.offset, 1, reader.data.len())
        })?);
        let total = header_len + 1;
        if total > user_data.len() {
            return Err(DecodeError::InvalidUserDataHeader {
                header_len,
                available: user_data.len(),
            });
        }
        Some(user_data[..total].to_vec())
    } else {
        None
    };
    let header_octets = header.as_ref().map_or(0, Vec::len);

    let text = match coding {
        DataCoding::Gsm7 => {
            let header_septets = (header_octets * 8 + 6) / 7;
            let count = udl.saturating_sub(header_septets);
            let septets = gsm7::unpack_septets(user_data, header_septets, count)?;
            Some(gsm7::septets_to_string(&septets))
        }
        DataCoding::Ucs2 => {
            let body = octet_body(reader, user_data, udl, header_octets)?;
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Some(String::from_utf16_lossy(&units))
        }
        DataCoding::EightBit => {
            octet_body(reader, user_data, udl, header_octets)?;
            None
        }
    };

    Ok((header, text))
}

fn octet_body<'a>(
    reader: &PduReader<'a>,
    user_data: &'a [u8],
    udl: usize,
    header_octets: usize,
) -> Result<&'a [u8], DecodeError> {
    if user_data.len() < udl {
        return Err(DecodeError::truncated("user data", reader.offset, udl, user_data.len()));
    }
    Ok(&user_data[header_octets.min(udl)..udl])
}
