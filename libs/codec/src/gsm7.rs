//! GSM 7-bit default alphabet packing and translation (3GPP TS 23.038)

use crate::constants::{GSM7_DEFAULT_ALPHABET, GSM7_ESCAPE, GSM7_EXTENSION_TABLE};
use crate::error::{CodecError, DecodeError};

/// Unpack `count` septets from `data`, starting `skip` septets in
///
/// Septets are packed LSB-first across octet boundaries.
pub fn unpack_septets(data: &[u8], skip: usize, count: usize) -> Result<Vec<u8>, DecodeError> {
    let needed = ((skip + count) * 7 + 7) / 8;
    if data.len() < needed {
        return Err(DecodeError::truncated("7-bit user data", 0, needed, data.len()));
    }

    let mut septets = Vec::with_capacity(count);
    for i in skip..skip + count {
        let bit = i * 7;
        let idx = bit / 8;
        let shift = bit % 8;
        let mut value = u16::from(data[idx]) >> shift;
        if shift > 1 {
            value |= u16::from(data[idx + 1]) << (8 - shift);
        }
        septets.push((value & 0x7F) as u8);
    }
    Ok(septets)
}

/// Translate septets to text, resolving extension-table escapes
///
/// An escape followed by an unknown code falls back to the default table, as
/// TS 23.038 asks of receivers. A trailing escape is dropped.
pub fn septets_to_string(septets: &[u8]) -> String {
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.iter().copied();

    while let Some(septet) = iter.next() {
        if septet != GSM7_ESCAPE {
            text.push(default_char(septet));
            continue;
        }
        match iter.next() {
            Some(code) => text.push(extension_char(code).unwrap_or_else(|| default_char(code))),
            None => break,
        }
    }
    text
}

/// Translate text to septets, escaping extension-table characters
pub fn string_to_septets(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut septets = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some((code, _)) = GSM7_DEFAULT_ALPHABET
            .iter()
            .enumerate()
            .find(|&(pos, &c)| c == ch && pos != usize::from(GSM7_ESCAPE))
        {
            septets.push(code as u8);
        } else if let Some(&(code, _)) = GSM7_EXTENSION_TABLE.iter().find(|(_, c)| *c == ch) {
            septets.push(GSM7_ESCAPE);
            septets.push(code);
        } else {
            return Err(CodecError::Unencodable { ch });
        }
    }
    Ok(septets)
}

/// Pack septets LSB-first after the `lead` octets
///
/// `lead` lets a user data header precede the text; the first septet lands
/// on the next septet boundary.
pub fn pack_septets(septets: &[u8], lead: &[u8]) -> Vec<u8> {
    let lead_bits = lead.len() * 8;
    let fill = (7 - lead_bits % 7) % 7;
    let total_bits = lead_bits + fill + septets.len() * 7;
    let mut out = vec![0u8; (total_bits + 7) / 8];

    out[..lead.len()].copy_from_slice(lead);
    let mut bit = lead_bits + fill;
    for &septet in septets {
        for k in 0..7 {
            if (septet >> k) & 1 == 1 {
                out[(bit + k) / 8] |= 1 << ((bit + k) % 8);
            }
        }
        bit += 7;
    }
    out
}

fn default_char(septet: u8) -> char {
    GSM7_DEFAULT_ALPHABET[usize::from(septet & 0x7F)]
}

fn extension_char(code: u8) -> Option<char> {
    GSM7_EXTENSION_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, ch)| ch)
}
