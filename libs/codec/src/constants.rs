//! # PDU Constants
//!
//! Field masks and alphabet tables from 3GPP TS 23.040 (SMS transfer) and
//! 3GPP TS 23.038 (alphabets). These values are fixed by the standards and
//! shared by the decoder and the PDU builder.

/// Message type indicator mask in the first octet
pub const MTI_MASK: u8 = 0x03;
/// MTI for SMS-DELIVER (network to mobile)
pub const MTI_DELIVER: u8 = 0x00;
/// "More messages to send" bit; set means no more messages are waiting
pub const MMS_NO_MORE: u8 = 0x04;
/// User data header indicator in the first octet
pub const UDHI_BIT: u8 = 0x40;

/// Type-of-number values (bits 6..4 of the type-of-address octet)
pub const TON_MASK: u8 = 0x70;
pub const TON_INTERNATIONAL: u8 = 0x10;
pub const TON_ALPHANUMERIC: u8 = 0x50;
/// Extension bit is always set on a type-of-address octet
pub const TOA_EXTENSION: u8 = 0x80;
/// ISDN/telephone numbering plan
pub const NPI_ISDN: u8 = 0x01;

/// Service centre timestamp length in octets
pub const SCTS_LEN: usize = 7;
/// Sign bit of the timezone octet (before nibble swap)
pub const SCTS_TZ_NEGATIVE: u8 = 0x08;
/// Largest timezone offset the two BCD digits can carry
pub const MAX_TZ_QUARTERS: u8 = 79;
/// Years below this are 20xx, the rest 19xx
pub const SCTS_CENTURY_PIVOT: i32 = 90;

/// Escape to the GSM 7-bit extension table
pub const GSM7_ESCAPE: u8 = 0x1B;

/// Maximum digits in an address field
pub const MAX_ADDRESS_DIGITS: usize = 20;
/// User data capacity of one unit, in octets
pub const MAX_USER_DATA_OCTETS: usize = 140;
/// User data capacity of one GSM 7-bit unit, in septets (140 packed octets)
pub const MAX_GSM7_SEPTETS: usize = 160;

/// GSM 7-bit default alphabet, indexed by septet value
///
/// Position 0x1B is the escape code; it never reaches this table during
/// decoding and renders as a space if it does.
pub const GSM7_DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', //
    'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', //
    'Σ', 'Θ', 'Ξ', ' ', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', //
    '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', //
    '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', //
    'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', //
    'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', //
    'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', //
    'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', //
];

/// GSM 7-bit extension table entries reached through [`GSM7_ESCAPE`]
pub const GSM7_EXTENSION_TABLE: [(u8, char); 10] = [
    (0x0A, '\u{0C}'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

/// Characters for BCD address nibbles 0xA..=0xE
pub const BCD_EXTENDED_DIGITS: [char; 5] = ['*', '#', 'a', 'b', 'c'];
/// Filler nibble terminating an odd-length address
pub const BCD_FILLER: u8 = 0x0F;
