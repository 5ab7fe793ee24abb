//! Inbound payload format tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Format tag carried alongside a batch of raw protocol units
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatTag {
    /// GSM / UMTS / LTE SMS PDUs (3GPP TS 23.040)
    Gsm3gpp,
    /// CDMA SMS bearer data (3GPP2 C.S0015)
    Cdma3gpp2,
    /// Any tag the pipeline does not recognise
    Other(String),
}

impl FormatTag {
    pub const GSM_3GPP: &'static str = "3gpp";
    pub const CDMA_3GPP2: &'static str = "3gpp2";

    /// Map a platform tag to a format
    ///
    /// A missing tag means the legacy single-format API was used, which only
    /// ever delivered 3GPP PDUs.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            None | Some("") => FormatTag::Gsm3gpp,
            Some(t) if t.eq_ignore_ascii_case(Self::GSM_3GPP) => FormatTag::Gsm3gpp,
            Some(t) if t.eq_ignore_ascii_case(Self::CDMA_3GPP2) => FormatTag::Cdma3gpp2,
            Some(t) => FormatTag::Other(t.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FormatTag::Gsm3gpp => Self::GSM_3GPP,
            FormatTag::Cdma3gpp2 => Self::CDMA_3GPP2,
            FormatTag::Other(tag) => tag,
        }
    }
}

impl Default for FormatTag {
    fn default() -> Self {
        FormatTag::Gsm3gpp
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
