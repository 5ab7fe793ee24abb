//! Platform broadcasts the forwarder reacts to

use serde::Deserialize;

/// Inbound SMS, carrying raw PDUs and their format
pub const ACTION_SMS_RECEIVED: &str = "android.provider.Telephony.SMS_RECEIVED";
/// Device finished booting
pub const ACTION_BOOT_COMPLETED: &str = "android.intent.action.BOOT_COMPLETED";
/// Vendor fast-boot variant of [`ACTION_BOOT_COMPLETED`]
pub const ACTION_QUICKBOOT_POWERON: &str = "android.intent.action.QUICKBOOT_POWERON";

/// Classified broadcast action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    MessageReceived,
    BootCompleted,
    Ignored,
}

impl LifecycleEvent {
    pub fn from_action(action: &str) -> Self {
        match action {
            ACTION_SMS_RECEIVED => LifecycleEvent::MessageReceived,
            ACTION_BOOT_COMPLETED | ACTION_QUICKBOOT_POWERON => LifecycleEvent::BootCompleted,
            _ => LifecycleEvent::Ignored,
        }
    }
}

/// One broadcast as delivered by the host
///
/// `pdus` and `format` are the message extras; both are absent on
/// non-message broadcasts and may be absent on malformed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Broadcast {
    pub action: String,
    pub format: Option<String>,
    pub pdus: Option<Vec<Vec<u8>>>,
}

impl Broadcast {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    /// Inbound-message broadcast with its extras
    pub fn sms_received(pdus: Vec<Vec<u8>>, format: Option<&str>) -> Self {
        Self {
            action: ACTION_SMS_RECEIVED.to_string(),
            format: format.map(str::to_string),
            pdus: Some(pdus),
        }
    }

    pub fn event(&self) -> LifecycleEvent {
        LifecycleEvent::from_action(&self.action)
    }
}

/// Broadcast as a line of JSON, PDUs hex-encoded
#[derive(Debug, Deserialize)]
pub struct BroadcastLine {
    pub action: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub pdus: Option<Vec<String>>,
}

impl TryFrom<BroadcastLine> for Broadcast {
    type Error = hex::FromHexError;

    fn try_from(line: BroadcastLine) -> Result<Self, Self::Error> {
        let pdus = line
            .pdus
            .map(|pdus| pdus.iter().map(hex::decode).collect::<Result<Vec<_>, _>>())
            .transpose()?;
        Ok(Self {
            action: line.action,
            format: line.format,
            pdus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_classification() {
        assert_eq!(
            LifecycleEvent::from_action(ACTION_SMS_RECEIVED),
            LifecycleEvent::MessageReceived
        );
        assert_eq!(
            LifecycleEvent::from_action(ACTION_QUICKBOOT_POWERON),
            LifecycleEvent::BootCompleted
        );
        assert_eq!(
            LifecycleEvent::from_action("android.intent.action.SCREEN_ON"),
            LifecycleEvent::Ignored
        );
    }

    #[test]
    fn test_json_line_decodes_hex_pdus() {
        let line: BroadcastLine = serde_json::from_str(
            r#"{"action": "android.provider.Telephony.SMS_RECEIVED", "format": "3gpp", "pdus": ["00ff"]}"#,
        )
        .unwrap();
        let broadcast = Broadcast::try_from(line).unwrap();
        assert_eq!(broadcast.event(), LifecycleEvent::MessageReceived);
        assert_eq!(broadcast.format.as_deref(), Some("3gpp"));
        assert_eq!(broadcast.pdus, Some(vec![vec![0x00, 0xFF]]));
    }

    #[test]
    fn test_json_line_without_extras() {
        let line: BroadcastLine =
            serde_json::from_str(r#"{"action": "android.intent.action.BOOT_COMPLETED"}"#).unwrap();
        let broadcast = Broadcast::try_from(line).unwrap();
        assert_eq!(broadcast.pdus, None);
        assert_eq!(broadcast.event(), LifecycleEvent::BootCompleted);
    }

    #[test]
    fn test_bad_hex_is_rejected() {
        let line: BroadcastLine =
            serde_json::from_str(r#"{"action": "x", "pdus": ["zz"]}"#).unwrap();
        assert!(Broadcast::try_from(line).is_err());
    }
}
