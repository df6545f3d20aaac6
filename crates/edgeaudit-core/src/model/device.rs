// ── Device domain types ──

use serde::{Deserialize, Serialize};

/// Role of a device in the overlay, normalized from the manager's personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DeviceRole {
    /// Site-facing WAN router.
    Edge,
    /// Overlay control-plane controller.
    Controller,
    /// The manager itself.
    Manager,
    /// Orchestrator / validator.
    Validator,
    Other,
}

/// Control-connection reachability as reported by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

impl Reachability {
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Immutable inventory snapshot of one device, taken once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Management (system) IP used for the SSH session.
    pub system_ip: String,
    pub hostname: String,
    pub uuid: String,
    /// Hardware serial: the last `-` token of the UUID.
    pub serial: String,
    pub role: DeviceRole,
    pub model: Option<String>,
    pub reachability: Reachability,
}

impl Device {
    /// Derive the serial from a chassis UUID such as `C1161X-8P-FGL2231A0BC`.
    ///
    /// A UUID with an empty trailing token is returned whole.
    pub fn serial_from_uuid(uuid: &str) -> String {
        match uuid.rsplit('-').next() {
            Some(token) if !token.is_empty() => token.to_owned(),
            _ => uuid.to_owned(),
        }
    }

    /// The first hardware model code that appears in this device's UUID.
    ///
    /// This is the device *class*; `None` means the device is outside every
    /// configured class.
    pub fn device_class<'a>(&self, model_codes: &'a [String]) -> Option<&'a str> {
        model_codes
            .iter()
            .find(|code| !code.is_empty() && self.uuid.contains(code.as_str()))
            .map(String::as_str)
    }

    pub fn is_edge(&self) -> bool {
        self.role == DeviceRole::Edge
    }
}
