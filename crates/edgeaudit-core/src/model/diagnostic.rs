// ── Diagnostic result types ──

use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

/// One row of the interface status table, in device enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceStatus {
    pub port: String,
    /// Raw status column (`connected`, `notconnect`, `disabled`, `err-disabled`, ...).
    pub status: String,
}

impl InterfaceStatus {
    pub fn new(port: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            status: status.into(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status.eq_ignore_ascii_case("connected")
    }

    /// Administratively disabled. `err-disabled` is a fault state, not an
    /// admin shutdown, so it does not count.
    pub fn is_disabled(&self) -> bool {
        self.status.eq_ignore_ascii_case("disabled")
    }
}

/// A rate measurement that distinguishes "nothing configured" from
/// "could not find out".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rate {
    Mbps(u64),
    NotConfigured,
    Unknown,
}

impl Rate {
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// `Mbps` when a value was parsed, otherwise `NotConfigured`.
    pub fn from_parsed(value: Option<u64>) -> Self {
        value.map_or(Self::NotConfigured, Self::Mbps)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mbps(v) => write!(f, "{v}Mb"),
            Self::NotConfigured => f.write_str("not configured"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Migration-progress signal from the access-layer uplinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    Live,
    NotLive,
    NotApplicable,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::NotLive => "not live",
            Self::NotApplicable => "n/a",
        })
    }
}

/// A field that could not be collected, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGap {
    pub field: &'static str,
    pub reason: String,
}

/// Everything collected from one router in one run.
///
/// Only created after a session was opened; partial data is represented by
/// `None`/`Rate::Unknown` plus an entry in `gaps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticResult {
    /// `None` when the status table was not requested or could not be read.
    pub interfaces: Option<Vec<InterfaceStatus>>,
    pub shaping_rate: Rate,
    pub downstream: Rate,
    pub wan_ip: Option<Ipv4Addr>,
    pub liveness: Liveness,
    pub postcode: Option<String>,
    pub gaps: Vec<FieldGap>,
}

impl DiagnosticResult {
    /// An empty result; every field starts unknown.
    pub fn new(postcode: Option<String>) -> Self {
        Self {
            interfaces: None,
            shaping_rate: Rate::Unknown,
            downstream: Rate::Unknown,
            wan_ip: None,
            liveness: Liveness::NotApplicable,
            postcode,
            gaps: Vec::new(),
        }
    }

    pub fn record_gap(&mut self, field: &'static str, reason: impl Into<String>) {
        self.gaps.push(FieldGap {
            field,
            reason: reason.into(),
        });
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_display() {
        assert_eq!(Rate::Mbps(150).to_string(), "150Mb");
        assert_eq!(Rate::NotConfigured.to_string(), "not configured");
        assert_eq!(Rate::Unknown.to_string(), "unknown");
    }

    #[test]
    fn err_disabled_is_not_admin_disabled() {
        assert!(InterfaceStatus::new("Gi0/1/4", "disabled").is_disabled());
        assert!(!InterfaceStatus::new("Gi0/1/4", "err-disabled").is_disabled());
    }
}
