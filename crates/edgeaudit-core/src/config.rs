// ── Runtime configuration ──
//
// These types describe *how* to reach the manager and the routers and which
// policy the audit applies. They carry credential data and tuning, but never
// touch disk. The CLI resolves a profile into these and hands them in.

use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use url::Url;

/// TLS verification strategy for the manager connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for on-prem managers.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for the manager session.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Manager URL (e.g., `https://vmanage.example.net/`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// HTTP request timeout.
    pub timeout: Duration,
}

/// Credentials and tuning for the router SSH sessions.
#[derive(Debug, Clone)]
pub struct SshCredentials {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    /// Applied to TCP connect and to every blocking libssh2 call.
    pub command_timeout: Duration,
}

/// Hub (headend) device queried for per-spoke downstream shaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubConfig {
    pub address: String,
    /// Multipoint tunnel interface carrying the per-spoke QoS targets.
    pub tunnel: String,
}

/// Which interfaces the port and liveness checks look at.
///
/// Ports are matched by name first; the index is the positional convention
/// used when the name does not appear in the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortPolicy {
    pub uplink_port: Option<String>,
    pub uplink_index: usize,
    pub provisioning_port: Option<String>,
    pub provisioning_index: usize,
    /// Access-layer uplinks whose link state signals a live site.
    pub liveness_ports: Vec<String>,
    /// Hardware model codes that expose the liveness signal.
    pub liveness_models: Vec<String>,
}

impl Default for PortPolicy {
    fn default() -> Self {
        Self {
            uplink_port: Some("Gi0/1/0".into()),
            uplink_index: 0,
            provisioning_port: Some("Gi0/1/4".into()),
            provisioning_index: 4,
            liveness_ports: vec!["Gi0/1/1".into(), "Gi0/1/2".into()],
            liveness_models: vec!["1161".into()],
        }
    }
}

/// How a site postcode is cut out of a hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostcodeRule {
    pub delimiter: char,
    pub index: usize,
}

impl Default for PostcodeRule {
    fn default() -> Self {
        Self {
            delimiter: '-',
            index: 2,
        }
    }
}

/// Audit policy and run tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSettings {
    /// Shapers strictly below this rate are flagged.
    pub shaper_threshold_mbps: u64,
    pub ports: PortPolicy,
    /// UUID substrings selecting the hardware classes in scope.
    pub model_codes: Vec<String>,
    pub hub: Option<HubConfig>,
    /// Destination looked up in CEF to find the WAN egress interface.
    pub wan_probe: Ipv4Addr,
    /// Overlay range that triggers the alternate-nexthop WAN lookup.
    pub internal_range: Ipv4Range,
    pub postcode: PostcodeRule,
    /// Maximum number of routers inspected at once.
    pub concurrency: usize,
    /// Upper bound for one router's full inspection.
    #[serde(skip)]
    pub device_timeout: Duration,
    /// Devices not started before this elapses are marked failed.
    #[serde(skip)]
    pub run_deadline: Option<Duration>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            shaper_threshold_mbps: 200,
            ports: PortPolicy::default(),
            model_codes: vec!["1127".into(), "1161".into()],
            hub: None,
            wan_probe: Ipv4Addr::new(8, 8, 8, 8),
            internal_range: Ipv4Range::new(Ipv4Addr::new(100, 64, 0, 0), 10),
            postcode: PostcodeRule::default(),
            concurrency: 1,
            device_timeout: Duration::from_secs(120),
            run_deadline: None,
        }
    }
}

// ── IPv4 range ───────────────────────────────────────────────────────

/// An IPv4 prefix such as `100.64.0.0/10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Range {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl Ipv4Range {
    /// Build a range; host bits of `network` are cleared and the prefix
    /// length is clamped to 32.
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Self {
        let prefix_len = prefix_len.min(32);
        let masked = u32::from(network) & Self::mask(prefix_len);
        Self {
            network: Ipv4Addr::from(masked),
            prefix_len,
        }
    }

    fn mask(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        }
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask(self.prefix_len) == u32::from(self.network)
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Ipv4Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s.trim().split_once('/').unwrap_or((s.trim(), "32"));
        let network: Ipv4Addr = addr
            .parse()
            .map_err(|_| format!("invalid IPv4 address in range: {addr}"))?;
        let prefix_len: u8 = len
            .parse()
            .ok()
            .filter(|n| *n <= 32)
            .ok_or_else(|| format!("invalid prefix length: {len}"))?;
        Ok(Self::new(network, prefix_len))
    }
}

impl Serialize for Ipv4Range {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn range_contains_boundaries() {
        let range: Ipv4Range = "100.64.0.0/10".parse().unwrap();
        assert!(range.contains(Ipv4Addr::new(100, 64, 0, 1)));
        assert!(range.contains(Ipv4Addr::new(100, 127, 255, 255)));
        assert!(!range.contains(Ipv4Addr::new(100, 128, 0, 0)));
        assert!(!range.contains(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn range_clears_host_bits() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 1, 2, 3), 8);
        assert_eq!(range.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn range_rejects_garbage() {
        assert!("10.0.0.0/33".parse::<Ipv4Range>().is_err());
        assert!("nope/8".parse::<Ipv4Range>().is_err());
        assert_eq!(
            "192.0.2.7".parse::<Ipv4Range>().unwrap().to_string(),
            "192.0.2.7/32"
        );
    }

    #[test]
    fn zero_prefix_matches_everything() {
        let range = Ipv4Range::new(Ipv4Addr::UNSPECIFIED, 0);
        assert!(range.contains(Ipv4Addr::new(203, 0, 113, 9)));
    }
}
