// ── Router CLI commands ──
//
// The exact IOS-XE strings issued by the audit. Parsers in `crate::parse`
// are written against the output of these commands.

use std::net::Ipv4Addr;

/// Switch-port link table (ports and liveness checks).
pub const SHOW_INTERFACE_STATUS: &str = "show interface status";

/// WAN output policy; only the shaper line is returned.
pub const SHOW_SHAPING_RATE: &str =
    "show policy-map interface output | include target shape rate";

/// Interface address table used to resolve the WAN egress address.
pub const SHOW_IP_INTERFACE_BRIEF: &str = "show ip interface brief";

/// CEF lookup of the WAN probe destination.
pub fn show_cef(probe: Ipv4Addr) -> String {
    format!("show ip cef {probe}")
}

/// Hub-side per-spoke QoS target on the multipoint tunnel.
pub fn show_hub_qos(tunnel: &str, spoke: Ipv4Addr) -> String {
    format!("show policy-map multipoint {tunnel} {spoke} | include target shape rate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parameterized_commands() {
        assert_eq!(show_cef(Ipv4Addr::new(8, 8, 8, 8)), "show ip cef 8.8.8.8");
        assert_eq!(
            show_hub_qos("Tunnel1", Ipv4Addr::new(203, 0, 113, 10)),
            "show policy-map multipoint Tunnel1 203.0.113.10 | include target shape rate"
        );
    }
}
