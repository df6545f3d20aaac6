// WAN address discovery: CEF egress lookup + interface address table.

use std::net::Ipv4Addr;

use tracing::debug;

use super::same_interface;
use crate::config::Ipv4Range;

/// Egress interfaces named in `show ip cef <addr>` output, in order.
///
/// Understands `nexthop <ip> <iface>` and `attached to <iface>` lines.
pub fn egress_interfaces(cef_text: &str) -> Vec<&str> {
    cef_text
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match tokens.next()? {
                "nexthop" | "attached" => tokens.nth(1),
                _ => None,
            }
        })
        .collect()
}

/// IPv4 address bound to `interface` in `show ip interface brief` output.
///
/// `None` for unknown interfaces and for `unassigned`.
pub fn interface_address(brief_text: &str, interface: &str) -> Option<Ipv4Addr> {
    brief_text.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        let name = tokens.next()?;
        if !same_interface(name, interface) {
            return None;
        }
        tokens.next()?.parse().ok()
    })
}

/// The router's WAN-facing address.
///
/// Takes the egress interface of the first CEF path and looks up its
/// address. When that address sits in the `internal` overlay range, the
/// first path is the overlay tunnel; the next distinct egress interface in
/// the CEF output carries the WAN address instead.
pub fn parse_wan_ip(cef_text: &str, brief_text: &str, internal: &Ipv4Range) -> Option<Ipv4Addr> {
    let egress = egress_interfaces(cef_text);
    let primary = *egress.first()?;
    let addr = interface_address(brief_text, primary)?;

    if !internal.contains(addr) {
        return Some(addr);
    }

    debug!(%addr, interface = primary, range = %internal, "egress address is internal, using alternate path");
    let alternate = egress
        .iter()
        .skip(1)
        .find(|name| !same_interface(name, primary))?;
    interface_address(brief_text, alternate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BRIEF: &str = "\
Interface              IP-Address      OK? Method Status                Protocol
GigabitEthernet0/0/0   203.0.113.10    YES DHCP   up                    up
GigabitEthernet0/1/0   unassigned      YES unset  up                    up
Cellular0/2/0          198.51.100.7    YES IPCP   up                    up
Tunnel1                100.64.12.5     YES TFTP   up                    up
Loopback65528          192.168.1.1     YES other  up                    up
";

    const CEF_DIRECT: &str = "\
0.0.0.0/0
  nexthop 203.0.113.1 GigabitEthernet0/0/0
";

    const CEF_OVERLAY_FIRST: &str = "\
0.0.0.0/0
  nexthop 100.64.12.1 Tunnel1
  nexthop 198.51.100.1 Cellular0/2/0
";

    fn overlay() -> Ipv4Range {
        "100.64.0.0/10".parse().unwrap()
    }

    #[test]
    fn direct_egress() {
        assert_eq!(
            parse_wan_ip(CEF_DIRECT, BRIEF, &overlay()),
            Some(Ipv4Addr::new(203, 0, 113, 10))
        );
    }

    #[test]
    fn internal_address_uses_alternate_path() {
        assert_eq!(
            parse_wan_ip(CEF_OVERLAY_FIRST, BRIEF, &overlay()),
            Some(Ipv4Addr::new(198, 51, 100, 7))
        );
    }

    #[test]
    fn workaround_only_for_configured_range() {
        let other: Ipv4Range = "10.0.0.0/8".parse().unwrap();
        assert_eq!(
            parse_wan_ip(CEF_OVERLAY_FIRST, BRIEF, &other),
            Some(Ipv4Addr::new(100, 64, 12, 5))
        );
    }

    #[test]
    fn internal_without_alternate_is_none() {
        let cef = "0.0.0.0/0\n  nexthop 100.64.12.1 Tunnel1\n";
        assert_eq!(parse_wan_ip(cef, BRIEF, &overlay()), None);
    }

    #[test]
    fn attached_route() {
        let cef = "203.0.113.0/24\n  attached to GigabitEthernet0/0/0\n";
        assert_eq!(egress_interfaces(cef), vec!["GigabitEthernet0/0/0"]);
        assert_eq!(
            parse_wan_ip(cef, BRIEF, &overlay()),
            Some(Ipv4Addr::new(203, 0, 113, 10))
        );
    }

    #[test]
    fn missing_stages_are_none() {
        assert_eq!(parse_wan_ip("", BRIEF, &overlay()), None);
        assert_eq!(parse_wan_ip(CEF_DIRECT, "", &overlay()), None);
        assert_eq!(interface_address(BRIEF, "Gi0/1/0"), None);
        assert_eq!(interface_address(BRIEF, "Gi0/0/0"), Some(Ipv4Addr::new(203, 0, 113, 10)));
    }
}
