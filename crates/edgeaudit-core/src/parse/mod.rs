//! Text parsers for captured show-command output.
//!
//! Every parser is total: unexpected or missing structure produces
//! `None` / an empty list, never a panic or an error.

mod interfaces;
mod postcode;
mod shaping;
mod wan;

pub use interfaces::parse_interface_status;
pub use postcode::parse_postcode;
pub use shaping::{bps_to_mbps, has_shape_marker, parse_downstream_rate, parse_shaping_rate};
pub use wan::{egress_interfaces, interface_address, parse_wan_ip};

/// Long-form IOS interface prefixes and their abbreviations.
const INTERFACE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("hundredgige", "hu"),
    ("fortygigabitethernet", "fo"),
    ("twentyfivegige", "twe"),
    ("tengigabitethernet", "te"),
    ("gigabitethernet", "gi"),
    ("fastethernet", "fa"),
    ("ethernet", "et"),
    ("cellular", "ce"),
    ("loopback", "lo"),
    ("tunnel", "tu"),
    ("dialer", "di"),
    ("vlan", "vl"),
];

/// Canonical short lowercase form of an interface name, so that
/// `GigabitEthernet0/1/4`, `Gi0/1/4` and `gi0/1/4` compare equal.
pub fn normalize_interface_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    let split = lower
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (prefix, suffix) = lower.split_at(split);
    let short = INTERFACE_ABBREVIATIONS
        .iter()
        .find(|(long, short)| prefix == *long || prefix == *short)
        .map_or(prefix, |(_, short)| *short);
    format!("{short}{suffix}")
}

/// Whether two interface names refer to the same port.
pub fn same_interface(a: &str, b: &str) -> bool {
    normalize_interface_name(a) == normalize_interface_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_names_match() {
        assert!(same_interface("GigabitEthernet0/1/4", "Gi0/1/4"));
        assert!(same_interface("gi0/0/0", "GigabitEthernet0/0/0"));
        assert!(same_interface("Tunnel1", "Tu1"));
        assert!(!same_interface("Gi0/1/4", "Gi0/1/40"));
        assert!(!same_interface("Te0/0/0", "Gi0/0/0"));
    }

    #[test]
    fn unknown_prefix_is_kept() {
        assert_eq!(normalize_interface_name("Wlan-GigabitEthernet0"), "wlan-gigabitethernet0");
        assert_eq!(normalize_interface_name("NVI0"), "nvi0");
    }
}
