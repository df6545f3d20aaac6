// Shaping-rate extraction from `show policy-map` output.

/// Marker preceding the configured shaper in bits per second.
const SHAPE_MARKER: &str = "target shape rate";

const BITS_PER_MEGABIT: u64 = 1_000_000;

/// Whole megabits, truncating: `99_999_999` bps is 99 Mbps.
pub fn bps_to_mbps(bps: u64) -> u64 {
    bps / BITS_PER_MEGABIT
}

/// Shaping rate of the router's WAN output policy, in Mbps.
///
/// Reads the first `target shape rate <bps>` line. Returns `None` when no
/// shaper is configured (the marker is absent) or the value is not a number.
pub fn parse_shaping_rate(text: &str) -> Option<u64> {
    text.lines().find_map(shape_rate_bps).map(bps_to_mbps)
}

/// Downstream rate provisioned at the hub for one spoke, in Mbps.
///
/// The hub query is already filtered to the spoke's address, so the first
/// `target shape rate` entry is the spoke's. `None` when the hub has no
/// entry for it.
pub fn parse_downstream_rate(qos_text: &str) -> Option<u64> {
    parse_shaping_rate(qos_text)
}

/// Whether any line carries a shaper, parseable or not.
pub fn has_shape_marker(text: &str) -> bool {
    text.lines().any(|line| line.contains(SHAPE_MARKER))
}

fn shape_rate_bps(line: &str) -> Option<u64> {
    let (_, rest) = line.split_once(SHAPE_MARKER)?;
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY_OUTPUT: &str = "\
      target shape rate 150000000
";

    const HUB_OUTPUT: &str = "\
  Interface Tunnel1 <--> 203.0.113.10

  Service-policy output: shape-spoke-100m

    Class-map: class-default (match-any)
      0 packets, 0 bytes
      shape (average) cir 100000000, bc 400000, be 400000
      target shape rate 100000000
";

    #[test]
    fn parses_policy_rate() {
        assert_eq!(parse_shaping_rate(POLICY_OUTPUT), Some(150));
    }

    #[test]
    fn truncates_not_rounds() {
        assert_eq!(parse_shaping_rate("target shape rate 99999999"), Some(99));
        assert_eq!(parse_shaping_rate("target shape rate 1999999"), Some(1));
        assert_eq!(parse_shaping_rate("target shape rate 200000000"), Some(200));
    }

    #[test]
    fn missing_marker_is_none() {
        assert_eq!(parse_shaping_rate(""), None);
        assert_eq!(parse_shaping_rate("\n\n"), None);
        assert_eq!(parse_shaping_rate("shape (average) cir 100000000"), None);
    }

    #[test]
    fn malformed_value_is_none() {
        assert_eq!(parse_shaping_rate("target shape rate "), None);
        assert_eq!(parse_shaping_rate("target shape rate abc"), None);
        assert_eq!(
            parse_shaping_rate("target shape rate 999999999999999999999999"),
            None
        );
    }

    #[test]
    fn marker_is_detected_without_a_value() {
        assert!(has_shape_marker("  target shape rate abc\n"));
        assert!(!has_shape_marker("shape (average) cir 100000000"));
    }

    #[test]
    fn first_policy_wins() {
        let text = "target shape rate 50000000\ntarget shape rate 300000000\n";
        assert_eq!(parse_shaping_rate(text), Some(50));
    }

    #[test]
    fn parses_hub_entry() {
        assert_eq!(parse_downstream_rate(HUB_OUTPUT), Some(100));
        assert_eq!(parse_downstream_rate("  Interface Tunnel1 <--> 203.0.113.10\n"), None);
    }
}
