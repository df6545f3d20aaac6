// ── Device classifier ──
//
// Pure judgments over one device's diagnostics. Each check is independent;
// `classify` composes only the ones a run selected.

use tracing::warn;

use crate::config::PortPolicy;
use crate::model::{ClassificationOutcome, DiagnosticResult, InterfaceStatus, Liveness, Rate};
use crate::parse::same_interface;
use crate::plan::{Check, RunPlan};

/// How a configured port was located in the status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortResolution<'a> {
    /// Matched by interface name.
    Named(&'a InterfaceStatus),
    /// Name absent; taken from the positional convention.
    Positional(&'a InterfaceStatus),
}

impl<'a> PortResolution<'a> {
    pub fn status(self) -> &'a InterfaceStatus {
        match self {
            Self::Named(s) | Self::Positional(s) => s,
        }
    }
}

/// Locate a port by name, falling back to its positional index.
///
/// A positional hit is logged, since it relies on the table layout rather
/// than the port identity.
pub fn resolve_port<'a>(
    interfaces: &'a [InterfaceStatus],
    name: Option<&str>,
    fallback_index: usize,
) -> Option<PortResolution<'a>> {
    if let Some(name) = name {
        if let Some(hit) = interfaces.iter().find(|i| same_interface(&i.port, name)) {
            return Some(PortResolution::Named(hit));
        }
    }

    let hit = interfaces.get(fallback_index)?;
    if let Some(name) = name {
        warn!(
            wanted = name,
            index = fallback_index,
            port = %hit.port,
            "port not found by name, using positional fallback"
        );
    }
    Some(PortResolution::Positional(hit))
}

/// `Some(true)` when the uplink is connected and the provisioning port is
/// still enabled. `None` when either port cannot be located.
pub fn port_determination(result: &DiagnosticResult, policy: &PortPolicy) -> Option<bool> {
    let interfaces = result.interfaces.as_deref()?;
    let uplink = resolve_port(
        interfaces,
        policy.uplink_port.as_deref(),
        policy.uplink_index,
    )?;
    let provisioning = resolve_port(
        interfaces,
        policy.provisioning_port.as_deref(),
        policy.provisioning_index,
    )?;
    Some(uplink.status().is_connected() && !provisioning.status().is_disabled())
}

pub fn classify_ports(result: &DiagnosticResult, policy: &PortPolicy) -> bool {
    port_determination(result, policy).unwrap_or(false)
}

/// Strictly below the threshold. A missing or unknown rate is never flagged.
pub fn classify_shaper(result: &DiagnosticResult, threshold_mbps: u64) -> bool {
    matches!(result.shaping_rate, Rate::Mbps(rate) if rate < threshold_mbps)
}

/// Access-layer uplink liveness for devices in a liveness class.
pub fn classify_liveness(
    device_class: Option<&str>,
    result: &DiagnosticResult,
    policy: &PortPolicy,
) -> Liveness {
    let eligible = device_class.is_some_and(|class| {
        policy
            .liveness_models
            .iter()
            .any(|m| m.eq_ignore_ascii_case(class))
    });
    if !eligible {
        return Liveness::NotApplicable;
    }
    let Some(interfaces) = result.interfaces.as_deref() else {
        return Liveness::NotApplicable;
    };

    let resolved: Vec<&InterfaceStatus> = policy
        .liveness_ports
        .iter()
        .filter_map(|name| interfaces.iter().find(|i| same_interface(&i.port, name)))
        .collect();

    if resolved.is_empty() {
        Liveness::NotApplicable
    } else if resolved.iter().any(|i| i.is_connected()) {
        Liveness::Live
    } else {
        Liveness::NotLive
    }
}

/// Run the selected checks.
pub fn classify(
    device_class: Option<&str>,
    result: &DiagnosticResult,
    plan: &RunPlan,
    policy: &PortPolicy,
    threshold_mbps: u64,
) -> ClassificationOutcome {
    let needs_port_disable = if plan.includes(Check::Ports) {
        port_determination(result, policy)
    } else {
        None
    };

    let shaper_below_threshold = if plan.includes(Check::Shaping) && !result.shaping_rate.is_unknown()
    {
        Some(classify_shaper(result, threshold_mbps))
    } else {
        None
    };

    let liveness = if plan.includes(Check::Liveness) {
        classify_liveness(device_class, result, policy)
    } else {
        Liveness::NotApplicable
    };

    ClassificationOutcome {
        needs_port_disable,
        shaper_below_threshold,
        liveness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statuses(rows: &[(&str, &str)]) -> Vec<InterfaceStatus> {
        rows.iter()
            .map(|(p, s)| InterfaceStatus::new(*p, *s))
            .collect()
    }

    fn with_interfaces(rows: &[(&str, &str)]) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(None);
        result.interfaces = Some(statuses(rows));
        result
    }

    fn five_ports(uplink: &str, provisioning: &str) -> DiagnosticResult {
        with_interfaces(&[
            ("Gi0/1/0", uplink),
            ("Gi0/1/1", "notconnect"),
            ("Gi0/1/2", "notconnect"),
            ("Gi0/1/3", "notconnect"),
            ("Gi0/1/4", provisioning),
        ])
    }

    fn with_rate(rate: Rate) -> DiagnosticResult {
        let mut result = DiagnosticResult::new(None);
        result.shaping_rate = rate;
        result
    }

    #[test]
    fn ports_need_disable_only_when_uplink_up_and_provisioning_enabled() {
        let policy = PortPolicy::default();
        assert!(classify_ports(&five_ports("connected", "notconnect"), &policy));
        assert!(classify_ports(&five_ports("connected", "err-disabled"), &policy));
        assert!(!classify_ports(&five_ports("connected", "disabled"), &policy));
        assert!(!classify_ports(&five_ports("notconnect", "notconnect"), &policy));
    }

    #[test]
    fn out_of_range_index_is_undetermined() {
        let policy = PortPolicy {
            uplink_port: None,
            provisioning_port: None,
            ..PortPolicy::default()
        };
        let short = with_interfaces(&[("Gi0/1/0", "connected"), ("Gi0/1/1", "notconnect")]);
        assert_eq!(port_determination(&short, &policy), None);
        assert!(!classify_ports(&short, &policy));
    }

    #[test]
    fn missing_interfaces_are_undetermined() {
        let result = DiagnosticResult::new(None);
        assert_eq!(port_determination(&result, &PortPolicy::default()), None);
    }

    #[test]
    fn named_lookup_ignores_row_order() {
        let result = with_interfaces(&[
            ("GigabitEthernet0/1/4", "disabled"),
            ("GigabitEthernet0/1/0", "connected"),
        ]);
        assert_eq!(port_determination(&result, &PortPolicy::default()), Some(false));
    }

    #[test]
    fn positional_fallback_when_name_missing() {
        let rows = statuses(&[("Fa0", "connected"), ("Fa1", "disabled")]);
        let hit = resolve_port(&rows, Some("Gi0/1/0"), 1);
        assert_eq!(hit, Some(PortResolution::Positional(&rows[1])));
        assert_eq!(resolve_port(&rows, Some("Fa0"), 1), Some(PortResolution::Named(&rows[0])));
        assert_eq!(resolve_port(&rows, None, 7), None);
    }

    #[test]
    fn shaper_threshold_is_exclusive() {
        assert!(classify_shaper(&with_rate(Rate::Mbps(150)), 200));
        assert!(!classify_shaper(&with_rate(Rate::Mbps(200)), 200));
        assert!(!classify_shaper(&with_rate(Rate::NotConfigured), 200));
        assert!(!classify_shaper(&with_rate(Rate::Unknown), 200));
    }

    #[test]
    fn liveness_only_for_liveness_classes() {
        let policy = PortPolicy::default();
        let up = with_interfaces(&[("Gi0/1/1", "notconnect"), ("Gi0/1/2", "connected")]);
        let down = with_interfaces(&[("Gi0/1/1", "notconnect"), ("Gi0/1/2", "disabled")]);
        let none = with_interfaces(&[("Gi0/0/0", "connected")]);

        assert_eq!(classify_liveness(Some("1161"), &up, &policy), Liveness::Live);
        assert_eq!(classify_liveness(Some("1161"), &down, &policy), Liveness::NotLive);
        assert_eq!(classify_liveness(Some("1161"), &none, &policy), Liveness::NotApplicable);
        assert_eq!(classify_liveness(Some("1127"), &up, &policy), Liveness::NotApplicable);
        assert_eq!(classify_liveness(None, &up, &policy), Liveness::NotApplicable);
    }

    #[test]
    fn classify_composes_selected_checks_only() {
        let mut result = five_ports("connected", "notconnect");
        result.shaping_rate = Rate::Mbps(150);
        let policy = PortPolicy::default();

        let ports = classify(Some("1161"), &result, &RunPlan::ports(), &policy, 200);
        assert_eq!(ports.needs_port_disable, Some(true));
        assert_eq!(ports.shaper_below_threshold, None);

        let shaping = classify(Some("1161"), &result, &RunPlan::shaping(), &policy, 200);
        assert_eq!(shaping.needs_port_disable, None);
        assert_eq!(shaping.shaper_below_threshold, Some(true));
        assert_eq!(shaping.liveness, Liveness::NotLive);
        assert!(shaping.is_flagged());
    }

    #[test]
    fn unknown_rate_is_excluded_from_shaper_judgment() {
        let result = with_rate(Rate::Unknown);
        let outcome = classify(None, &result, &RunPlan::shaping(), &PortPolicy::default(), 200);
        assert_eq!(outcome.shaper_below_threshold, None);
    }
}
