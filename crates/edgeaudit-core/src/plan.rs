// ── Run plans ──
//
// A run selects an arbitrary subset of checks. The commands issued per
// device are derived from the selection, so adding a check never forks the
// orchestrator.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One diagnostic/classification step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Check {
    /// Uplink connected while the provisioning port is still enabled.
    Ports,
    /// WAN shaper below the policy threshold.
    Shaping,
    /// WAN-facing address via CEF + interface table.
    WanIp,
    /// Hub-provisioned downstream rate for the WAN address.
    Downstream,
    /// Access-layer uplink liveness for eligible hardware classes.
    Liveness,
}

/// Which checks run, and whether the hardware-class filter applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    checks: BTreeSet<Check>,
    /// Only devices matching a configured model code are inspected.
    pub restrict_to_models: bool,
}

impl RunPlan {
    pub fn new(checks: impl IntoIterator<Item = Check>, restrict_to_models: bool) -> Self {
        Self {
            checks: checks.into_iter().collect(),
            restrict_to_models,
        }
    }

    /// Provisioning-port check on the in-scope hardware classes.
    pub fn ports() -> Self {
        Self::new([Check::Ports], true)
    }

    /// Shaping, WAN address, downstream bandwidth and liveness on every edge.
    pub fn shaping() -> Self {
        Self::new(
            [Check::Shaping, Check::WanIp, Check::Downstream, Check::Liveness],
            false,
        )
    }

    /// Everything, on the in-scope hardware classes.
    pub fn full() -> Self {
        Self::new(Check::iter(), true)
    }

    pub fn includes(&self, check: Check) -> bool {
        self.checks.contains(&check)
    }

    pub fn checks(&self) -> impl Iterator<Item = Check> + '_ {
        self.checks.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    // ── Derived command needs ────────────────────────────────────────

    pub fn needs_interface_status(&self) -> bool {
        self.includes(Check::Ports) || self.includes(Check::Liveness)
    }

    pub fn needs_shaping_rate(&self) -> bool {
        self.includes(Check::Shaping)
    }

    /// Downstream lookups are keyed by WAN address, so they pull it in.
    pub fn needs_wan_ip(&self) -> bool {
        self.includes(Check::WanIp) || self.includes(Check::Downstream)
    }

    pub fn needs_hub(&self) -> bool {
        self.includes(Check::Downstream)
    }
}

impl fmt::Display for RunPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.checks().map(|c| c.to_string()).collect();
        f.write_str(&names.join(","))
    }
}
