// ── Classification outcome and per-device run state ──

use serde::Serialize;

use super::diagnostic::Liveness;
use crate::plan::{Check, RunPlan};

/// Judgments derived from one device's diagnostics.
///
/// `None` means the check was not selected for this run, or its input was
/// unavailable; such devices are left out of that judgment only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationOutcome {
    pub needs_port_disable: Option<bool>,
    pub shaper_below_threshold: Option<bool>,
    pub liveness: Liveness,
}

impl ClassificationOutcome {
    /// Whether any selected judgment asks for remediation.
    pub fn is_flagged(&self) -> bool {
        self.needs_port_disable == Some(true) || self.shaper_below_threshold == Some(true)
    }

    /// Selected checks whose judgment could not be made.
    pub fn undetermined(&self, plan: &RunPlan) -> Vec<Check> {
        let mut missing = Vec::new();
        if plan.includes(Check::Ports) && self.needs_port_disable.is_none() {
            missing.push(Check::Ports);
        }
        if plan.includes(Check::Shaping) && self.shaper_below_threshold.is_none() {
            missing.push(Check::Shaping);
        }
        missing
    }
}

/// Terminal state of a device in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DeviceState {
    /// Excluded by role or hardware class.
    FilteredOut { reason: String },
    /// Known unreachable from inventory; never contacted.
    SkippedUnreachable,
    /// Session could not be opened, or the inspection timed out.
    ConnectFailed { reason: String },
    /// Diagnosed and classified. `undetermined` is set when a selected
    /// judgment had no usable input.
    Classified {
        flagged: bool,
        undetermined: bool,
        partial: bool,
    },
}

impl DeviceState {
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Classified { .. })
    }

    /// Short status text for progress lines.
    pub fn label(&self) -> String {
        match self {
            Self::FilteredOut { reason } => format!("Filtered out ({reason})"),
            Self::SkippedUnreachable => "Device offline - Skipping".into(),
            Self::ConnectFailed { reason } => format!("Connection failed: {reason}"),
            Self::Classified {
                flagged: true,
                partial,
                ..
            } => with_partial("Action required", *partial),
            Self::Classified {
                undetermined: true,
                partial,
                ..
            } => with_partial("Undetermined", *partial),
            Self::Classified { partial, .. } => with_partial("OK", *partial),
        }
    }
}

fn with_partial(label: &str, partial: bool) -> String {
    if partial {
        format!("{label} (partial data)")
    } else {
        label.to_owned()
    }
}
