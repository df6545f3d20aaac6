// ── Report aggregation and rendering ──
//
// The aggregator lives on the orchestrator's driving task; workers hand
// their results back rather than writing here directly.

use std::fmt::Write as _;

use indexmap::IndexSet;
use serde::Serialize;

use crate::model::{ClassificationOutcome, Device, DeviceState, DiagnosticResult};
use crate::plan::{Check, RunPlan};

/// One classified device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub device: Device,
    pub device_class: Option<String>,
    pub diagnostic: DiagnosticResult,
    pub outcome: ClassificationOutcome,
}

/// A device that never reached classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclassifiedDevice {
    pub device: Device,
    pub state: DeviceState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub total_devices: usize,
    pub filtered_out: usize,
    pub unreachable: usize,
    pub connect_failed: usize,
    /// In scope and reachable according to inventory.
    pub reachable: usize,
    pub classified: usize,
    pub flagged: usize,
    /// Classified, but at least one selected judgment is missing.
    pub undetermined: usize,
}

/// Outcome of one run, in inventory order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub plan: RunPlan,
    pub threshold_mbps: u64,
    pub entries: Vec<ReportEntry>,
    pub unclassified: Vec<UnclassifiedDevice>,
    /// Serials needing the provisioning port disabled, first-seen order.
    pub port_changes: IndexSet<String>,
    /// The hub could not be reached; downstream values are unknown.
    pub hub_unavailable: bool,
    pub counters: RunCounters,
}

impl Report {
    pub fn needs_port_disable(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome.needs_port_disable == Some(true))
    }

    pub fn below_threshold(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome.shaper_below_threshold == Some(true))
    }

    /// Entries whose judgment for `check` could not be made.
    pub fn undetermined(&self, check: Check) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(move |e| e.outcome.undetermined(&self.plan).contains(&check))
    }

    /// Whether any selected check asks for remediation.
    pub fn has_changes(&self) -> bool {
        self.counters.flagged > 0
    }

    /// Fixed-width text report.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.unclassified.is_empty() {
            out.push_str("\nDevices not inspected:\n\n");
            for u in &self.unclassified {
                let _ = writeln!(out, "{}", row(&u.device, &u.state.label()));
            }
        }

        if self.counters.undetermined > 0 {
            out.push_str("\nCould not determine:\n\n");
            for e in &self.entries {
                let missing = e.outcome.undetermined(&self.plan);
                if missing.is_empty() {
                    continue;
                }
                let missing: Vec<String> = missing.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "{}", row(&e.device, &missing.join(", ")));
            }
        }

        if self.plan.includes(Check::Ports) {
            let unknown = self.undetermined(Check::Ports).count();
            if self.port_changes.is_empty() && unknown == 0 {
                out.push_str("\nNo changes required!\n");
            } else if self.port_changes.is_empty() {
                let _ = writeln!(
                    out,
                    "\nNo provisioning port changes found, but {unknown} router(s) could not be checked."
                );
            } else {
                out.push_str("\nThe following serial numbers need the provision ports disabling:\n\n");
                for serial in &self.port_changes {
                    let _ = writeln!(out, "{serial}");
                }
            }
        }

        if self.plan.includes(Check::Shaping) {
            self.render_shaping(&mut out);
        }

        if self.hub_unavailable {
            out.push_str("\nHub unavailable: downstream bandwidth could not be collected.\n");
        }

        let c = &self.counters;
        let _ = writeln!(
            out,
            "\n{} devices: {} filtered out, {} offline, {} failed, {} inspected, {} flagged, {} undetermined",
            c.total_devices,
            c.filtered_out,
            c.unreachable,
            c.connect_failed,
            c.classified,
            c.flagged,
            c.undetermined,
        );
        out
    }

    fn render_shaping(&self, out: &mut String) {
        let below: Vec<&ReportEntry> = self.below_threshold().collect();
        let unknown = self.undetermined(Check::Shaping).count();
        if below.is_empty() && unknown == 0 {
            let _ = writeln!(
                out,
                "\nNo shapers below {}Mb found. No changes required!",
                self.threshold_mbps
            );
        } else if below.is_empty() {
            let _ = writeln!(
                out,
                "\nNo shapers below {}Mb found, but {unknown} router(s) had no readable shaper.",
                self.threshold_mbps
            );
        } else {
            let _ = writeln!(
                out,
                "\nThe following shapers of less than {}Mb were found:\n",
                self.threshold_mbps
            );
            for e in below {
                let _ = writeln!(out, "{}", row(&e.device, &e.diagnostic.shaping_rate.to_string()));
            }
        }

        if self.entries.is_empty() {
            return;
        }
        let _ = writeln!(
            out,
            "\n{:<20}{:<35}{:<12}{:<16}{:<16}{:<18}{}",
            "SYSTEM IP", "HOSTNAME", "POSTCODE", "SHAPER", "DOWNSTREAM", "WAN IP", "LIVENESS"
        );
        for e in &self.entries {
            let d = &e.diagnostic;
            let wan = d.wan_ip.map_or_else(|| "unknown".to_owned(), |ip| ip.to_string());
            let _ = writeln!(
                out,
                "{:<20}{:<35}{:<12}{:<16}{:<16}{:<18}{}",
                e.device.system_ip,
                e.device.hostname,
                d.postcode.as_deref().unwrap_or("-"),
                d.shaping_rate.to_string(),
                d.downstream.to_string(),
                wan,
                e.outcome.liveness,
            );
        }
    }
}

fn row(device: &Device, tail: &str) -> String {
    format!("{:<20}{:<35}{tail}", device.system_ip, device.hostname)
}

/// Accumulates per-device results for one run.
#[derive(Debug)]
pub struct ReportAggregator {
    report: Report,
}

impl ReportAggregator {
    pub fn new(plan: RunPlan, threshold_mbps: u64) -> Self {
        Self {
            report: Report {
                plan,
                threshold_mbps,
                entries: Vec::new(),
                unclassified: Vec::new(),
                port_changes: IndexSet::new(),
                hub_unavailable: false,
                counters: RunCounters::default(),
            },
        }
    }

    pub fn mark_hub_unavailable(&mut self) {
        self.report.hub_unavailable = true;
    }

    pub fn record(
        &mut self,
        device: Device,
        device_class: Option<String>,
        diagnostic: DiagnosticResult,
        outcome: ClassificationOutcome,
    ) {
        let counters = &mut self.report.counters;
        counters.total_devices += 1;
        counters.reachable += 1;
        counters.classified += 1;
        if outcome.is_flagged() {
            counters.flagged += 1;
        }
        if !outcome.undetermined(&self.report.plan).is_empty() {
            counters.undetermined += 1;
        }
        if outcome.needs_port_disable == Some(true) {
            self.report.port_changes.insert(device.serial.clone());
        }
        self.report.entries.push(ReportEntry {
            device,
            device_class,
            diagnostic,
            outcome,
        });
    }

    pub fn record_unclassified(&mut self, device: Device, state: DeviceState) {
        let counters = &mut self.report.counters;
        counters.total_devices += 1;
        match &state {
            DeviceState::FilteredOut { .. } => counters.filtered_out += 1,
            DeviceState::SkippedUnreachable => counters.unreachable += 1,
            DeviceState::ConnectFailed { .. } => {
                counters.reachable += 1;
                counters.connect_failed += 1;
            }
            DeviceState::Classified { .. } => {}
        }
        // Filtered devices are noise in the rendered report.
        if !matches!(state, DeviceState::FilteredOut { .. }) {
            self.report
                .unclassified
                .push(UnclassifiedDevice { device, state });
        }
    }

    pub fn summary(self) -> Report {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{DeviceRole, Liveness, Rate, Reachability};

    fn device(ip: &str, name: &str, uuid: &str) -> Device {
        Device {
            system_ip: ip.into(),
            hostname: name.into(),
            uuid: uuid.into(),
            serial: Device::serial_from_uuid(uuid),
            role: DeviceRole::Edge,
            model: None,
            reachability: Reachability::Reachable,
        }
    }

    fn outcome(port: Option<bool>, shaper: Option<bool>) -> ClassificationOutcome {
        ClassificationOutcome {
            needs_port_disable: port,
            shaper_below_threshold: shaper,
            liveness: Liveness::NotApplicable,
        }
    }

    #[test]
    fn port_changes_are_deduplicated_in_first_seen_order() {
        let mut agg = ReportAggregator::new(RunPlan::ports(), 200);
        let a = device("10.0.0.1", "a", "C1161X-8P-SER1");
        let b = device("10.0.0.2", "b", "C1127-8P-SER2");
        agg.record(a.clone(), None, DiagnosticResult::new(None), outcome(Some(true), None));
        agg.record(b, None, DiagnosticResult::new(None), outcome(Some(true), None));
        agg.record(a, None, DiagnosticResult::new(None), outcome(Some(true), None));

        let report = agg.summary();
        let serials: Vec<&str> = report.port_changes.iter().map(String::as_str).collect();
        assert_eq!(serials, vec!["SER1", "SER2"]);
        assert_eq!(report.counters.flagged, 3);
    }

    #[test]
    fn unclassified_devices_are_counted_not_classified() {
        let mut agg = ReportAggregator::new(RunPlan::ports(), 200);
        agg.record_unclassified(
            device("10.0.0.1", "off", "C1161X-8P-SER1"),
            DeviceState::SkippedUnreachable,
        );
        agg.record_unclassified(
            device("10.0.0.2", "hub", "C8300-SER2"),
            DeviceState::FilteredOut {
                reason: "model".into(),
            },
        );
        agg.record_unclassified(
            device("10.0.0.3", "flaky", "C1127-SER3"),
            DeviceState::ConnectFailed {
                reason: "timeout".into(),
            },
        );
        let report = agg.summary();

        assert_eq!(
            report.counters,
            RunCounters {
                total_devices: 3,
                filtered_out: 1,
                unreachable: 1,
                connect_failed: 1,
                reachable: 1,
                classified: 0,
                flagged: 0,
                undetermined: 0,
            }
        );
        assert!(report.entries.is_empty());
        assert_eq!(report.unclassified.len(), 2);
        assert!(report.render().contains("No changes required!"));
    }

    #[test]
    fn render_lists_shapers_in_fixed_width() {
        let mut agg = ReportAggregator::new(RunPlan::shaping(), 200);
        let mut slow = DiagnosticResult::new(Some("AB1".into()));
        slow.shaping_rate = Rate::Mbps(150);
        agg.record(
            device("10.0.0.2", "site-b-AB1", "C1161X-SER2"),
            Some("1161".into()),
            slow,
            outcome(None, Some(true)),
        );
        let mut fast = DiagnosticResult::new(None);
        fast.shaping_rate = Rate::Mbps(250);
        agg.record(
            device("10.0.0.3", "site-c", "C1161X-SER3"),
            Some("1161".into()),
            fast,
            outcome(None, Some(false)),
        );

        let text = agg.summary().render();
        let expected = format!("{:<20}{:<35}150Mb", "10.0.0.2", "site-b-AB1");
        assert!(text.contains("The following shapers of less than 200Mb were found:"));
        assert!(text.contains(&expected));
        assert!(!text.contains(&format!("{:<20}{:<35}250Mb", "10.0.0.3", "site-c")));
        assert!(!text.contains("serial numbers"));
    }

    #[test]
    fn undetermined_devices_block_the_all_clear() {
        let mut agg = ReportAggregator::new(RunPlan::full(), 200);
        agg.record(
            device("10.0.0.1", "clean", "C1161X-8P-SER1"),
            Some("1161".into()),
            DiagnosticResult::new(None),
            outcome(Some(false), Some(false)),
        );
        agg.record(
            device("10.0.0.2", "blind", "C1161X-8P-SER2"),
            Some("1161".into()),
            DiagnosticResult::new(None),
            outcome(None, None),
        );
        let report = agg.summary();

        assert_eq!(report.counters.undetermined, 1);
        assert_eq!(report.counters.flagged, 0);
        assert_eq!(report.undetermined(Check::Shaping).count(), 1);

        let text = report.render();
        let expected = format!("{:<20}{:<35}ports, shaping", "10.0.0.2", "blind");
        assert!(text.contains("Could not determine:"));
        assert!(text.contains(&expected));
        assert!(!text.contains("No changes required!"));
        assert!(text.contains("1 router(s) could not be checked"));
        assert!(text.contains("1 router(s) had no readable shaper"));
    }
}
