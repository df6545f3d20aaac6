//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Lists use `tabled`,
//! audit reports use their own fixed-width layout, structured formats use
//! serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use edgeaudit_core::{Check, Report};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// One-line verdict printed under a table-format report.
pub fn verdict(report: &Report, color: bool) -> String {
    let c = &report.counters;
    let text = if report.has_changes() {
        format!("{} router(s) need attention", c.flagged)
    } else if c.undetermined > 0 {
        format!("{} router(s) could not be determined", c.undetermined)
    } else {
        "All inspected routers comply".to_owned()
    };
    match (color, report.has_changes(), c.undetermined > 0) {
        (false, _, _) => text,
        (true, true, _) => text.yellow().bold().to_string(),
        (true, false, true) => text.red().to_string(),
        (true, false, false) => text.green().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render an audit report in the chosen format.
///
/// `plain` lists what needs remediation: serials for the port check, then
/// `<system-ip> <hostname> <rate>` for each shaper below the threshold.
pub fn render_report(format: &OutputFormat, report: &Report) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(report.render()),
        OutputFormat::Json => render_json(report, false),
        OutputFormat::JsonCompact => render_json(report, true),
        OutputFormat::Yaml => render_yaml(report),
        OutputFormat::Plain => {
            let mut lines: Vec<String> = Vec::new();
            if report.plan.includes(Check::Ports) {
                lines.extend(report.port_changes.iter().cloned());
            }
            if report.plan.includes(Check::Shaping) {
                lines.extend(report.below_threshold().map(|e| {
                    format!(
                        "{} {} {}",
                        e.device.system_ip, e.device.hostname, e.diagnostic.shaping_rate
                    )
                }));
            }
            Ok(lines.join("\n"))
        }
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Internal(format!("JSON serialization failed: {e}")))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data)
        .map_err(|e| CliError::Internal(format!("YAML serialization failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edgeaudit_core::{
        ClassificationOutcome, Device, DeviceRole, DiagnosticResult, Liveness, Rate,
        Reachability, ReportAggregator, RunPlan,
    };

    use super::*;

    fn report() -> Report {
        report_with(ClassificationOutcome {
            needs_port_disable: Some(true),
            shaper_below_threshold: Some(true),
            liveness: Liveness::NotApplicable,
        })
    }

    fn report_with(outcome: ClassificationOutcome) -> Report {
        let device = Device {
            system_ip: "10.255.1.1".into(),
            hostname: "BR-LEEDS-LS1-01".into(),
            uuid: "C1161X-8P-FGL2231A0BC".into(),
            serial: "FGL2231A0BC".into(),
            role: DeviceRole::Edge,
            model: None,
            reachability: Reachability::Reachable,
        };
        let mut diagnostic = DiagnosticResult::new(Some("LS1".into()));
        diagnostic.shaping_rate = Rate::Mbps(100);
        let mut agg = ReportAggregator::new(RunPlan::full(), 200);
        agg.record(device, Some("C1161X".into()), diagnostic, outcome);
        agg.summary()
    }

    #[test]
    fn plain_lists_remediation_targets() {
        let out = render_report(&OutputFormat::Plain, &report()).unwrap();
        assert_eq!(out, "FGL2231A0BC\n10.255.1.1 BR-LEEDS-LS1-01 100Mb");
    }

    #[test]
    fn json_report_is_structured() {
        let out = render_report(&OutputFormat::JsonCompact, &report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["port_changes"][0], "FGL2231A0BC");
        assert_eq!(value["counters"]["flagged"], 1);
    }

    #[test]
    fn verdict_without_color_is_plain_text() {
        assert_eq!(verdict(&report(), false), "1 router(s) need attention");
    }

    #[test]
    fn verdict_never_claims_compliance_when_checks_are_missing() {
        let blind = report_with(ClassificationOutcome {
            needs_port_disable: None,
            shaper_below_threshold: Some(false),
            liveness: Liveness::NotApplicable,
        });
        assert_eq!(verdict(&blind, false), "1 router(s) could not be determined");
    }
}
