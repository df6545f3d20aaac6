//! Audit command handlers: `ports`, `shaping`, `run`.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget};
use owo_colors::OwoColorize;
use tracing::debug;

use edgeaudit_core::{
    Device, DeviceState, Inventory, Orchestrator, ProgressEvent, RunPlan, SshExecutor,
};

use crate::cli::GlobalOpts;
use crate::config::{self, ResolvedRun};
use crate::error::CliError;
use crate::output;

pub const VPN_REMINDER: &str =
    "NOTE: Ensure you have an active VPN connection for management before proceeding";

// ── Progress lines ──────────────────────────────────────────────────

/// Per-device status lines on stderr, with a spinner while a run is active.
pub struct ProgressPrinter {
    quiet: bool,
    color: bool,
    spinner: Option<ProgressBar>,
}

impl ProgressPrinter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            color: std::io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
            spinner: None,
        }
    }

    pub fn event(&mut self, event: &ProgressEvent<'_>) {
        if self.quiet {
            return;
        }
        let line = self.line(event.device, event.state);
        let done = event.index + 1;

        if self.spinner.is_none() && std::io::stderr().is_terminal() {
            let pb = ProgressBar::new_spinner();
            pb.set_draw_target(ProgressDrawTarget::stderr());
            pb.enable_steady_tick(Duration::from_millis(120));
            self.spinner = Some(pb);
        }
        match self.spinner {
            Some(ref pb) => {
                pb.println(line);
                pb.set_message(format!("Inspected {done}/{}", event.total));
            }
            None => eprintln!("{line}"),
        }
    }

    /// Clear the spinner at the end of a run.
    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, device: &Device, state: &DeviceState) -> String {
        let label = state.label();
        let label = match (self.color, state) {
            (false, _) => label,
            (true, DeviceState::Classified { flagged: true, .. }) => label.yellow().to_string(),
            (true, DeviceState::Classified { undetermined: true, .. }) => label.red().to_string(),
            (true, DeviceState::Classified { .. }) => label.green().to_string(),
            (true, DeviceState::ConnectFailed { .. }) => label.red().to_string(),
            (true, _) => label.dimmed().to_string(),
        };
        format!("{:<20}{:<35}{label}", device.system_ip, device.hostname)
    }
}

// ── Shared setup ────────────────────────────────────────────────────

/// Log in to the manager, translating auth failures for the profile.
pub async fn connect(run: &ResolvedRun, quiet: bool) -> Result<Inventory, CliError> {
    let spinner = (!quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_message(format!("Connecting to {}...", run.controller.url));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let result = Inventory::connect(&run.controller).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result.map_err(|e| CliError::from(e).with_profile(&run.profile_name))
}

/// Print the VPN reminder ahead of any network work on an interactive terminal.
pub fn remind_vpn(global: &GlobalOpts) {
    if !global.quiet && std::io::stderr().is_terminal() {
        eprintln!("{VPN_REMINDER}\n");
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// Run one plan over the full inventory and print the report.
pub async fn handle(plan: RunPlan, global: &GlobalOpts) -> Result<(), CliError> {
    let run = config::resolve_run(global)?;
    if plan.is_empty() {
        return Err(CliError::Validation {
            field: "checks".into(),
            reason: "at least one check is required".into(),
        });
    }
    remind_vpn(global);

    let inventory = connect(&run, global.quiet).await?;
    let devices = match inventory.devices().await {
        Ok(devices) => devices,
        Err(e) => {
            inventory.close().await;
            return Err(e.into());
        }
    };
    debug!(count = devices.len(), plan = %plan, "starting audit run");

    let orchestrator = Orchestrator::new(SshExecutor::new(&run.ssh), run.settings);
    let mut printer = ProgressPrinter::new(global.quiet);
    let report = orchestrator
        .run_once_with(&devices, &plan, |event| printer.event(event))
        .await;
    printer.finish();
    inventory.close().await;

    let rendered = output::render_report(&global.output, &report)?;
    output::print_output(&rendered, global.quiet);
    if matches!(global.output, crate::cli::OutputFormat::Table) && !global.quiet {
        let color = output::should_color(&global.color);
        eprintln!("{}", output::verdict(&report, color));
    }
    Ok(())
}
