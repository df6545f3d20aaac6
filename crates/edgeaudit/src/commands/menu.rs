//! The interactive operator menu.

use std::io::IsTerminal;

use dialoguer::Select;

use edgeaudit_core::{CoreError, Menu, MenuChoice, Orchestrator, ProgressEvent, Report, SshExecutor};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::commands::audit::{ProgressPrinter, connect, remind_vpn};
use crate::config;
use crate::error::CliError;
use crate::output;

const OPTIONS: [&str; 3] = [
    "Check for provisioning ports that should be disabled",
    "List sites with shapers less than the threshold",
    "Exit this utility",
];

/// Menu front end on the controlling terminal.
struct DialoguerMenu {
    format: OutputFormat,
    quiet: bool,
    threshold_mbps: u64,
    printer: ProgressPrinter,
}

impl DialoguerMenu {
    fn items(&self) -> Vec<String> {
        OPTIONS
            .iter()
            .map(|item| item.replace("the threshold", &format!("{}Mb", self.threshold_mbps)))
            .collect()
    }
}

fn choice_for(index: usize) -> MenuChoice {
    match index {
        0 => MenuChoice::CheckPorts,
        1 => MenuChoice::ShapingReport,
        _ => MenuChoice::Exit,
    }
}

impl Menu for DialoguerMenu {
    fn choose(&mut self) -> Result<MenuChoice, CoreError> {
        let selection = Select::new()
            .with_prompt("Select an option")
            .items(&self.items())
            .default(0)
            .interact_opt()
            .map_err(|e| CoreError::Prompt {
                message: e.to_string(),
            })?;
        // Esc / q behaves like Exit.
        Ok(selection.map_or(MenuChoice::Exit, choice_for))
    }

    fn progress(&mut self, event: &ProgressEvent<'_>) {
        self.printer.event(event);
    }

    fn show(&mut self, report: &Report) -> Result<(), CoreError> {
        self.printer.finish();
        let rendered = output::render_report(&self.format, report)
            .map_err(|e| CoreError::Internal(e.to_string()))?;
        output::print_output(&rendered, self.quiet);
        eprintln!();
        Ok(())
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "menu".into(),
            reason: "the interactive menu needs a terminal; use `ports` or `shaping`".into(),
        });
    }

    let run = config::resolve_run(global)?;
    remind_vpn(global);

    let inventory = connect(&run, global.quiet).await?;
    let devices = match inventory.devices().await {
        Ok(devices) => devices,
        Err(e) => {
            inventory.close().await;
            return Err(e.into());
        }
    };

    let mut menu = DialoguerMenu {
        format: global.output.clone(),
        quiet: global.quiet,
        threshold_mbps: run.settings.shaper_threshold_mbps,
        printer: ProgressPrinter::new(global.quiet),
    };
    let orchestrator = Orchestrator::new(SshExecutor::new(&run.ssh), run.settings);
    let result = orchestrator.run_interactive(&devices, &mut menu).await;

    eprintln!("Closing the manager session");
    inventory.close().await;
    result.map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_choices() {
        assert_eq!(choice_for(0), MenuChoice::CheckPorts);
        assert_eq!(choice_for(1), MenuChoice::ShapingReport);
        assert_eq!(choice_for(2), MenuChoice::Exit);
    }

    #[test]
    fn shaping_option_names_the_threshold() {
        let menu = DialoguerMenu {
            format: OutputFormat::Table,
            quiet: true,
            threshold_mbps: 200,
            printer: ProgressPrinter::new(true),
        };
        assert_eq!(menu.items()[1], "List sites with shapers less than 200Mb");
        assert_eq!(menu.items()[2], "Exit this utility");
    }
}
