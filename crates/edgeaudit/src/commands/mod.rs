//! Command dispatch: bridges CLI args -> core run plans -> output formatting.

pub mod audit;
pub mod config_cmd;
pub mod devices;
pub mod menu;
pub mod util;

use edgeaudit_core::RunPlan;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a manager-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Ports => audit::handle(RunPlan::ports(), global).await,
        Command::Shaping => audit::handle(RunPlan::shaping(), global).await,
        Command::Run(args) => {
            audit::handle(RunPlan::new(args.checks, !args.all_models), global).await
        }
        Command::Menu => menu::handle(global).await,
        Command::Devices(args) => devices::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
