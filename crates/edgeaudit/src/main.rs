mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::{CliError, exit_code};

/// Crates whose events `-v` turns up. Dependencies stay at `warn` until `-vvv`.
const OWN_CRATES: [&str; 4] = ["edgeaudit", "edgeaudit_core", "edgeaudit_api", "edgeaudit_config"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    // A Ctrl-C mid-run drops the in-flight SSH sessions with the runtime.
    let result = tokio::select! {
        result = run(cli) => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted, abandoning the audit run");
            std::process::exit(exit_code::INTERRUPTED);
        }
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn log_directives(verbosity: u8) -> String {
    let (own, deps) = match verbosity {
        0 => ("warn", "warn"),
        1 => ("info", "warn"),
        2 => ("debug", "warn"),
        _ => ("trace", "debug"),
    };
    let mut directives = deps.to_owned();
    for krate in OWN_CRATES {
        directives.push_str(&format!(",{krate}={own}"));
    }
    directives
}

fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "edgeaudit", &mut std::io::stdout());
            Ok(())
        }
        cmd => {
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cli.global).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_scopes_to_own_crates() {
        assert_eq!(
            log_directives(1),
            "warn,edgeaudit=info,edgeaudit_core=info,edgeaudit_api=info,edgeaudit_config=info"
        );
        assert!(log_directives(5).starts_with("debug,edgeaudit=trace"));
    }
}
