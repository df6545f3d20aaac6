//! CLI configuration: thin wrapper around `edgeaudit_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--controller, --username, --threshold, ...) and falls back to prompting
//! for missing credentials when attached to a terminal.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;

use edgeaudit_core::{AuditSettings, ControllerConfig, SshCredentials};

use crate::cli::GlobalOpts;
use crate::commands::util::{prompt_password, prompt_text};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use edgeaudit_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Everything an audit run needs, resolved once per invocation.
pub struct ResolvedRun {
    pub profile_name: String,
    pub controller: ControllerConfig,
    pub ssh: SshCredentials,
    pub settings: AuditSettings,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Whether missing credentials may be asked for interactively.
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// The active profile with flag overrides applied.
///
/// Without a stored profile, `--controller` alone is enough to build one.
pub fn effective_profile(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let cfg = load_config_or_default();
    let name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profiles.get(&name), global.controller.as_deref()) {
        (Some(stored), _) => stored.clone(),
        (None, Some(url)) => Profile {
            controller: url.to_owned(),
            ..Profile::default()
        },
        (None, None) if global.profile.is_some() && !cfg.profiles.is_empty() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: available.join(", "),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile > [defaults]
    edgeaudit_config::apply_defaults(&mut profile, &cfg.defaults);
    if let Some(ref url) = global.controller {
        profile.controller.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref username) = global.ssh_username {
        profile.ssh.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(threshold) = global.threshold {
        profile.audit.shaper_threshold_mbps = threshold;
    }
    if let Some(concurrency) = global.concurrency {
        profile.audit.concurrency = concurrency;
    }

    Ok((name, profile))
}

/// Translate the effective profile into a `ControllerConfig`, prompting for
/// whatever credential is missing when possible.
pub fn resolve_controller(
    profile: &Profile,
    profile_name: &str,
    interactive: bool,
) -> Result<ControllerConfig, CliError> {
    let url: url::Url = profile.controller.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {}", profile.controller),
    })?;

    let username = match edgeaudit_config::resolve_username(profile) {
        Some(u) => u,
        None if interactive => prompt_text("Manager username")?,
        None => return Err(no_credentials(profile_name)),
    };
    let password = match edgeaudit_config::resolve_password(profile, profile_name) {
        Some(p) => p,
        None if interactive => prompt_password("Manager password")?,
        None => return Err(no_credentials(profile_name)),
    };

    Ok(ControllerConfig {
        url,
        username,
        password,
        tls: edgeaudit_config::profile_tls(profile),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
    })
}

/// Router SSH credentials. The manager login is offered as the default
/// when nothing router-specific is configured.
pub fn resolve_ssh(
    profile: &Profile,
    profile_name: &str,
    controller: &ControllerConfig,
    interactive: bool,
) -> Result<SshCredentials, CliError> {
    let username = edgeaudit_config::resolve_ssh_username(profile)
        .unwrap_or_else(|| controller.username.clone());
    let password: SecretString =
        match edgeaudit_config::resolve_ssh_password(profile, profile_name) {
            Some(p) => p,
            None if interactive => prompt_password(&format!("Router SSH password for {username}"))?,
            None => return Err(no_credentials(profile_name)),
        };

    Ok(SshCredentials {
        username,
        password,
        port: profile.ssh.port,
        command_timeout: Duration::from_secs(profile.ssh.command_timeout),
    })
}

/// Resolve everything for an audit run.
pub fn resolve_run(global: &GlobalOpts) -> Result<ResolvedRun, CliError> {
    let (profile_name, profile) = effective_profile(global)?;
    let settings = edgeaudit_config::profile_to_settings(&profile)?;
    let interactive = can_prompt();
    let controller = resolve_controller(&profile, &profile_name, interactive)?;
    let ssh = resolve_ssh(&profile, &profile_name, &controller, interactive)?;

    Ok(ResolvedRun {
        profile_name,
        controller,
        ssh,
        settings,
    })
}

fn no_credentials(profile_name: &str) -> CliError {
    CliError::NoCredentials {
        profile: profile_name.into(),
    }
}
