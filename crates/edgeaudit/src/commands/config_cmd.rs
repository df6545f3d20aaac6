//! Config subcommand handlers.

use std::collections::HashMap;
use std::fmt::Write as _;

use dialoguer::{Input, Select};
use secrecy::ExposeSecret;

use edgeaudit_config::{Defaults, HubSection, password_key, ssh_password_key};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::commands::util::{
    parse_value, prompt_err, prompt_password, prompt_text, split_list, store_in_keyring,
};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "controller = \"{}\"", p.controller);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"{REDACTED}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }

        let _ = writeln!(out, "\n[profiles.{name}.ssh]");
        if let Some(ref u) = p.ssh.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.ssh.password.is_some() {
            let _ = writeln!(out, "password = \"{REDACTED}\"");
        }
        let _ = writeln!(out, "port = {}", p.ssh.port);
        let _ = writeln!(out, "command_timeout = {}", p.ssh.command_timeout);

        let a = &p.audit;
        let _ = writeln!(out, "\n[profiles.{name}.audit]");
        let _ = writeln!(out, "shaper_threshold_mbps = {}", a.shaper_threshold_mbps);
        let _ = writeln!(out, "model_codes = {:?}", a.model_codes);
        let _ = writeln!(out, "uplink_port = \"{}\"", a.uplink_port);
        let _ = writeln!(out, "provisioning_port = \"{}\"", a.provisioning_port);
        let _ = writeln!(out, "liveness_models = {:?}", a.liveness_models);
        let _ = writeln!(out, "concurrency = {}", a.concurrency);
        let _ = writeln!(out, "device_timeout = {}", a.device_timeout);

        if let Some(ref hub) = p.hub {
            let _ = writeln!(out, "\n[profiles.{name}.hub]");
            let _ = writeln!(out, "address = \"{}\"", hub.address);
            let _ = writeln!(out, "tunnel = \"{}\"", hub.tunnel);
        }
    }

    out
}

/// Replace stored plaintext secrets before structured output.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.ssh.password.is_some() {
            profile.ssh.password = Some(REDACTED.into());
        }
    }
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    keyring_key: &str,
    prompt: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store_in_keyring(keyring_key, secret, label)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

/// Apply one `config set` key to a profile.
#[allow(clippy::too_many_lines)]
fn apply_setting(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    let key = key.replace('-', "_");
    let audit = &mut profile.audit;
    match key.as_str() {
        "controller" => profile.controller = value,
        "username" => profile.username = Some(value),
        "password_env" => profile.password_env = Some(value),
        "insecure" => profile.insecure = Some(parse_value(&key, &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_value(&key, &value, "a number (seconds)")?),
        "ca_cert" => profile.ca_cert = Some(value.into()),

        "ssh.username" => profile.ssh.username = Some(value),
        "ssh.password_env" => profile.ssh.password_env = Some(value),
        "ssh.port" => profile.ssh.port = parse_value(&key, &value, "a port number")?,
        "ssh.command_timeout" => {
            profile.ssh.command_timeout = parse_value(&key, &value, "a number (seconds)")?;
        }

        "audit.shaper_threshold_mbps" => {
            audit.shaper_threshold_mbps = parse_value(&key, &value, "a number (Mbps)")?;
        }
        "audit.model_codes" => audit.model_codes = split_list(&value),
        "audit.uplink_port" => audit.uplink_port = value,
        "audit.uplink_index" => audit.uplink_index = parse_value(&key, &value, "an index")?,
        "audit.provisioning_port" => audit.provisioning_port = value,
        "audit.provisioning_index" => {
            audit.provisioning_index = parse_value(&key, &value, "an index")?;
        }
        "audit.liveness_ports" => audit.liveness_ports = split_list(&value),
        "audit.liveness_models" => audit.liveness_models = split_list(&value),
        "audit.wan_probe" => audit.wan_probe = value,
        "audit.internal_range" => audit.internal_range = value,
        "audit.postcode_delimiter" => {
            audit.postcode_delimiter = parse_value(&key, &value, "a single character")?;
        }
        "audit.postcode_index" => audit.postcode_index = parse_value(&key, &value, "an index")?,
        "audit.concurrency" => audit.concurrency = parse_value(&key, &value, "a number")?,
        "audit.device_timeout" => {
            audit.device_timeout = parse_value(&key, &value, "a number (seconds)")?;
        }
        "audit.run_deadline" => {
            audit.run_deadline = if value.trim().is_empty() || value == "none" {
                None
            } else {
                Some(parse_value(&key, &value, "a number (seconds) or 'none'")?)
            };
        }

        "hub.address" | "hub.tunnel" => {
            let hub = profile.hub.get_or_insert_with(|| HubSection {
                address: String::new(),
                tunnel: String::new(),
            });
            if key == "hub.address" {
                hub.address = value;
            } else {
                hub.tunnel = value;
            }
        }

        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: controller, username, \
                     password_env, insecure, timeout, ca_cert, ssh.*, audit.*, hub.address, \
                     hub.tunnel"
                ),
            });
        }
    }

    if key.starts_with("audit.") {
        edgeaudit_config::profile_to_settings(profile)?;
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("edgeaudit configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Manager
            let controller: String = Input::new()
                .with_prompt("Manager URL")
                .default("https://vmanage.example.net".into())
                .interact_text()
                .map_err(prompt_err)?;
            controller.parse::<url::Url>().map_err(|_| CliError::Validation {
                field: "controller".into(),
                reason: format!("invalid URL: {controller}"),
            })?;

            let username = prompt_text("Manager username")?;
            let manager_password = prompt_password("Manager password")?;
            let password = prompt_keyring_storage(
                manager_password.expose_secret(),
                &password_key(&profile_name),
                "Where to store the manager password?",
                "Manager password",
            )?;

            // 3. Router SSH credentials
            let mut profile = Profile {
                controller,
                username: Some(username),
                password,
                ..Profile::default()
            };

            let reuse = Select::new()
                .with_prompt("Router SSH login")
                .items(&["Same as the manager login", "Different credentials"])
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            if reuse == 1 {
                profile.ssh.username = Some(prompt_text("Router SSH username")?);
                let ssh_password = prompt_password("Router SSH password")?;
                profile.ssh.password = prompt_keyring_storage(
                    ssh_password.expose_secret(),
                    &ssh_password_key(&profile_name),
                    "Where to store the router password?",
                    "Router password",
                )?;
            } else if profile.password.is_some() {
                profile.ssh.password.clone_from(&profile.password);
            } else {
                store_in_keyring(
                    &ssh_password_key(&profile_name),
                    manager_password.expose_secret(),
                    "Router password",
                )?;
            }

            // 4. Optional hub for downstream shaping
            let hub_address: String = Input::new()
                .with_prompt("Hub address for downstream shaping (blank to skip)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            if !hub_address.trim().is_empty() {
                let tunnel = prompt_text("Hub tunnel interface")?;
                profile.hub = Some(HubSection {
                    address: hub_address.trim().to_owned(),
                    tunnel,
                });
            }

            // 5. Build and write config
            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: edgeaudit devices");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            apply_setting(profile, &key, value)?;

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: edgeaudit config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let manager = prompt_password("Manager password")?;
            store_in_keyring(&password_key(&profile_name), manager.expose_secret(), "manager password")?;

            let router = rpassword::prompt_password("Router SSH password (blank = same as manager): ")
                .map_err(prompt_err)?;
            let router = if router.is_empty() {
                manager.expose_secret().to_owned()
            } else {
                router
            };
            store_in_keyring(&ssh_password_key(&profile_name), &router, "router password")?;

            eprintln!("✓ Passwords stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
