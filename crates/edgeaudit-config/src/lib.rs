//! Configuration for the edgeaudit CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation into the runtime types `edgeaudit_core` consumes. The CLI
//! layers its flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgeaudit_core::{
    AuditSettings, HubConfig, Ipv4Range, PortPolicy, PostcodeRule, TlsVerification,
};

/// Service name for every keyring entry this tool writes.
pub const KEYRING_SERVICE: &str = "edgeaudit";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named manager profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Used by profiles that leave `insecure` unset.
    #[serde(default)]
    pub insecure: bool,

    /// Manager request timeout for profiles that leave `timeout` unset.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named manager profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Manager base URL (e.g., "https://vmanage.example.net").
    pub controller: String,

    /// Manager username.
    pub username: Option<String>,

    /// Manager password (plaintext; prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the manager password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    #[serde(default)]
    pub ssh: SshSection,

    #[serde(default)]
    pub audit: AuditSection,

    /// Hub queried for per-spoke downstream shaping.
    pub hub: Option<HubSection>,
}

/// `[profiles.<name>.ssh]`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SshSection {
    /// Router login; falls back to the manager username.
    pub username: Option<String>,
    /// Router password (plaintext; prefer keyring).
    pub password: Option<String>,
    pub password_env: Option<String>,
    pub port: u16,
    /// Seconds allowed for connect and for each command.
    pub command_timeout: u64,
}

impl Default for SshSection {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            password_env: None,
            port: 22,
            command_timeout: 30,
        }
    }
}

/// `[profiles.<name>.audit]`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditSection {
    pub shaper_threshold_mbps: u64,
    pub model_codes: Vec<String>,
    /// Empty string disables name lookup for the port.
    pub uplink_port: String,
    pub uplink_index: usize,
    pub provisioning_port: String,
    pub provisioning_index: usize,
    pub liveness_ports: Vec<String>,
    pub liveness_models: Vec<String>,
    pub wan_probe: String,
    pub internal_range: String,
    pub postcode_delimiter: char,
    pub postcode_index: usize,
    pub concurrency: usize,
    /// Seconds.
    pub device_timeout: u64,
    /// Seconds; unset means no run deadline.
    pub run_deadline: Option<u64>,
}

impl Default for AuditSection {
    fn default() -> Self {
        let settings = AuditSettings::default();
        Self {
            shaper_threshold_mbps: settings.shaper_threshold_mbps,
            model_codes: settings.model_codes,
            uplink_port: settings.ports.uplink_port.unwrap_or_default(),
            uplink_index: settings.ports.uplink_index,
            provisioning_port: settings.ports.provisioning_port.unwrap_or_default(),
            provisioning_index: settings.ports.provisioning_index,
            liveness_ports: settings.ports.liveness_ports,
            liveness_models: settings.ports.liveness_models,
            wan_probe: settings.wan_probe.to_string(),
            internal_range: settings.internal_range.to_string(),
            postcode_delimiter: settings.postcode.delimiter,
            postcode_index: settings.postcode.index,
            concurrency: settings.concurrency,
            device_timeout: settings.device_timeout.as_secs(),
            run_deadline: None,
        }
    }
}

/// `[profiles.<name>.hub]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubSection {
    pub address: String,
    pub tunnel: String,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "edgeaudit", "edgeaudit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("edgeaudit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, then overlay `EDGEAUDIT_` variables
/// (`EDGEAUDIT_DEFAULTS__TIMEOUT=60` sets `defaults.timeout`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EDGEAUDIT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Keyring account for the manager password of a profile.
pub fn password_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Keyring account for the router SSH password of a profile.
pub fn ssh_password_key(profile_name: &str) -> String {
    format!("{profile_name}/ssh-password")
}

fn keyring_secret(account: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, account)
        .ok()?
        .get_password()
        .ok()
}

/// First secret found: named env vars in order, then the keyring, then
/// the plaintext value.
fn first_secret(
    env_names: &[&str],
    keyring: impl FnOnce() -> Option<String>,
    plaintext: Option<&String>,
) -> Option<SecretString> {
    env_names
        .iter()
        .find_map(|name| std::env::var(name).ok())
        .or_else(keyring)
        .or_else(|| plaintext.cloned())
        .map(SecretString::from)
}

/// Manager username from the profile or `EDGEAUDIT_USERNAME`.
pub fn resolve_username(profile: &Profile) -> Option<String> {
    profile
        .username
        .clone()
        .or_else(|| std::env::var("EDGEAUDIT_USERNAME").ok())
}

/// Manager password: `password_env` → `EDGEAUDIT_PASSWORD` → keyring → plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    let mut envs: Vec<&str> = profile.password_env.iter().map(String::as_str).collect();
    envs.push("EDGEAUDIT_PASSWORD");
    first_secret(
        &envs,
        || keyring_secret(&password_key(profile_name)),
        profile.password.as_ref(),
    )
}

/// Router login, falling back to the manager username.
pub fn resolve_ssh_username(profile: &Profile) -> Option<String> {
    profile
        .ssh
        .username
        .clone()
        .or_else(|| std::env::var("EDGEAUDIT_SSH_USERNAME").ok())
        .or_else(|| resolve_username(profile))
}

/// Router password: `ssh.password_env` → `EDGEAUDIT_SSH_PASSWORD` → keyring → plaintext.
pub fn resolve_ssh_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    let mut envs: Vec<&str> = profile.ssh.password_env.iter().map(String::as_str).collect();
    envs.push("EDGEAUDIT_SSH_PASSWORD");
    first_secret(
        &envs,
        || keyring_secret(&ssh_password_key(profile_name)),
        profile.ssh.password.as_ref(),
    )
}

// ── Translation to runtime types ────────────────────────────────────

/// Fill the profile's unset transport settings from `[defaults]`.
pub fn apply_defaults(profile: &mut Profile, defaults: &Defaults) {
    profile.insecure.get_or_insert(defaults.insecure);
    profile.timeout.get_or_insert(defaults.timeout);
}

/// TLS mode for a profile; managers are commonly self-signed.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::DangerAcceptInvalid
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Validate the audit section and build the core policy.
pub fn profile_to_settings(profile: &Profile) -> Result<AuditSettings, ConfigError> {
    let audit = &profile.audit;

    let wan_probe: Ipv4Addr = audit
        .wan_probe
        .trim()
        .parse()
        .map_err(|_| invalid("audit.wan_probe", format!("not an IPv4 address: {}", audit.wan_probe)))?;
    let internal_range: Ipv4Range = audit
        .internal_range
        .parse()
        .map_err(|reason: String| invalid("audit.internal_range", reason))?;
    if audit.concurrency == 0 {
        return Err(invalid("audit.concurrency", "must be at least 1"));
    }
    if audit.device_timeout == 0 {
        return Err(invalid("audit.device_timeout", "must be at least 1 second"));
    }

    let hub = profile
        .hub
        .as_ref()
        .map(|h| {
            if h.address.trim().is_empty() || h.tunnel.trim().is_empty() {
                Err(invalid("hub", "address and tunnel are both required"))
            } else {
                Ok(HubConfig {
                    address: h.address.trim().to_owned(),
                    tunnel: h.tunnel.trim().to_owned(),
                })
            }
        })
        .transpose()?;

    Ok(AuditSettings {
        shaper_threshold_mbps: audit.shaper_threshold_mbps,
        ports: PortPolicy {
            uplink_port: non_empty(&audit.uplink_port),
            uplink_index: audit.uplink_index,
            provisioning_port: non_empty(&audit.provisioning_port),
            provisioning_index: audit.provisioning_index,
            liveness_ports: audit.liveness_ports.clone(),
            liveness_models: audit.liveness_models.clone(),
        },
        model_codes: audit.model_codes.clone(),
        hub,
        wan_probe,
        internal_range,
        postcode: PostcodeRule {
            delimiter: audit.postcode_delimiter,
            index: audit.postcode_index,
        },
        concurrency: audit.concurrency,
        device_timeout: Duration::from_secs(audit.device_timeout),
        run_deadline: audit.run_deadline.map(Duration::from_secs),
    })
}
