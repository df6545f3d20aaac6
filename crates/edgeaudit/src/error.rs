//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use edgeaudit_config::ConfigError;
use edgeaudit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to the manager at {url}")]
    #[diagnostic(
        code(edgeaudit::connection_failed),
        help(
            "Check that the manager is reachable and your VPN is up.\n\
             URL: {url}\n\
             Self-signed certificate? Try: edgeaudit devices --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(edgeaudit::auth_failed),
        help(
            "Verify the manager username and password.\n\
             Run: edgeaudit config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(edgeaudit::no_credentials),
        help(
            "Configure credentials with: edgeaudit config init\n\
             Or set EDGEAUDIT_USERNAME / EDGEAUDIT_PASSWORD (and EDGEAUDIT_SSH_PASSWORD)."
        )
    )]
    NoCredentials { profile: String },

    // ── Inventory ────────────────────────────────────────────────────

    #[error("Device inventory unavailable: {message}")]
    #[diagnostic(
        code(edgeaudit::inventory),
        help("The manager accepted the login but the device list could not be read.")
    )]
    Inventory { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(edgeaudit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(edgeaudit::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: edgeaudit config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(edgeaudit::no_config),
        help(
            "Create one with: edgeaudit config init\n\
             Or pass --controller and --username.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(edgeaudit::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(edgeaudit::timeout),
        help("Increase timeout with --timeout or check manager responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Internal ─────────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(edgeaudit::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile to an authentication failure.
    pub fn with_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.into(),
                message,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "default".into(),
                message,
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::InventoryUnavailable { message } => CliError::Inventory { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Prompt { message } => CliError::Validation {
                field: "interactive".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        let auth: CliError = CoreError::AuthenticationFailed {
            message: "bad".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let conn: CliError = CoreError::ConnectionFailed {
            url: "https://m".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let timeout: CliError = CoreError::Timeout { timeout_secs: 30 }.into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let inventory: CliError = CoreError::InventoryUnavailable {
            message: "HTTP 500".into(),
        }
        .into();
        assert_eq!(inventory.exit_code(), exit_code::GENERAL);

        let missing: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert_eq!(missing.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn profile_is_attached_to_auth_failures() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "rejected".into(),
        })
        .with_profile("prod");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "prod"));
    }
}
