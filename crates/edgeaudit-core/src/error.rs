// ── Core error types ──
//
// Run-level errors from edgeaudit-core. Per-device failures never surface
// here; the orchestrator contains them (see `executor::ExecError`). The
// `From<edgeaudit_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to manager at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Manager request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Inventory errors ─────────────────────────────────────────────
    /// The device list could not be fetched. Fatal for the run; no
    /// partial report is produced.
    #[error("Device inventory unavailable: {message}")]
    InventoryUnavailable { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Interaction errors ───────────────────────────────────────────
    #[error("Prompt failed: {message}")]
    Prompt { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<edgeaudit_api::Error> for CoreError {
    fn from(err: edgeaudit_api::Error) -> Self {
        match err {
            edgeaudit_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            edgeaudit_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "manager session expired".into(),
            },
            edgeaudit_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::InventoryUnavailable {
                        message: e.to_string(),
                    }
                }
            }
            edgeaudit_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid manager URL: {e}"),
            },
            edgeaudit_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS setup failed: {msg}"),
            },
            edgeaudit_api::Error::Api { status, message } => CoreError::InventoryUnavailable {
                message: format!("HTTP {status}: {message}"),
            },
            edgeaudit_api::Error::Payload { message } => {
                CoreError::InventoryUnavailable {
                    message: format!("unexpected response: {message}"),
                }
            }
        }
    }
}
