// ── Remote command execution seam ──
//
// The orchestrator only sees these traits. `SshExecutor` is the production
// implementation; tests substitute canned sessions.

use thiserror::Error;

/// Per-device failure while talking to a router.
///
/// Always contained by the orchestrator: it marks the device or the field,
/// never the whole run.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot connect to {host}: {reason}")]
    Connect { host: String, reason: String },

    #[error("authentication rejected by {host} for user '{username}'")]
    Auth { host: String, username: String },

    #[error("command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Whether the session is still usable after this error.
    pub fn is_command_scoped(&self) -> bool {
        matches!(self, Self::Command { .. })
    }
}

/// Opens blocking command sessions to routers.
///
/// Implementations are shared across worker threads; every call happens
/// inside `tokio::task::spawn_blocking`.
pub trait CommandExecutor: Send + Sync + 'static {
    type Session: CommandSession + Send + 'static;

    fn open(&self, host: &str) -> Result<Self::Session, ExecError>;
}

/// An open, authenticated session to one router.
pub trait CommandSession {
    /// Run one show-command and return its raw text output.
    fn run(&mut self, command: &str) -> Result<String, ExecError>;

    /// Tear the session down. Errors are swallowed; the run has its data.
    fn close(&mut self) {}
}
