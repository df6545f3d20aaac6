// ── Manager client errors ──

use thiserror::Error;

/// Failure talking to the SD-WAN manager.
#[derive(Debug, Error)]
pub enum Error {
    /// `j_security_check` or the XSRF token request was refused.
    #[error("manager login failed: {message}")]
    Authentication { message: String },

    /// A `dataservice` call was answered with the login page or HTTP 401.
    #[error("manager session expired, log in again")]
    SessionExpired,

    #[error("request to manager failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid manager URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CA bundle unreadable, or the HTTP client could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// Non-2xx status from a `dataservice` endpoint.
    #[error("manager returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The `{ data: [...] }` envelope did not decode.
    #[error("unexpected manager payload: {message}")]
    Payload { message: String },
}
