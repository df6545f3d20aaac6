// ── HTTP transport for one manager session ──
//
// The manager keys its session on a `JSESSIONID` cookie, so every client
// built here carries its own cookie store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Certificate;

use crate::error::Error;

/// Upper bound on the TCP/TLS connect phase of a request.
const CONNECT_TIMEOUT_CAP: Duration = Duration::from_secs(10);

/// How the manager's certificate is checked.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    System,
    /// PEM bundle added as an extra trust root.
    CustomCa(PathBuf),
    /// Managers commonly ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self { tls, timeout }
    }

    /// A fresh cookie-carrying client. Never share one across sessions.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .connect_timeout(self.timeout.min(CONNECT_TIMEOUT_CAP))
            .user_agent(concat!("edgeaudit/", env!("CARGO_PKG_VERSION")));

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA bundle {}: {e}", path.display())))?;
    Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let config = TransportConfig::new(
            TlsMode::CustomCa(PathBuf::from("/nonexistent/edgeaudit-ca.pem")),
            Duration::from_secs(5),
        );
        let err = config.build_client().unwrap_err();
        assert!(matches!(&err, Error::Tls(msg) if msg.contains("edgeaudit-ca.pem")));
    }

    #[test]
    fn self_signed_mode_builds() {
        let config = TransportConfig::new(TlsMode::default(), Duration::from_secs(5));
        assert!(config.build_client().is_ok());
    }
}
