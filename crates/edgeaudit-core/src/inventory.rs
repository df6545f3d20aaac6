// ── Device inventory ──
//
// A manager session scoped to one CLI invocation: log in, pull the device
// list, log out. The list is fetched fresh on every call and converted into
// immutable snapshots.

use edgeaudit_api::{ManagerClient, TlsMode, TransportConfig};
use tracing::{debug, info, warn};

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::Device;

/// Authenticated manager session.
pub struct Inventory {
    client: ManagerClient,
}

impl Inventory {
    /// Build the HTTP transport and log in.
    pub async fn connect(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::new(tls_to_transport(&config.tls), config.timeout);

        let client = ManagerClient::new(config.url.clone(), &transport)?;
        client
            .login(&config.username, &config.password)
            .await
            .map_err(|e| match e {
                edgeaudit_api::Error::Transport(ref t) if t.is_timeout() => CoreError::Timeout {
                    timeout_secs: config.timeout.as_secs(),
                },
                other => CoreError::from(other),
            })?;
        info!(url = %config.url, "connected to manager");
        Ok(Self { client })
    }

    /// Every device the manager knows about.
    pub async fn devices(&self) -> Result<Vec<Device>, CoreError> {
        let raw = self
            .client
            .list_devices()
            .await
            .map_err(|e| CoreError::InventoryUnavailable {
                message: e.to_string(),
            })?;
        debug!(count = raw.len(), "fetched device inventory");
        Ok(raw.into_iter().map(Device::from).collect())
    }

    /// Edge routers only.
    pub async fn edge_devices(&self) -> Result<Vec<Device>, CoreError> {
        Ok(self
            .devices()
            .await?
            .into_iter()
            .filter(Device::is_edge)
            .collect())
    }

    /// End the manager session. Failure is logged, not returned.
    pub async fn close(self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        } else {
            info!("manager session closed");
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
