// Manager device inventory endpoint

use tracing::debug;

use crate::error::Error;
use crate::manager::client::ManagerClient;
use crate::manager::models::ManagerDevice;

impl ManagerClient {
    /// List every device known to the manager (controllers, validators and
    /// edges alike). Filtering by personality happens in the caller.
    ///
    /// `GET /dataservice/device`
    pub async fn list_devices(&self) -> Result<Vec<ManagerDevice>, Error> {
        let url = self.dataservice_url("device")?;
        debug!("listing devices");
        self.get(url).await
    }
}
