// Manager API response types
//
// Field names follow the manager's kebab-case JSON. Anything the audit does
// not consume is preserved in `extra` for `--output json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `{ "header": {...}, "data": [...] }` envelope around `dataservice` lists.
#[derive(Debug, Deserialize)]
pub struct ManagerResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// One row of `GET /dataservice/device`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManagerDevice {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    pub system_ip: Option<String>,
    pub host_name: Option<String>,
    #[serde(default)]
    pub uuid: String,
    /// `vedge`, `vsmart`, `vmanage` or `vbond`.
    pub personality: Option<String>,
    pub device_model: Option<String>,
    /// `reachable` / `unreachable`.
    pub reachability: Option<String>,
    pub site_id: Option<String>,
    pub board_serial: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
