// SD-WAN manager API client modules
//
// Hand-written client for the manager's `j_security_check` session login and
// the `dataservice` endpoints used by the audit (device inventory only).

pub mod auth;
pub mod client;
pub mod devices;
pub mod models;

pub use client::ManagerClient;
