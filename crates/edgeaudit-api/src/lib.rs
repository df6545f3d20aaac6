// edgeaudit-api: Async Rust client for the SD-WAN manager REST API

pub mod error;
pub mod manager;
pub mod transport;

pub use error::Error;
pub use manager::ManagerClient;
pub use manager::models::{ManagerDevice, ManagerResponse};
pub use transport::{TlsMode, TransportConfig};
