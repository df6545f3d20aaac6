// ── API-to-domain conversion ──
//
// Normalizes manager inventory rows into immutable `Device` snapshots.

use edgeaudit_api::ManagerDevice;

use crate::model::{Device, DeviceRole, Reachability};

fn parse_role(personality: Option<&str>) -> DeviceRole {
    match personality.map(str::to_ascii_lowercase).as_deref() {
        Some("vedge" | "edge") => DeviceRole::Edge,
        Some("vsmart" | "controller") => DeviceRole::Controller,
        Some("vmanage" | "manager") => DeviceRole::Manager,
        Some("vbond" | "validator") => DeviceRole::Validator,
        _ => DeviceRole::Other,
    }
}

/// Anything but an explicit `reachable` is treated as offline.
fn parse_reachability(raw: Option<&str>) -> Reachability {
    match raw {
        Some(r) if r.eq_ignore_ascii_case("reachable") => Reachability::Reachable,
        _ => Reachability::Unreachable,
    }
}

impl From<ManagerDevice> for Device {
    fn from(d: ManagerDevice) -> Self {
        let serial = match d.board_serial.as_deref() {
            Some(board) if d.uuid.is_empty() || d.uuid.ends_with('-') => board.to_owned(),
            _ => Device::serial_from_uuid(&d.uuid),
        };
        let system_ip = d.system_ip.unwrap_or_else(|| d.device_id.clone());
        let hostname = d.host_name.unwrap_or_else(|| d.device_id.clone());

        Device {
            system_ip,
            hostname,
            uuid: d.uuid,
            serial,
            role: parse_role(d.personality.as_deref()),
            model: d.device_model,
            reachability: parse_reachability(d.reachability.as_deref()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn manager_device(value: serde_json::Value) -> ManagerDevice {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn converts_edge_row() {
        let device: Device = manager_device(json!({
            "deviceId": "10.255.0.2",
            "system-ip": "10.255.0.2",
            "host-name": "rtr-b-CD2",
            "uuid": "C1161X-8P-FGL2231A0BC",
            "personality": "vedge",
            "device-model": "vedge-C1161X-8P",
            "reachability": "reachable",
        }))
        .into();

        assert_eq!(device.serial, "FGL2231A0BC");
        assert_eq!(device.role, DeviceRole::Edge);
        assert_eq!(device.hostname, "rtr-b-CD2");
        assert!(device.reachability.is_reachable());
        assert_eq!(device.model.as_deref(), Some("vedge-C1161X-8P"));
    }

    #[test]
    fn missing_fields_fall_back() {
        let device: Device = manager_device(json!({
            "deviceId": "10.255.0.9",
            "personality": "vsmart",
            "board-serial": "ABC123",
        }))
        .into();

        assert_eq!(device.hostname, "10.255.0.9");
        assert_eq!(device.system_ip, "10.255.0.9");
        assert_eq!(device.serial, "ABC123");
        assert_eq!(device.role, DeviceRole::Controller);
        assert_eq!(device.reachability, Reachability::Unreachable);
    }

    #[test]
    fn truncated_uuid_prefers_board_serial() {
        let device: Device = manager_device(json!({
            "deviceId": "10.255.0.4",
            "uuid": "C1161X-8P-",
            "board-serial": "FGL2231A0BC",
        }))
        .into();
        assert_eq!(device.serial, "FGL2231A0BC");

        let bare: Device = manager_device(json!({
            "deviceId": "10.255.0.5",
            "uuid": "C1161X-8P-",
        }))
        .into();
        assert_eq!(bare.serial, "C1161X-8P-");
    }
}
