#![allow(clippy::unwrap_used)]
// Integration tests for `Inventory` against a mocked manager.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edgeaudit_core::{ControllerConfig, CoreError, DeviceRole, Inventory, TlsVerification};

fn config(server: &MockServer, password: &str) -> ControllerConfig {
    ControllerConfig {
        url: Url::parse(&server.uri()).unwrap(),
        username: "admin".into(),
        password: password.to_string().into(),
        tls: TlsVerification::SystemDefaults,
        timeout: Duration::from_secs(5),
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_edge_devices_filters_by_role() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "deviceId": "10.255.0.1",
                    "system-ip": "10.255.0.1",
                    "host-name": "vsmart-01",
                    "uuid": "3c5a0f1e-6d7b-4a6c-9a0b-vsmart",
                    "personality": "vsmart",
                    "reachability": "reachable"
                },
                {
                    "deviceId": "10.255.0.11",
                    "system-ip": "10.255.0.11",
                    "host-name": "rtr-a-SW1A1AA",
                    "uuid": "C1161X-8P-FGL2231A0BC",
                    "personality": "vedge",
                    "reachability": "reachable"
                },
                {
                    "deviceId": "10.255.0.12",
                    "system-ip": "10.255.0.12",
                    "host-name": "rtr-b-EC1A1BB",
                    "uuid": "C1127-8PLTEP-FGL2233B1CD",
                    "personality": "vedge",
                    "reachability": "unreachable"
                }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = Inventory::connect(&config(&server, "pw")).await.unwrap();

    let all = inventory.devices().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].role, DeviceRole::Controller);

    let edges = inventory.edge_devices().await.unwrap();
    let names: Vec<&str> = edges.iter().map(|d| d.hostname.as_str()).collect();
    assert_eq!(names, vec!["rtr-a-SW1A1AA", "rtr-b-EC1A1BB"]);
    assert_eq!(edges[0].serial, "FGL2231A0BC");
    assert!(!edges[1].reachability.is_reachable());

    inventory.close().await;
}

#[tokio::test]
async fn test_rejected_login_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = Inventory::connect(&config(&server, "wrong")).await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
}

#[tokio::test]
async fn test_inventory_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let inventory = Inventory::connect(&config(&server, "pw")).await.unwrap();
    let result = inventory.devices().await;
    assert!(matches!(result, Err(CoreError::InventoryUnavailable { .. })));
}
