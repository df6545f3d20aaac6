#![allow(clippy::unwrap_used)]
// Integration tests for `ManagerClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use edgeaudit_api::{Error, ManagerClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ManagerClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ManagerClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn secret(value: &str) -> secrecy::SecretString {
    value.to_string().into()
}

async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(token))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_captures_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .and(body_string_contains("j_username=admin"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_token(&server, "tok-123").await;

    client.login("admin", &secret("pw")).await.unwrap();
    assert!(client.has_xsrf_token());
}

#[tokio::test]
async fn test_login_rejected_returns_html() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Login</title></head></html>"),
        )
        .mount(&server)
        .await;

    let result = client.login("admin", &secret("wrong")).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.has_xsrf_token());
}

#[tokio::test]
async fn test_login_without_token_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    client.login("admin", &secret("pw")).await.unwrap();
    assert!(!client.has_xsrf_token());
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_sends_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_token(&server, "tok-abc").await;

    let envelope = json!({
        "header": { "title": "Device" },
        "data": [{
            "deviceId": "10.255.0.11",
            "system-ip": "10.255.0.11",
            "host-name": "ngn-rtr-SW1A1AA-01",
            "uuid": "C1161X-8P-FGL2231A0BC",
            "personality": "vedge",
            "device-model": "vedge-C1161X-8P",
            "reachability": "reachable",
            "site-id": "1001",
            "version": "17.9.4a"
        }]
    });

    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .and(header("X-XSRF-TOKEN", "tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    client.login("admin", &secret("pw")).await.unwrap();
    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_id, "10.255.0.11");
    assert_eq!(devices[0].host_name.as_deref(), Some("ngn-rtr-SW1A1AA-01"));
    assert_eq!(devices[0].personality.as_deref(), Some("vedge"));
    assert_eq!(devices[0].reachability.as_deref(), Some("reachable"));
    assert_eq!(devices[0].extra.get("version"), Some(&json!("17.9.4a")));
}

#[tokio::test]
async fn test_list_devices_expired_session() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_devices_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_list_devices_bad_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dataservice/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": 5}"))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    assert!(matches!(result, Err(Error::Payload { .. })));
}

#[tokio::test]
async fn test_logout() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}
