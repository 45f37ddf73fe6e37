#![allow(clippy::unwrap_used)]
// Integration tests for `HomeApiClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smartdevice_api::{ControlRequest, Credentials, Error, HomeApiClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HomeApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    let creds = Credentials::ApiKey {
        key: "test-key".to_string().into(),
    };
    let client = HomeApiClient::with_client(reqwest::Client::new(), base_url, &creds);
    (server, client)
}

async fn setup_password_account() -> (MockServer, HomeApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1/", server.uri())).unwrap();
    let creds = Credentials::Password {
        username: "me@example.com".into(),
        password: "pw".to_string().into(),
    };
    let client = HomeApiClient::with_client(reqwest::Client::new(), base_url, &creds);
    (server, client)
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices_sends_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .and(header("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "deviceId": "A",
                "deviceName": "CBNbsd 576i",
                "imageUrl": "https://img.example.com/a.png",
                "nickname": "Kitchen",
                "deviceType": "COMBI",
                "capabilities": ["TEMPERATURE"],
                "connected": true
            },
            {
                "deviceId": "B",
                "deviceName": "WPbli 5231",
                "deviceType": "WINE"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].device_id, "A");
    assert_eq!(devices[0].nickname.as_deref(), Some("Kitchen"));
    assert_eq!(devices[0].connected, Some(true));
    assert_eq!(devices[1].nickname, None);
    assert_eq!(devices[1].image_url, None);
}

#[tokio::test]
async fn test_bearer_token_header() {
    let (server, client) = setup_password_account().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.set_token("tok-1".to_string().into());
    let devices = client.list_devices().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_password_account_without_token_makes_no_request() {
    let (server, client) = setup_password_account().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::MissingToken));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_unauthorized_maps_to_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized), "got: {err:?}");
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_server_error_carries_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    match err {
        Error::Api {
            status,
            ref message,
        } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        ref other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Controls ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_controls() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/A/controls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "type": "TemperatureControl",
                "name": "temperature",
                "zoneId": 0,
                "zonePosition": "top",
                "value": 5,
                "target": 5,
                "min": 2,
                "max": 9,
                "unit": "°C"
            },
            {
                "type": "ToggleControl",
                "name": "supercool",
                "zoneId": 0,
                "value": false
            },
            {
                "type": "BioFreshPlusControl",
                "name": "biofreshplus",
                "currentMode": "ZERO_ZERO",
                "supportedModes": ["ZERO_ZERO", "ZERO_MINUS_TWO"]
            }
        ])))
        .mount(&server)
        .await;

    let controls = client.list_controls("A").await.unwrap();

    assert_eq!(controls.len(), 3);
    assert_eq!(controls[0].control_type, "TemperatureControl");
    assert_eq!(controls[0].target, Some(5.0));
    assert_eq!(controls[0].zone_position.as_deref(), Some("top"));
    assert_eq!(controls[1].value, Some(json!(false)));
    assert_eq!(controls[2].supported_modes.len(), 2);
}

#[tokio::test]
async fn test_set_temperature_posts_vendor_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/A/controls/temperature"))
        .and(header("api-key", "test-key"))
        .and(body_json(json!({ "zoneId": 0, "target": 4, "unit": "°C" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_control(
            "A",
            "temperature",
            &ControlRequest::Temperature {
                zone_id: Some(0),
                target: 4,
                unit: "°C".into(),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_control_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/devices/A/controls/supercool"))
        .respond_with(ResponseTemplate::new(422).set_body_string("zone not supported"))
        .mount(&server)
        .await;

    let err = client
        .set_control(
            "A",
            "supercool",
            &ControlRequest::Toggle {
                zone_id: Some(3),
                value: true,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { status: 422, .. }), "got: {err:?}");
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_notifications() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "notificationId": "n1",
                "deviceId": "A",
                "notificationType": "door_alarm",
                "createdAt": "2026-01-15T08:30:00Z",
                "isAcknowledged": false
            },
            {
                "notificationId": "n2",
                "deviceId": "B",
                "notificationType": "air_filter_reminder",
                "isAcknowledged": true
            }
        ])))
        .mount(&server)
        .await;

    let notifications = client.list_notifications().await.unwrap();

    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].notification_type, "door_alarm");
    assert!(notifications[0].created_at.is_some());
    assert!(notifications[1].is_acknowledged);
}

#[tokio::test]
async fn test_acknowledge_notification_patches() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/notifications/A/n1"))
        .and(body_json(json!({ "isAcknowledged": true })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.acknowledge_notification("A", "n1").await.unwrap();
}
