//! Integration tests for `SmsClient::send`.

use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carehq_booking::config::SmsConfig;
use carehq_booking::sms::{SmsClient, SmsError, SmsMessage};

fn client(server: &MockServer) -> SmsClient {
    SmsClient::new(SmsConfig {
        endpoint: format!("{}/api/sms", server.uri()),
        timeout: Duration::from_secs(5),
    })
        .expect("failed to build test SmsClient")
}

fn message() -> SmsMessage {
    SmsMessage::new("+353 87 123 4567", "Your appointment is at 18:15").unwrap()
}

#[tokio::test]
async fn sends_cleaned_number_and_returns_sid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .and(body_json(json!({"to": "+353871234567", "message": "Your appointment is at 18:15"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sid": "SM123"})))
        .expect(1)
        .mount(&server)
        .await;

    let sid = client(&server).send(&message()).await.unwrap();
    assert_eq!(sid.as_deref(), Some("SM123"));
}

#[tokio::test]
async fn missing_sid_is_still_a_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .mount(&server)
        .await;

    assert_eq!(client(&server).send(&message()).await.unwrap(), None);
}

#[tokio::test]
async fn server_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Number is blacklisted"})))
        .mount(&server)
        .await;

    let err = client(&server).send(&message()).await.unwrap_err();
    assert!(matches!(err, SmsError::Server { status: 400, .. }), "{err}");
    assert_eq!(err.to_string(), "Number is blacklisted");
}

#[tokio::test]
async fn bare_server_error_reports_its_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sms"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).send(&message()).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 500");
}

#[tokio::test]
async fn default_config_builds_a_client() {
    assert!(SmsClient::new(SmsConfig::default()).is_ok());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = SmsClient::new(SmsConfig {
        endpoint: format!("http://{addr}/api/sms"),
        timeout: Duration::from_secs(5),
    })
        .unwrap();

    let err = client.send(&message()).await.unwrap_err();
    assert!(matches!(err, SmsError::Network(_)), "{err:?}");
    assert_eq!(err.to_string(), "Network error. Please check your connection.");
}
