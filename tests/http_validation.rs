use license_sentinel::{
    LicenseConfig, LicenseManager, LicenseValidator, SentinelConfig, TerminationHandler,
    ValidationResult,
};
use serde_json::json;
use std::io::Read;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────

fn license() -> LicenseConfig {
    LicenseConfig::new("test-app", "test-license-key", "test-org-id").unwrap()
}

fn options(server: &MockServer, retry_count: u32) -> SentinelConfig {
    SentinelConfig {
        base_url: server.uri(),
        timeout: Duration::from_millis(500),
        retry_count,
        retry_delay: Duration::from_millis(10),
        ..Default::default()
    }
}

fn validator(server: &MockServer, retry_count: u32) -> LicenseValidator {
    LicenseValidator::new(license(), options(server, retry_count)).unwrap()
}

fn validate_endpoint() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path("/licenses/validate"))
}

fn ok_body(valid: bool, days: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "valid": valid,
        "expiryDaysLeft": days,
        "activeGracePeriod": false,
        "isTrial": false
    }))
}

fn optimistic() -> ValidationResult {
    ValidationResult {
        valid: true,
        expiry_days_left: Some(7),
        active_grace_period: false,
        is_trial: false,
    }
}

fn hard_invalid() -> ValidationResult {
    ValidationResult {
        valid: false,
        expiry_days_left: Some(0),
        active_grace_period: false,
        is_trial: false,
    }
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap_or_default().len()
}

// ── Request shape ───────────────────────────────────────────────

#[tokio::test]
async fn sends_key_fingerprint_and_org_header() {
    let server = MockServer::start().await;
    let license = license();

    validate_endpoint()
        .and(header("x-api-key", "test-org-id"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "licenseKey": "test-license-key",
            "fingerprint": license.fingerprint()
        })))
        .respond_with(ok_body(true, 30))
        .expect(1)
        .mount(&server)
        .await;

    let result = validator(&server, 0).validate().await.unwrap();
    assert!(result.valid);
    assert_eq!(result.expiry_days_left, Some(30));
}

// ── Cache-aside ─────────────────────────────────────────────────

#[tokio::test]
async fn second_validation_served_from_cache() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ok_body(true, 30))
        .expect(1)
        .mount(&server)
        .await;

    let validator = validator(&server, 0);
    let first = validator.validate().await.unwrap();
    let second = validator.validate().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_answer_is_not_cached() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ok_body(false, 0))
        .expect(2)
        .mount(&server)
        .await;

    let validator = validator(&server, 0);
    assert!(!validator.validate().await.unwrap().valid);
    assert!(!validator.validate().await.unwrap().valid);
}

// ── Retry and fallback ──────────────────────────────────────────

#[tokio::test]
async fn recovers_after_transient_server_errors() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    validate_endpoint()
        .respond_with(ok_body(true, 30))
        .mount(&server)
        .await;

    let result = validator(&server, 3).validate().await.unwrap();

    assert!(result.valid);
    assert_eq!(result.expiry_days_left, Some(30));
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn persistent_outage_fails_open() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = validator(&server, 2).validate().await.unwrap();

    assert_eq!(result, optimistic());
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn rejected_key_fails_closed_without_retry() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = validator(&server, 3).validate().await.unwrap();

    assert_eq!(result, hard_invalid());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn too_many_requests_is_retried() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    validate_endpoint()
        .respond_with(ok_body(true, 12))
        .mount(&server)
        .await;

    let result = validator(&server, 1).validate().await.unwrap();

    assert_eq!(result.expiry_days_left, Some(12));
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn malformed_payload_treated_as_outage() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": "yes"})))
        .mount(&server)
        .await;

    let result = validator(&server, 0).validate().await.unwrap();
    assert_eq!(result, optimistic());
}

#[tokio::test]
async fn non_json_payload_treated_as_outage() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = validator(&server, 0).validate().await.unwrap();
    assert_eq!(result, optimistic());
}

#[tokio::test]
async fn slow_authority_times_out_and_fails_open() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ok_body(true, 30).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let result = validator(&server, 0).validate().await.unwrap();
    assert_eq!(result, optimistic());
}

/// Accept one connection, read the request, then close without replying.
fn hang_up_once() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut socket, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn dropped_connection_fails_open() {
    let options = SentinelConfig {
        base_url: hang_up_once(),
        timeout: Duration::from_secs(2),
        retry_count: 0,
        ..Default::default()
    };
    let validator = LicenseValidator::new(license(), options).unwrap();

    let result = validator.validate().await.unwrap();
    assert_eq!(result, optimistic());
}

// ── Manager lifecycle ───────────────────────────────────────────

fn recorder() -> (Arc<dyn TerminationHandler>, Arc<Mutex<Vec<String>>>) {
    let reasons = Arc::new(Mutex::new(Vec::new()));
    let sink = reasons.clone();
    let handler: Arc<dyn TerminationHandler> =
        Arc::new(move |reason: &str| sink.lock().unwrap().push(reason.to_string()));
    (handler, reasons)
}

#[tokio::test]
async fn manager_initializes_against_authority() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ok_body(true, 90))
        .expect(1)
        .mount(&server)
        .await;

    let (handler, reasons) = recorder();
    let manager = LicenseManager::new(license(), options(&server, 0))
        .unwrap()
        .with_termination_handler(handler);

    manager.initialize().await.unwrap();
    let result = manager.validate().await.unwrap();

    assert!(result.valid);
    assert!(manager.is_refresh_active());
    assert!(reasons.lock().unwrap().is_empty());

    manager.shutdown();
    assert!(!manager.is_refresh_active());
}

#[tokio::test]
async fn manager_terminates_on_rejected_key() {
    let server = MockServer::start().await;
    validate_endpoint()
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (handler, reasons) = recorder();
    let manager = LicenseManager::new(license(), options(&server, 0))
        .unwrap()
        .with_termination_handler(handler);

    assert!(manager.initialize().await.is_err());
    assert!(!manager.is_initialized());
    assert_eq!(reasons.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dropped_connection_does_not_terminate_manager() {
    let options = SentinelConfig {
        base_url: hang_up_once(),
        timeout: Duration::from_secs(2),
        retry_count: 0,
        ..Default::default()
    };
    let (handler, reasons) = recorder();
    let manager = LicenseManager::new(license(), options)
        .unwrap()
        .with_termination_handler(handler);

    // Startup hits the hang-up; the re-check finds the listener gone.
    manager.initialize().await.unwrap();
    let result = manager.validate().await.unwrap();

    assert_eq!(result, optimistic());
    assert!(reasons.lock().unwrap().is_empty());
    manager.shutdown();
}
