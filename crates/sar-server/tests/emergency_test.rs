//! Emergency command pipeline integration tests.
//!
//! Run with: cargo test --test emergency_test -- --ignored
//!
//! Requires a running coordinator. Set SAR_TEST_URL / SAR_ADMIN_TOKEN to
//! override the defaults of http://localhost:3000 / change-me-admin.

use sar_core::EmergencyKind;
use sar_sdk::DroneClient;

fn base_url() -> String {
    std::env::var("SAR_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn admin_token() -> String {
    std::env::var("SAR_ADMIN_TOKEN").unwrap_or_else(|_| "change-me-admin".to_string())
}

fn admin_client() -> DroneClient {
    let mut client = DroneClient::new(base_url());
    client.set_admin_token(Some(admin_token()));
    client
}

#[tokio::test]
#[ignore]
async fn test_emergency_status_reports_fleet_counts() {
    let mut drone = DroneClient::new(base_url());
    drone.register("EMERGENCY-TEST-001").await.unwrap();

    let client = DroneClient::new(base_url());
    let status = client.emergency_status().await.expect("status should be readable without admin auth");
    assert!(status["total_drones"].as_u64().unwrap() >= 1);
}

#[tokio::test]
#[ignore]
async fn test_emergency_requires_admin_token() {
    let unauthenticated = DroneClient::new(base_url());
    let result = unauthenticated
        .trigger_emergency(EmergencyKind::Stop, "tester".to_string(), "unauthorized probe".to_string(), false)
        .await;
    assert!(result.is_err(), "emergency trigger without an admin token should be rejected");
}

#[tokio::test]
#[ignore]
async fn test_emergency_stop_all_dispatches_to_fleet() {
    let mut drone = DroneClient::new(base_url());
    drone.register("EMERGENCY-TEST-002").await.unwrap();

    let client = admin_client();
    let outcome = client
        .trigger_emergency(EmergencyKind::Stop, "tester".to_string(), "integration test stop-all".to_string(), false)
        .await
        .expect("stop-all should succeed");
    assert!(outcome.get("outcomes").is_some() || outcome.get("dispatched").is_some() || outcome.is_object());
}

#[tokio::test]
#[ignore]
async fn test_disarm_without_confirm_is_rejected() {
    let client = admin_client();
    let result = client
        .trigger_emergency(EmergencyKind::Disarm, "tester".to_string(), "missing confirm".to_string(), false)
        .await;
    assert!(result.is_err(), "disarm without confirm=true must be rejected with a validation error");
}

#[tokio::test]
#[ignore]
async fn test_disarm_with_confirm_is_accepted() {
    let mut drone = DroneClient::new(base_url());
    drone.register("EMERGENCY-TEST-003").await.unwrap();

    let client = admin_client();
    client
        .trigger_emergency(EmergencyKind::Disarm, "tester".to_string(), "confirmed disarm".to_string(), true)
        .await
        .expect("disarm with confirm=true should succeed");
}
