//! AI monitor decision log integration tests: a drone reporting low/critical
//! battery should surface a `DecisionRecord` on `/v1/decisions` within a few
//! monitor ticks.
//!
//! Run with: cargo test --test decisions_test -- --ignored
//!
//! Requires a running coordinator. Set SAR_TEST_URL to override the default
//! of http://localhost:3000.

use chrono::Utc;
use sar_core::DroneId;
use sar_sdk::DroneClient;
use std::time::Duration;
use tokio::time::sleep;

fn base_url() -> String {
    std::env::var("SAR_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[tokio::test]
#[ignore]
async fn test_low_battery_raises_decision() {
    let mut drone = DroneClient::new(base_url());
    drone.register("DECISION-TEST-001").await.unwrap();

    drone
        .send_telemetry(&sar_core::Telemetry {
            drone_id: DroneId("DECISION-TEST-001".to_string()),
            lat: 33.6845,
            lon: -117.8265,
            altitude_m: 80.0,
            heading_deg: 0.0,
            speed_mps: 0.0,
            battery_pct: 18.0,
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    sleep(Duration::from_secs(5)).await;

    let decisions = drone.list_decisions(50).await.expect("decisions should be readable without admin auth");
    let found = decisions
        .iter()
        .any(|d| d.drone_id.as_ref().map(|id| id.0.as_str()) == Some("DECISION-TEST-001"));
    assert!(found, "low battery telemetry should raise an ai_monitor decision for this drone");
}
