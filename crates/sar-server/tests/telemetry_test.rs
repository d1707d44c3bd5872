//! Drone registration and telemetry ingest integration tests.
//!
//! Run with: cargo test --test telemetry_test -- --ignored
//!
//! Requires a running coordinator. Set SAR_TEST_URL to override the default
//! of http://localhost:3000.

use chrono::Utc;
use reqwest::Client;
use sar_core::{DroneId, Telemetry};

fn base_url() -> String {
    std::env::var("SAR_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn make_telemetry(drone_id: &str, lat: f64, lon: f64, altitude_m: f64) -> Telemetry {
    Telemetry {
        drone_id: DroneId(drone_id.to_string()),
        lat,
        lon,
        altitude_m,
        heading_deg: 0.0,
        speed_mps: 0.0,
        battery_pct: 95.0,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
#[ignore]
async fn test_register_and_send_telemetry() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .post(format!("{base}/v1/drones/register"))
        .json(&serde_json::json!({"drone_id": "TEST-TEL-001"}))
        .send()
        .await
        .expect("failed to register");
    assert!(resp.status().is_success());

    let telem = make_telemetry("TEST-TEL-001", 33.6845, -117.8265, 100.0);
    let resp = client
        .post(format!("{base}/v1/telemetry"))
        .json(&telem)
        .send()
        .await
        .expect("failed to send telemetry");
    assert!(resp.status().is_success());

    let resp = client.get(format!("{base}/v1/drones")).send().await.unwrap();
    let drones: Vec<serde_json::Value> = resp.json().await.unwrap();
    let found = drones.iter().any(|d| d["drone_id"].as_str() == Some("TEST-TEL-001"));
    assert!(found, "drone should appear in list after telemetry");
}

#[tokio::test]
#[ignore]
async fn test_telemetry_updates_position() {
    let client = Client::new();
    let base = base_url();

    client
        .post(format!("{base}/v1/drones/register"))
        .json(&serde_json::json!({"drone_id": "TEST-TEL-002"}))
        .send()
        .await
        .unwrap();

    let telem1 = make_telemetry("TEST-TEL-002", 33.6845, -117.8265, 100.0);
    client.post(format!("{base}/v1/telemetry")).json(&telem1).send().await.unwrap();

    let resp = client.get(format!("{base}/v1/drones")).send().await.unwrap();
    let drones: Vec<serde_json::Value> = resp.json().await.unwrap();
    let drone = drones.iter().find(|d| d["drone_id"].as_str() == Some("TEST-TEL-002")).unwrap();
    assert!((drone["last_telemetry"]["lat"].as_f64().unwrap() - 33.6845).abs() < 0.0001);

    let telem2 = make_telemetry("TEST-TEL-002", 33.6900, -117.8200, 150.0);
    client.post(format!("{base}/v1/telemetry")).json(&telem2).send().await.unwrap();

    let resp = client.get(format!("{base}/v1/drones")).send().await.unwrap();
    let drones: Vec<serde_json::Value> = resp.json().await.unwrap();
    let drone = drones.iter().find(|d| d["drone_id"].as_str() == Some("TEST-TEL-002")).unwrap();
    assert!((drone["last_telemetry"]["lat"].as_f64().unwrap() - 33.6900).abs() < 0.0001);
    assert!((drone["last_telemetry"]["altitude_m"].as_f64().unwrap() - 150.0).abs() < 0.1);
}
