//! Telemetry construction helpers.

use crate::DroneClient;
use anyhow::Result;
use chrono::Utc;
use sar_core::Telemetry;

impl DroneClient {
    /// Build and send a `Telemetry` reading from raw position/velocity
    /// fields. `battery_pct` is in `[0, 100]`.
    pub async fn send_position(
        &self,
        lat: f64,
        lon: f64,
        altitude_m: f64,
        heading_deg: f64,
        speed_mps: f64,
        battery_pct: f64,
    ) -> Result<()> {
        let drone_id = self
            .drone_id()
            .ok_or_else(|| anyhow::anyhow!("not registered"))?;

        let telemetry = Telemetry {
            drone_id: drone_id.into(),
            lat,
            lon,
            altitude_m,
            heading_deg,
            speed_mps,
            battery_pct,
            timestamp: Utc::now(),
        };

        self.send_telemetry(&telemetry).await
    }
}
