//! HTTP client for drone-side and operator-side integration with the
//! fleet coordinator's REST surface.

use anyhow::Result;
use sar_core::{DecisionRecord, DroneRecord, EmergencyKind, MissionId, MissionSpec, MissionState, Telemetry};
use serde::Serialize;

async fn parse_json_or_error<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        anyhow::bail!("request failed ({}): {}", status, body);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Client for the fleet coordinator's `/v1` REST surface.
///
/// Telemetry ingress and drone registration are unauthenticated; mission
/// mutation and `/emergency/*` require an admin bearer token (see
/// `set_admin_token`).
pub struct DroneClient {
    pub(crate) base_url: String,
    pub(crate) drone_id: Option<String>,
    pub(crate) admin_token: Option<String>,
    pub(crate) client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct RegisterRequest {
    drone_id: String,
}

impl DroneClient {
    /// Create a new client against the coordinator's base URL, e.g.
    /// `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            drone_id: None,
            admin_token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Set the admin bearer token used for mission-mutation and emergency
    /// endpoints.
    pub fn set_admin_token(&mut self, token: Option<String>) {
        self.admin_token = token;
    }

    fn with_admin_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.admin_token.as_deref() {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Get the drone ID this client last registered as.
    pub fn drone_id(&self) -> Option<&str> {
        self.drone_id.as_deref()
    }

    /// Register a drone with the coordinator.
    pub async fn register(&mut self, drone_id: impl Into<String>) -> Result<()> {
        let drone_id = drone_id.into();
        let url = format!("{}/v1/drones/register", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RegisterRequest { drone_id: drone_id.clone() })
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("registration failed: {}", response.status());
        }
        self.drone_id = Some(drone_id);
        Ok(())
    }

    /// Push a telemetry reading to the coordinator.
    pub async fn send_telemetry(&self, telemetry: &Telemetry) -> Result<()> {
        let url = format!("{}/v1/telemetry", self.base_url);
        let response = self.client.post(&url).json(telemetry).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("failed to send telemetry: {}", response.status());
        }
        Ok(())
    }

    /// Fetch the drone registry snapshot.
    pub async fn list_drones(&self) -> Result<Vec<DroneRecord>> {
        let url = format!("{}/v1/drones", self.base_url);
        parse_json_or_error(self.client.get(&url).send().await?).await
    }

    /// Submit a new mission.
    pub async fn submit_mission(&self, spec: &MissionSpec) -> Result<serde_json::Value> {
        let url = format!("{}/v1/missions", self.base_url);
        let builder = self.with_admin_auth(self.client.post(&url).json(spec));
        parse_json_or_error(builder.send().await?).await
    }

    /// Fetch current state for a mission.
    pub async fn get_mission(&self, mission_id: &MissionId) -> Result<MissionState> {
        let url = format!("{}/v1/missions/{}", self.base_url, mission_id.0);
        parse_json_or_error(self.client.get(&url).send().await?).await
    }

    /// List all missions.
    pub async fn list_missions(&self) -> Result<Vec<MissionState>> {
        let url = format!("{}/v1/missions", self.base_url);
        parse_json_or_error(self.client.get(&url).send().await?).await
    }

    /// Request a graceful abort of a mission.
    pub async fn abort_mission(&self, mission_id: &MissionId, reason: impl Into<String>) -> Result<()> {
        let url = format!("{}/v1/missions/{}/abort", self.base_url, mission_id.0);
        let builder = self
            .with_admin_auth(self.client.post(&url))
            .json(&serde_json::json!({ "reason": reason.into() }));
        let response = builder.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("abort failed: {}", response.status());
        }
        Ok(())
    }

    /// Pause a mission.
    pub async fn pause_mission(&self, mission_id: &MissionId) -> Result<()> {
        let url = format!("{}/v1/missions/{}/pause", self.base_url, mission_id.0);
        let response = self.with_admin_auth(self.client.post(&url)).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("pause failed: {}", response.status());
        }
        Ok(())
    }

    /// Resume a paused mission.
    pub async fn resume_mission(&self, mission_id: &MissionId) -> Result<()> {
        let url = format!("{}/v1/missions/{}/resume", self.base_url, mission_id.0);
        let response = self.with_admin_auth(self.client.post(&url)).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("resume failed: {}", response.status());
        }
        Ok(())
    }

    /// Trigger a fleet-wide emergency intent. `kind` selects stop/RTL/disarm;
    /// `confirm` must be `true` for `EmergencyKind::Disarm`.
    pub async fn trigger_emergency(
        &self,
        kind: EmergencyKind,
        operator_id: impl Into<String>,
        reason: impl Into<String>,
        confirm: bool,
    ) -> Result<serde_json::Value> {
        let path = match kind {
            EmergencyKind::Stop => "stop-all",
            EmergencyKind::Rtl => "rtl",
            EmergencyKind::Land => "land",
            EmergencyKind::Disarm => "kill",
        };
        let url = format!("{}/v1/emergency/{path}", self.base_url);
        let body = serde_json::json!({
            "operator_id": operator_id.into(),
            "reason": reason.into(),
            "confirm": confirm,
        });
        let builder = self.with_admin_auth(self.client.post(&url).json(&body));
        parse_json_or_error(builder.send().await?).await
    }

    /// Fetch connected-drone / active-mission counts.
    pub async fn emergency_status(&self) -> Result<serde_json::Value> {
        let url = format!("{}/v1/emergency/status", self.base_url);
        parse_json_or_error(self.client.get(&url).send().await?).await
    }

    /// Fetch the most recent AI monitor decisions.
    pub async fn list_decisions(&self, limit: usize) -> Result<Vec<DecisionRecord>> {
        let url = format!("{}/v1/decisions?limit={limit}", self.base_url);
        parse_json_or_error(self.client.get(&url).send().await?).await
    }

    /// Open a `/ws` real-time stream connection.
    pub async fn connect_stream(&self) -> Result<crate::stream::FleetStream> {
        crate::stream::FleetStream::connect(&self.base_url).await
    }
}
