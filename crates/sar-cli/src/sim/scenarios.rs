//! Demo mission scenarios for the simulator: a small search area around a
//! center point, and the flight paths a fleet of simulated drones follow
//! while that mission runs.

use super::paths::LinearPath;
use super::FlightPath;
use sar_core::{MissionId, MissionSpec, SearchArea, Waypoint};
use std::sync::Arc;
use uuid::Uuid;

/// Build a demo mission: drones transit from a home point to a square
/// search area centered on `(center_lat, center_lon)`.
pub fn demo_mission_spec(drone_ids: Vec<String>, center_lat: f64, center_lon: f64) -> MissionSpec {
    let search_altitude_m = 60.0;
    let half_extent_m = 250.0;
    let half_extent_deg = half_extent_m / 111_320.0;

    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    let waypoints = corners
        .iter()
        .map(|(dlat, dlon)| Waypoint {
            lat: center_lat + dlat * half_extent_deg,
            lon: center_lon + dlon * half_extent_deg,
            altitude_m: search_altitude_m,
        })
        .collect();

    MissionSpec {
        mission_id: MissionId(format!("demo-{}", Uuid::new_v4())),
        drone_ids: drone_ids.into_iter().map(Into::into).collect(),
        search_area: SearchArea { waypoints },
        home: Waypoint { lat: center_lat, lon: center_lon, altitude_m: 0.0 },
        transit_altitude_m: 80.0,
        low_battery_pct: None,
        critical_battery_pct: None,
    }
}

/// Build a per-drone transit flight path from a mission's home point to its
/// first search waypoint, for the simulator to walk telemetry along.
pub fn flight_paths_for_mission(spec: &MissionSpec, speed_mps: f64) -> Vec<(String, Arc<dyn FlightPath>)> {
    let Some(first_waypoint) = spec.search_area.waypoints.first() else {
        return Vec::new();
    };

    spec.drone_ids
        .iter()
        .map(|drone_id| {
            let path: Arc<dyn FlightPath> = Arc::new(LinearPath::new(
                spec.home.lat,
                spec.home.lon,
                first_waypoint.lat,
                first_waypoint.lon,
                spec.transit_altitude_m,
                speed_mps,
            ));
            (drone_id.0.clone(), path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_mission_has_four_search_waypoints() {
        let spec = demo_mission_spec(vec!["d1".into()], 33.0, -117.0);
        assert_eq!(spec.search_area.waypoints.len(), 4);
    }

    #[test]
    fn flight_paths_cover_every_drone() {
        let spec = demo_mission_spec(vec!["d1".into(), "d2".into()], 33.0, -117.0);
        let paths = flight_paths_for_mission(&spec, 10.0);
        assert_eq!(paths.len(), 2);
    }
}
