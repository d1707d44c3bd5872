//! Phase completion predicates built on sar-core's spatial math.

use sar_core::spatial::haversine_distance;
use sar_core::{Telemetry, Waypoint};

pub fn at_altitude(reading: &Telemetry, target_m: f64, tolerance_m: f64) -> bool {
    (reading.altitude_m - target_m).abs() <= tolerance_m
}

pub fn at_waypoint(reading: &Telemetry, waypoint: Waypoint, tolerance_m: f64) -> bool {
    let horizontal = haversine_distance(reading.lat, reading.lon, waypoint.lat, waypoint.lon);
    horizontal <= tolerance_m && (reading.altitude_m - waypoint.altitude_m).abs() <= tolerance_m
}

pub fn at_ground(reading: &Telemetry, ground_tolerance_m: f64) -> bool {
    reading.altitude_m <= ground_tolerance_m
}
