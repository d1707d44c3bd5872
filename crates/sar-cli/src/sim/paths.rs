//! Flight path implementations for the demo simulator.

use sar_core::spatial::{bearing, haversine_distance, offset_position};
use std::f64::consts::PI;

/// Offset a position by a distance and true bearing (radians, 0 = north).
fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    let north_m = distance_m * bearing_rad.cos();
    let east_m = distance_m * bearing_rad.sin();
    offset_position(lat, lon, north_m, east_m)
}

/// Trait for flight path implementations.
pub trait FlightPath: Send + Sync {
    /// Get (lat, lon, altitude_m) at time t seconds from start.
    fn get_position(&self, t: f64) -> (f64, f64, f64);

    /// Get approximate heading at time t (degrees, 0 = North).
    fn get_heading(&self, t: f64) -> f64 {
        let dt = 0.1;
        let (lat1, lon1, _) = self.get_position(t);
        let (lat2, lon2, _) = self.get_position(t + dt);

        if (lat2 - lat1).abs() < 1e-10 && (lon2 - lon1).abs() < 1e-10 {
            return 0.0;
        }

        let heading_deg = bearing(lat1, lon1, lat2, lon2).to_degrees();
        if heading_deg < 0.0 {
            heading_deg + 360.0
        } else {
            heading_deg
        }
    }

    /// Get speed in meters per second.
    fn get_speed_mps(&self) -> f64;
}

/// Circular flight path around a center point, used to simulate a search
/// pattern over a mission's search area.
pub struct CircularPath {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_m: f64,
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub start_angle: f64,
    pub clockwise: bool,
    period: f64,
}

impl CircularPath {
    pub fn new(
        center_lat: f64,
        center_lon: f64,
        radius_m: f64,
        altitude_m: f64,
        speed_mps: f64,
        start_angle: f64,
        clockwise: bool,
    ) -> Self {
        let circumference = 2.0 * PI * radius_m;
        let period = circumference / speed_mps;

        Self {
            center_lat,
            center_lon,
            radius_m,
            altitude_m,
            speed_mps,
            start_angle,
            clockwise,
            period,
        }
    }
}

impl FlightPath for CircularPath {
    fn get_position(&self, t: f64) -> (f64, f64, f64) {
        let mut angle_rad = self.start_angle + (2.0 * PI * t / self.period);
        if self.clockwise {
            angle_rad = -angle_rad;
        }

        let (lat, lon) = offset_by_bearing(self.center_lat, self.center_lon, self.radius_m, angle_rad);
        (lat, lon, self.altitude_m)
    }

    fn get_speed_mps(&self) -> f64 {
        self.speed_mps
    }
}

/// Linear flight path between two waypoints, used for transit/return legs.
pub struct LinearPath {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub altitude_m: f64,
    pub speed_mps: f64,
    pub distance_m: f64,
    pub duration: f64,
    heading_deg: f64,
    heading_rad: f64,
}

impl LinearPath {
    pub fn new(start_lat: f64, start_lon: f64, end_lat: f64, end_lon: f64, altitude_m: f64, speed_mps: f64) -> Self {
        let distance_m = haversine_distance(start_lat, start_lon, end_lat, end_lon);
        let duration = if speed_mps > 0.0 { distance_m / speed_mps } else { 0.0 };

        let heading_rad = bearing(start_lat, start_lon, end_lat, end_lon);
        let mut heading_deg = heading_rad.to_degrees();
        if heading_deg < 0.0 {
            heading_deg += 360.0;
        }

        Self {
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            altitude_m,
            speed_mps,
            distance_m,
            duration,
            heading_deg,
            heading_rad,
        }
    }
}

impl FlightPath for LinearPath {
    fn get_position(&self, t: f64) -> (f64, f64, f64) {
        let progress = if self.duration > 0.0 { (t / self.duration).clamp(0.0, 1.0) } else { 0.0 };
        let distance = self.distance_m * progress;
        let (lat, lon) = offset_by_bearing(self.start_lat, self.start_lon, distance, self.heading_rad);
        (lat, lon, self.altitude_m)
    }

    fn get_heading(&self, _t: f64) -> f64 {
        self.heading_deg
    }

    fn get_speed_mps(&self) -> f64 {
        self.speed_mps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_path_start_position() {
        let path = LinearPath::new(33.0, -117.0, 34.0, -118.0, 50.0, 10.0);
        let (lat, lon, alt) = path.get_position(0.0);

        assert!((lat - 33.0).abs() < 0.0001);
        assert!((lon - (-117.0)).abs() < 0.0001);
        assert!((alt - 50.0).abs() < 0.01);
    }

    #[test]
    fn linear_path_end_position() {
        let path = LinearPath::new(33.0, -117.0, 34.0, -118.0, 50.0, 10.0);
        let (lat, lon, _) = path.get_position(path.duration + 100.0);

        assert!((lat - 34.0).abs() < 0.0001);
        assert!((lon - (-118.0)).abs() < 0.0001);
    }

    #[test]
    fn circular_path_returns_to_start_after_one_period() {
        let path = CircularPath::new(33.0, -117.0, 200.0, 50.0, 10.0, 0.0, false);

        let (lat1, lon1, _) = path.get_position(0.0);
        let (lat2, lon2, _) = path.get_position(path.period);

        assert!((lat1 - lat2).abs() < 0.0001);
        assert!((lon1 - lon2).abs() < 0.0001);
    }
}
