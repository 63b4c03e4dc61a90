//! Geographic coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Mean earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 point in degrees.
///
/// Always `(latitude, longitude)` order. Providers that speak
/// `(longitude, latitude)` convert at their boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Construct a coordinate, rejecting values outside the valid ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinate(format!(
                "latitude {lat} out of range"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::InvalidCoordinate(format!(
                "longitude {lng} out of range"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Haversine distance to another point, in kilometres.
    ///
    /// Spherical earth; accurate to well under a percent at city scale.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

        // Clamp guards against a > 1 from rounding on antipodal points
        let c = 2.0 * a.sqrt().min(1.0).atan2((1.0 - a).max(0.0).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Haversine distance in whole metres.
    pub fn distance_m(&self, other: &Coordinate) -> u32 {
        (self.distance_km(other) * 1000.0).round() as u32
    }

    /// Coordinates at micro-degree precision, for use as a hash key.
    pub fn micro_degrees(&self) -> (i64, i64) {
        (
            (self.lat * 1_000_000.0).round() as i64,
            (self.lng * 1_000_000.0).round() as i64,
        )
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn zero_distance_to_self() {
        let p = coord(27.7172, 85.3240);
        assert_eq!(p.distance_km(&p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        // 2πR / 360
        let d = coord(0.0, 0.0).distance_km(&coord(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn known_city_distance() {
        // Ratnapark to Kalanki, about 3.4 km as the crow flies
        let ratnapark = coord(27.7041, 85.3145);
        let kalanki = coord(27.6933, 85.2817);
        let d = ratnapark.distance_km(&kalanki);
        assert!(d > 3.0 && d < 4.0, "got {d}");
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn distance_m_rounds() {
        let a = coord(27.7000, 85.3000);
        let b = coord(27.7018, 85.3000);
        assert_eq!(a.distance_m(&b), 200);
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.2346, 3), 1.235);
    }
}
