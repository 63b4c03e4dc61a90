//! OSRM route service response DTOs.
//!
//! Only the fields the route finder reads are modelled. Geometry is
//! requested as GeoJSON, whose positions are `[longitude, latitude]`.

use serde::Deserialize;

use crate::domain::Coordinate;

use super::RoutedPath;
use super::error::RoutingError;

/// Top-level response of `/route/v1/{profile}/{coordinates}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmResponse {
    /// `"Ok"` on success, otherwise an error code such as `"NoRoute"`.
    pub code: String,

    /// Human-readable detail accompanying an error code.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One alternative route.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmRoute {
    /// Metres.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    pub geometry: OsrmGeometry,
}

/// GeoJSON `LineString`.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmGeometry {
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl OsrmResponse {
    /// Take the first route, swapping positions into `(lat, lng)` order.
    ///
    /// Positions outside the valid coordinate ranges are dropped.
    pub fn into_path(self) -> Result<RoutedPath, RoutingError> {
        if self.code != "Ok" {
            return Err(RoutingError::NoRoute { code: self.code });
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::NoRoute {
                code: "Ok".to_string(),
            })?;

        let geometry = route
            .geometry
            .coordinates
            .into_iter()
            .filter_map(|[lng, lat]| Coordinate::new(lat, lng).ok())
            .collect();

        Ok(RoutedPath {
            distance_m: route.distance.max(0.0),
            duration_s: route.duration.max(0.0),
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1234.5,
                "duration": 890.1,
                "weight": 890.1,
                "geometry": {"type": "LineString", "coordinates": [[85.3145, 27.7041], [85.3157, 27.7087]]}
            }],
            "waypoints": []
        }"#;

        let response: OsrmResponse = serde_json::from_str(json).unwrap();
        let path = response.into_path().unwrap();

        assert_eq!(path.distance_m, 1234.5);
        assert_eq!(path.duration_s, 890.1);
        assert_eq!(path.geometry.len(), 2);
        assert_eq!(path.geometry[0].lat, 27.7041);
        assert_eq!(path.geometry[0].lng, 85.3145);
    }

    #[test]
    fn error_code_is_no_route() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let response: OsrmResponse = serde_json::from_str(json).unwrap();

        match response.into_path() {
            Err(RoutingError::NoRoute { code }) => assert_eq!(code, "NoRoute"),
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn empty_routes_is_no_route() {
        let response: OsrmResponse = serde_json::from_str(r#"{"code": "Ok", "routes": []}"#).unwrap();
        assert!(matches!(response.into_path(), Err(RoutingError::NoRoute { .. })));
    }

    #[test]
    fn invalid_positions_dropped() {
        let json = r#"{"code": "Ok", "routes": [{"distance": 1, "duration": 1,
            "geometry": {"coordinates": [[85.3, 27.7], [85.3, 127.7]]}}]}"#;
        let response: OsrmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_path().unwrap().geometry.len(), 1);
    }
}
