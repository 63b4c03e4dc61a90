//! Locations: bus stops and landmarks.

use serde::{Deserialize, Serialize};

use super::{Coordinate, LocationId};

/// What kind of place a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    /// A bus stop; becomes a graph node when an approved route serves it.
    Stop,
    /// A point of interest, usually not on any route.
    Landmark,
}

/// An approved location, as seen by the route finder.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub coord: Coordinate,
    pub kind: LocationKind,
}

impl Location {
    /// Create a new location.
    pub fn new(id: LocationId, name: impl Into<String>, coord: Coordinate, kind: LocationKind) -> Self {
        Self {
            id,
            name: name.into(),
            coord,
            kind,
        }
    }

    /// Returns true if this location is a bus stop.
    pub fn is_stop(&self) -> bool {
        self.kind == LocationKind::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&LocationKind::Landmark).unwrap(),
            "\"landmark\""
        );
        let kind: LocationKind = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(kind, LocationKind::Stop);
    }

    #[test]
    fn is_stop() {
        let loc = Location::new(
            LocationId::new(1).unwrap(),
            "Ratnapark",
            Coordinate::new(27.7041, 85.3145).unwrap(),
            LocationKind::Stop,
        );
        assert!(loc.is_stop());
    }
}
