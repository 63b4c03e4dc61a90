//! Routes: ordered stop sequences served by buses.

use super::{LocationId, RouteId};

/// One entry of a route's stop list.
///
/// Stored lists carry an explicit `index`; insertion order is not
/// meaningful and must not be relied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopEntry {
    pub index: i64,
    pub location: LocationId,
}

/// An approved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    /// Stop entries as stored, not yet ordered.
    pub stops: Vec<StopEntry>,
}

impl Route {
    /// Create a new route.
    pub fn new(id: RouteId, name: impl Into<String>, stops: Vec<StopEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            stops,
        }
    }

    /// Create a route whose stops are already in travel order.
    pub fn from_ordered(id: RouteId, name: impl Into<String>, stops: &[LocationId]) -> Self {
        let stops = stops
            .iter()
            .enumerate()
            .map(|(i, &location)| StopEntry {
                index: i as i64,
                location,
            })
            .collect();
        Self::new(id, name, stops)
    }

    /// Returns the stop ids sorted by their explicit index.
    ///
    /// The sort is stable, so entries sharing an index keep their
    /// stored relative order.
    pub fn ordered_stops(&self) -> Vec<LocationId> {
        let mut entries = self.stops.clone();
        entries.sort_by_key(|e| e.index);
        entries.into_iter().map(|e| e.location).collect()
    }
}
