//! Transit network graph.
//!
//! Nodes are approved locations; edges join consecutive stops of each
//! approved route in both directions, weighted by great-circle distance.
//! The graph is rebuilt for every search and never shared between
//! requests.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{Location, LocationId, Route, RouteId, round_to};

/// A directed edge between two adjacent stops of one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: LocationId,
    /// Haversine distance in kilometres, never negative.
    pub weight_km: f64,
    pub route: RouteId,
}

/// Per-route facts gathered while building the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub name: String,
    /// Sum of the route's edge weights, rounded to 3 decimals.
    pub total_distance_km: f64,
    /// Resolved stops in travel order. Empty for routes that were skipped.
    pub stops: Vec<LocationId>,
}

/// Adjacency lists plus the lookup tables the rest of a search needs.
#[derive(Debug, Clone, Default)]
pub struct TransitGraph {
    adjacency: HashMap<LocationId, Vec<Edge>>,
    locations: HashMap<LocationId, Location>,
    routes: HashMap<RouteId, RouteInfo>,
}

impl TransitGraph {
    /// Build the graph from approved locations and routes.
    ///
    /// Stop entries are ordered by their explicit index. Entries naming a
    /// location not in `locations` are dropped. A route left with fewer
    /// than two stops contributes no edges and is recorded with zero
    /// distance.
    pub fn build(locations: &[Location], routes: &[Route]) -> Self {
        let mut graph = Self {
            adjacency: HashMap::new(),
            locations: locations.iter().map(|l| (l.id, l.clone())).collect(),
            routes: HashMap::with_capacity(routes.len()),
        };

        for route in routes {
            let ordered = route.ordered_stops();
            let stops: Vec<LocationId> = ordered
                .iter()
                .copied()
                .filter(|id| graph.locations.contains_key(id))
                .collect();

            if stops.len() < ordered.len() {
                warn!(
                    route_id = %route.id,
                    dropped = ordered.len() - stops.len(),
                    "route references unknown or unapproved locations"
                );
            }

            if stops.len() < 2 {
                warn!(route_id = %route.id, stops = stops.len(), "route has fewer than two stops, skipping");
                graph.routes.insert(
                    route.id,
                    RouteInfo {
                        name: route.name.clone(),
                        total_distance_km: 0.0,
                        stops: Vec::new(),
                    },
                );
                continue;
            }

            let mut total = 0.0;
            for pair in stops.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let weight = match (graph.locations.get(&a), graph.locations.get(&b)) {
                    (Some(from), Some(to)) => from.coord.distance_km(&to.coord),
                    _ => continue,
                };
                graph.connect(a, b, weight, route.id);
                total += weight;
            }

            graph.routes.insert(
                route.id,
                RouteInfo {
                    name: route.name.clone(),
                    total_distance_km: round_to(total, 3),
                    stops,
                },
            );
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            routes = graph.routes.len(),
            "built transit graph"
        );

        graph
    }

    /// Add a bidirectional edge pair between `a` and `b` on `route`.
    ///
    /// Negative weights are clamped to zero.
    pub fn connect(&mut self, a: LocationId, b: LocationId, weight_km: f64, route: RouteId) {
        let weight_km = weight_km.max(0.0);
        self.adjacency.entry(a).or_default().push(Edge {
            to: b,
            weight_km,
            route,
        });
        self.adjacency.entry(b).or_default().push(Edge {
            to: a,
            weight_km,
            route,
        });
    }

    /// Register a location without any edges.
    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    /// Outgoing edges of a location, empty if it has none.
    pub fn neighbours(&self, id: LocationId) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if at least one route serves the location.
    pub fn is_connected(&self, id: LocationId) -> bool {
        self.adjacency.get(&id).is_some_and(|edges| !edges.is_empty())
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn route(&self, id: RouteId) -> Option<&RouteInfo> {
        self.routes.get(&id)
    }

    /// Display name of a route, falling back to its id.
    pub fn route_name(&self, id: RouteId) -> String {
        self.routes
            .get(&id)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| format!("Route {id}"))
    }

    /// All locations known to the graph, connected or not.
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Locations served by at least one route.
    pub fn connected_locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values().filter(|l| self.is_connected(l.id))
    }

    /// Number of locations with at least one edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.values().filter(|edges| !edges.is_empty()).count()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, LocationKind, StopEntry};

    fn loc_id(n: u32) -> LocationId {
        LocationId::new(n).unwrap()
    }

    fn route_id(n: u32) -> RouteId {
        RouteId::new(n).unwrap()
    }

    fn stop(n: u32, lat: f64, lng: f64) -> Location {
        Location::new(
            loc_id(n),
            format!("Stop {n}"),
            Coordinate::new(lat, lng).unwrap(),
            LocationKind::Stop,
        )
    }

    fn line() -> Vec<Location> {
        vec![
            stop(1, 27.700, 85.300),
            stop(2, 27.710, 85.300),
            stop(3, 27.720, 85.300),
            stop(4, 27.730, 85.310),
        ]
    }

    #[test]
    fn edges_are_symmetric() {
        let routes = vec![
            Route::from_ordered(route_id(1), "North", &[loc_id(1), loc_id(2), loc_id(3)]),
            Route::from_ordered(route_id(2), "East", &[loc_id(3), loc_id(4)]),
        ];
        let graph = TransitGraph::build(&line(), &routes);

        assert_eq!(graph.edge_count(), 6);
        for location in graph.locations() {
            for edge in graph.neighbours(location.id) {
                let back = graph
                    .neighbours(edge.to)
                    .iter()
                    .find(|e| e.to == location.id && e.route == edge.route)
                    .expect("reverse edge");
                assert_eq!(back.weight_km, edge.weight_km);
            }
        }
    }

    #[test]
    fn stops_ordered_by_index_not_storage() {
        let route = Route::new(
            route_id(1),
            "Shuffled",
            vec![
                StopEntry { index: 2, location: loc_id(3) },
                StopEntry { index: 0, location: loc_id(1) },
                StopEntry { index: 1, location: loc_id(2) },
            ],
        );
        let graph = TransitGraph::build(&line(), &[route]);

        assert_eq!(graph.route(route_id(1)).unwrap().stops, vec![loc_id(1), loc_id(2), loc_id(3)]);
        assert!(graph.neighbours(loc_id(1)).iter().all(|e| e.to == loc_id(2)));
        assert_eq!(graph.neighbours(loc_id(2)).len(), 2);
    }

    #[test]
    fn unknown_locations_are_dropped() {
        let route = Route::from_ordered(route_id(1), "Gappy", &[loc_id(1), loc_id(99), loc_id(2)]);
        let graph = TransitGraph::build(&line(), &[route]);

        // 1 and 2 become adjacent once 99 is removed
        assert_eq!(graph.neighbours(loc_id(1))[0].to, loc_id(2));
        assert!(graph.location(loc_id(99)).is_none());
    }

    #[test]
    fn short_route_has_zero_distance_and_no_edges() {
        let routes = vec![
            Route::from_ordered(route_id(1), "Lonely", &[loc_id(1)]),
            Route::from_ordered(route_id(2), "Ghost", &[loc_id(98), loc_id(99)]),
        ];
        let graph = TransitGraph::build(&line(), &routes);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.route(route_id(1)).unwrap().total_distance_km, 0.0);
        assert_eq!(graph.route(route_id(2)).unwrap().total_distance_km, 0.0);
        assert!(!graph.is_connected(loc_id(1)));
    }

    #[test]
    fn route_distance_rounded() {
        let route = Route::from_ordered(route_id(1), "North", &[loc_id(1), loc_id(2), loc_id(3)]);
        let graph = TransitGraph::build(&line(), &[route]);

        let total = graph.route(route_id(1)).unwrap().total_distance_km;
        // Two hundredths of a degree of latitude
        assert!((total - 2.224).abs() < 0.002, "got {total}");
        assert_eq!(total, round_to(total, 3));
    }

    #[test]
    fn unconnected_location_is_known() {
        let graph = TransitGraph::build(&line(), &[]);
        assert!(graph.location(loc_id(4)).is_some());
        assert!(graph.neighbours(loc_id(4)).is_empty());
        assert_eq!(graph.connected_locations().count(), 0);
    }

    #[test]
    fn route_name_fallback() {
        let graph = TransitGraph::default();
        assert_eq!(graph.route_name(route_id(7)), "Route 7");
    }
}
