//! Walking connections and ride geometry.
//!
//! Links points that are off the network to the nearest served stop, and
//! asks the routing provider for walking paths and road-following ride
//! geometry. Provider failures never surface: each falls back to a
//! straight line.

use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::domain::{Coordinate, Location, LocationId, round_to};
use crate::estimate::travel_minutes;
use crate::graph::TransitGraph;
use crate::routing::{Profile, RoutingProvider};

/// Longest walk accepted from a provider, in seconds and metres.
const MAX_WALK_SECS: f64 = 24.0 * 60.0 * 60.0;
const MAX_WALK_M: f64 = 100_000.0;

/// A graph-connected location near some point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStop {
    #[serde(rename = "location_id")]
    pub id: LocationId,
    pub name: String,
    #[serde(flatten)]
    pub coord: Coordinate,
    /// Great-circle distance from the query point, 3 decimals.
    pub distance_km: f64,
}

/// Connected locations closest to `coord`, nearest first.
///
/// Ties are broken by id. `radius_km` of `None` means unbounded.
pub fn nearest_within(
    graph: &TransitGraph,
    coord: Coordinate,
    radius_km: Option<f64>,
    limit: usize,
) -> Vec<NearbyStop> {
    let mut candidates: Vec<(f64, &Location)> = graph
        .connected_locations()
        .map(|l| (coord.distance_km(&l.coord), l))
        .filter(|(d, _)| radius_km.is_none_or(|r| *d <= r))
        .collect();

    candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

    candidates
        .into_iter()
        .take(limit)
        .map(|(d, l)| NearbyStop {
            id: l.id,
            name: l.name.clone(),
            coord: l.coord,
            distance_km: round_to(d, 3),
        })
        .collect()
}

/// The nearest connected location within `radius_km`.
pub fn nearest_connected(graph: &TransitGraph, coord: Coordinate, radius_km: f64) -> Option<NearbyStop> {
    nearest_within(graph, coord, Some(radius_km), 1).into_iter().next()
}

/// The `k` nearest connected locations, at any distance.
pub fn nearest_connected_k(graph: &TransitGraph, coord: Coordinate, k: usize) -> Vec<NearbyStop> {
    nearest_within(graph, coord, None, k)
}

/// Where a walk estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkSource {
    Provider,
    StraightLine,
}

/// Distance, time and shape of a walk between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkEstimate {
    pub distance_m: u32,
    pub duration_min: u32,
    pub geometry: Vec<Coordinate>,
    pub source: WalkSource,
}

impl WalkEstimate {
    /// As-the-crow-flies walk at `speed_kmh`.
    pub fn straight_line(from: Coordinate, to: Coordinate, speed_kmh: f64) -> Self {
        let km = from.distance_km(&to);
        Self {
            distance_m: (km * 1000.0).round() as u32,
            duration_min: travel_minutes(km, speed_kmh),
            geometry: vec![from, to],
            source: WalkSource::StraightLine,
        }
    }
}

fn plausible_walk(distance_m: f64, duration_s: f64) -> bool {
    (0.0..=MAX_WALK_M).contains(&distance_m) && (0.0..=MAX_WALK_SECS).contains(&duration_s)
}

/// Provider-backed walking and ride geometry.
pub struct WalkingConnector<'a, P> {
    provider: &'a P,
    walk_speed_kmh: f64,
}

impl<'a, P: RoutingProvider> WalkingConnector<'a, P> {
    pub fn new(provider: &'a P, walk_speed_kmh: f64) -> Self {
        Self {
            provider,
            walk_speed_kmh,
        }
    }

    /// Walking path from `from` to `to`.
    ///
    /// Provider answers with a negative, non-finite or implausibly long
    /// distance or duration are treated like failures.
    pub async fn walk(&self, from: Coordinate, to: Coordinate) -> WalkEstimate {
        match self.provider.route(Profile::Foot, from, to).await {
            Ok(path) if !plausible_walk(path.distance_m, path.duration_s) => {
                debug!(
                    distance_m = path.distance_m,
                    duration_s = path.duration_s,
                    "implausible walking route, using straight line"
                );
                WalkEstimate::straight_line(from, to, self.walk_speed_kmh)
            }
            Ok(path) => WalkEstimate {
                distance_m: path.distance_m.round() as u32,
                duration_min: ((path.duration_s / 60.0).round() as u32).max(1),
                geometry: if path.geometry.len() >= 2 {
                    path.geometry
                } else {
                    vec![from, to]
                },
                source: WalkSource::Provider,
            },
            Err(e) => {
                debug!(error = %e, timeout = e.is_timeout(), "walking route unavailable, using straight line");
                WalkEstimate::straight_line(from, to, self.walk_speed_kmh)
            }
        }
    }

    /// Road-following geometry through `stops` in order.
    ///
    /// One request per consecutive pair, all in flight at once. A pair
    /// whose request fails is drawn as a straight line.
    pub async fn ride_geometry(&self, stops: &[Coordinate]) -> Vec<Coordinate> {
        if stops.len() < 2 {
            return stops.to_vec();
        }

        let requests = stops.windows(2).map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            async move {
                match self.provider.route(Profile::Driving, a, b).await {
                    Ok(path) if path.geometry.len() >= 2 => path.geometry,
                    Ok(_) => vec![a, b],
                    Err(e) => {
                        debug!(error = %e, "ride geometry unavailable for pair, using straight line");
                        vec![a, b]
                    }
                }
            }
        });

        let pieces = join_all(requests).await;

        let mut geometry = Vec::with_capacity(pieces.iter().map(Vec::len).sum());
        for (i, piece) in pieces.into_iter().enumerate() {
            // Each piece starts where the previous one ended
            let skip = usize::from(i > 0);
            geometry.extend(piece.into_iter().skip(skip));
        }
        geometry
    }
}
