//! Route finding between two approved locations.
//!
//! Validates the request, builds the graph from the store, substitutes
//! the nearest served stop for an endpoint no route serves, searches,
//! and assembles the rider-facing plan with walks, totals and alerts.
//! Every failure is returned as a `RouteFailure` value.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::domain::{Alert, Coordinate, Location, LocationId, PassengerClass, RouteId, round_to};
use crate::graph::TransitGraph;
use crate::routing::RoutingProvider;
use crate::store::{StoreError, TransitStore};
use crate::walking::{NearbyStop, WalkingConnector, nearest_connected, nearest_connected_k};

use super::compose::{Segment, SegmentComposer, StopRef, WalkLeg};
use super::config::PlannerConfig;
use super::search::shortest_path;

/// Name given to the user's own starting point.
pub const USER_START_NAME: &str = "Your location";

/// Name given to the user's own destination point.
pub const USER_END_NAME: &str = "Your destination";

/// Request for a route between two locations.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFindRequest {
    pub start: LocationId,
    pub end: LocationId,
    pub passenger: PassengerClass,
    /// Where the user actually is, if known.
    pub user_start: Option<Coordinate>,
    /// Where the user actually wants to end up, if known.
    pub user_end: Option<Coordinate>,
}

impl RouteFindRequest {
    pub fn new(start: LocationId, end: LocationId) -> Self {
        Self {
            start,
            end,
            passenger: PassengerClass::Regular,
            user_start: None,
            user_end: None,
        }
    }

    pub fn with_passenger(mut self, passenger: PassengerClass) -> Self {
        self.passenger = passenger;
        self
    }

    pub fn with_user_points(mut self, start: Option<Coordinate>, end: Option<Coordinate>) -> Self {
        self.user_start = start;
        self.user_end = end;
        self
    }
}

/// Totals across a whole plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Riding plus walking, kilometres, 2 decimals.
    pub total_distance_km: f64,
    pub total_fare: u32,
    pub estimated_duration_min: u32,
    pub transfers: usize,
    /// Active alerts on any route used.
    pub alerts: Vec<Alert>,
}

/// A found route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub summary: Summary,
    pub segments: Vec<Segment>,
    /// Distinct routes ridden, in order of first use.
    pub routes_used: Vec<RouteId>,
}

/// Why no route was returned, with suggestions where they help.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFailure {
    pub message: String,
    pub nearby_start: Vec<NearbyStop>,
    pub nearby_end: Vec<NearbyStop>,
}

/// Result of a route search.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteFindOutcome {
    Found(RoutePlan),
    Failed(RouteFailure),
}

impl RouteFindOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteFindOutcome::Found(_))
    }
}

/// Reasons a route search ends without a plan.
#[derive(Debug, thiserror::Error)]
pub enum FindError {
    #[error("Start and destination are the same location.")]
    SameEndpoints,

    #[error("Starting location not found or not approved.")]
    StartNotFound,

    #[error("Destination location not found or not approved.")]
    EndNotFound,

    #[error("No bus routes found near your starting point.")]
    StartUnreachable,

    #[error("No bus routes found near your destination.")]
    EndUnreachable,

    #[error("No route found between these locations. They may not be connected by any bus route.")]
    NoPath {
        nearby_start: Vec<NearbyStop>,
        nearby_end: Vec<NearbyStop>,
    },

    #[error("Route data is temporarily unavailable.")]
    Store(#[from] StoreError),
}

impl From<FindError> for RouteFailure {
    fn from(err: FindError) -> Self {
        let message = err.to_string();
        match err {
            FindError::NoPath {
                nearby_start,
                nearby_end,
            } => RouteFailure {
                message,
                nearby_start,
                nearby_end,
            },
            _ => RouteFailure {
                message,
                nearby_start: Vec::new(),
                nearby_end: Vec::new(),
            },
        }
    }
}

/// An endpoint as used by the search, plus the walk that reaches it.
struct Endpoint {
    stop: LocationId,
    walk: Option<WalkLeg>,
}

/// Finds routes over the current network.
pub struct RouteFinder<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    config: PlannerConfig,
}

impl<S, P> RouteFinder<S, P>
where
    S: TransitStore,
    P: RoutingProvider,
{
    pub fn new(store: Arc<S>, provider: Arc<P>, config: PlannerConfig) -> Self {
        Self {
            store,
            provider,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build the graph from the current approved network.
    pub async fn load_graph(&self) -> Result<TransitGraph, StoreError> {
        let locations = self.store.approved_locations().await?;
        let routes = self.store.approved_routes().await?;
        Ok(TransitGraph::build(&locations, &routes))
    }

    /// Find the best route for `request`.
    pub async fn find(&self, request: &RouteFindRequest) -> RouteFindOutcome {
        match self.try_find(request).await {
            Ok(plan) => {
                info!(
                    start = %request.start,
                    end = %request.end,
                    segments = plan.segments.len(),
                    transfers = plan.summary.transfers,
                    distance_km = plan.summary.total_distance_km,
                    "route found"
                );
                RouteFindOutcome::Found(plan)
            }
            Err(e) => {
                match &e {
                    FindError::Store(source) => error!(error = %source, "store read failed"),
                    other => info!(start = %request.start, end = %request.end, reason = %other, "no route"),
                }
                RouteFindOutcome::Failed(e.into())
            }
        }
    }

    async fn try_find(&self, request: &RouteFindRequest) -> Result<RoutePlan, FindError> {
        if request.start == request.end {
            return Err(FindError::SameEndpoints);
        }

        let graph = self.load_graph().await?;
        let walker = WalkingConnector::new(self.provider.as_ref(), self.config.walk_speed_kmh);

        let start = graph
            .location(request.start)
            .ok_or(FindError::StartNotFound)?;
        let end = graph.location(request.end).ok_or(FindError::EndNotFound)?;

        let origin = self
            .resolve(&graph, &walker, start, true)
            .await
            .ok_or(FindError::StartUnreachable)?;
        let destination = self
            .resolve(&graph, &walker, end, false)
            .await
            .ok_or(FindError::EndUnreachable)?;

        let path = shortest_path(
            &graph,
            origin.stop,
            destination.stop,
            self.config.transfer_penalty_km,
        )
        .ok_or_else(|| FindError::NoPath {
            nearby_start: nearest_connected_k(&graph, start.coord, self.config.max_suggestions),
            nearby_end: nearest_connected_k(&graph, end.coord, self.config.max_suggestions),
        })?;

        let composer = SegmentComposer::new(&graph, self.store.as_ref(), &walker, &self.config);
        let rides = composer.compose(&path.path, request.passenger).await;

        let mut segments = Vec::with_capacity(rides.len() + 4);
        segments.extend(origin.walk.map(Segment::Walking));
        segments.extend(rides);
        segments.extend(destination.walk.map(Segment::Walking));

        self.attach_user_walks(&walker, &mut segments, request, start, end)
            .await;

        let routes_used = routes_used(&segments);
        let alerts = self.alerts_for(&routes_used).await;
        let summary = summarize(
            &segments,
            path.total_distance,
            alerts,
            self.config.avg_bus_speed_kmh,
        );

        Ok(RoutePlan {
            summary,
            segments,
            routes_used,
        })
    }

    /// Pick the stop the search starts or ends at.
    ///
    /// A served location is used as is. Otherwise the nearest served stop
    /// within the configured radius stands in, reached by a walk. Returns
    /// `None` if there is no such stop.
    async fn resolve(
        &self,
        graph: &TransitGraph,
        walker: &WalkingConnector<'_, P>,
        location: &Location,
        is_start: bool,
    ) -> Option<Endpoint> {
        if graph.is_connected(location.id) {
            return Some(Endpoint {
                stop: location.id,
                walk: None,
            });
        }

        let nearest = nearest_connected(graph, location.coord, self.config.nearest_stop_radius_km)?;
        let stop = graph.location(nearest.id)?;

        let (from, to) = if is_start {
            (location, stop)
        } else {
            (stop, location)
        };
        let estimate = walker.walk(from.coord, to.coord).await;

        Some(Endpoint {
            stop: stop.id,
            walk: Some(WalkLeg::new(StopRef::from(from), StopRef::from(to), estimate)),
        })
    }

    /// Add walks from the user's own start point and to their own end point.
    ///
    /// Each walk joins the plan's first origin or last destination, and is
    /// only added when the user point is farther away than the threshold.
    /// When an endpoint was substituted that anchor is the landmark itself,
    /// not the first boarding stop.
    async fn attach_user_walks(
        &self,
        walker: &WalkingConnector<'_, P>,
        segments: &mut Vec<Segment>,
        request: &RouteFindRequest,
        start: &Location,
        end: &Location,
    ) {
        let threshold = self.config.user_walk_threshold_m;

        if let Some(user) = request.user_start {
            let anchor = segments
                .first()
                .map(|s| s.origin().clone())
                .unwrap_or_else(|| StopRef::from(start));
            if user.distance_m(&anchor.coord) > threshold {
                let estimate = walker.walk(user, anchor.coord).await;
                let walk = WalkLeg::new(StopRef::user(USER_START_NAME, user), anchor, estimate);
                segments.insert(0, Segment::Walking(walk));
            }
        }

        if let Some(user) = request.user_end {
            let anchor = segments
                .last()
                .map(|s| s.destination().clone())
                .unwrap_or_else(|| StopRef::from(end));
            if anchor.coord.distance_m(&user) > threshold {
                let estimate = walker.walk(anchor.coord, user).await;
                let walk = WalkLeg::new(anchor, StopRef::user(USER_END_NAME, user), estimate);
                segments.push(Segment::Walking(walk));
            }
        }
    }

    /// Active alerts on any of `routes`. Empty if the lookup fails.
    ///
    /// Each alert's affected routes are narrowed to those in `routes`.
    async fn alerts_for(&self, routes: &[RouteId]) -> Vec<Alert> {
        if routes.is_empty() {
            return Vec::new();
        }
        match self.store.active_alerts(Utc::now()).await {
            Ok(alerts) => alerts
                .into_iter()
                .filter(|a| a.affects_any(routes))
                .map(|mut a| {
                    a.affected_routes.retain(|r| routes.contains(r));
                    a
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "alert lookup failed, continuing without alerts");
                Vec::new()
            }
        }
    }
}

/// Distinct routes ridden, in order of first use.
fn routes_used(segments: &[Segment]) -> Vec<RouteId> {
    let mut routes = Vec::new();
    for segment in segments {
        if let Segment::Riding(ride) = segment
            && !routes.contains(&ride.route_id)
        {
            routes.push(ride.route_id);
        }
    }
    routes
}

/// Totals for a plan.
///
/// Ride minutes are summed unrounded from each ride's distance and rounded
/// once at the end.
fn summarize(
    segments: &[Segment],
    ride_distance_km: f64,
    alerts: Vec<Alert>,
    avg_bus_speed_kmh: f64,
) -> Summary {
    let mut walk_m: u64 = 0;
    let mut fare: u32 = 0;
    let mut minutes: f64 = 0.0;
    let mut transfers = 0;

    for segment in segments {
        match segment {
            Segment::Walking(walk) => {
                walk_m += u64::from(walk.distance_m);
                minutes += f64::from(segment.duration_min());
            }
            Segment::Riding(ride) => {
                fare = fare.saturating_add(ride.fare);
                minutes += if avg_bus_speed_kmh > 0.0 {
                    ride.distance_km / avg_bus_speed_kmh * 60.0
                } else {
                    f64::from(ride.duration_min)
                };
            }
            Segment::Transfer(_) => {
                transfers += 1;
                minutes += f64::from(segment.duration_min());
            }
        }
    }

    // Float to int casts saturate
    let duration = minutes.round() as u32;

    Summary {
        total_distance_km: round_to(ride_distance_km + walk_m as f64 / 1000.0, 2),
        total_fare: fare,
        estimated_duration_min: duration.max(1),
        transfers,
        alerts,
    }
}

#[cfg(test)]
#[path = "finder_tests.rs"]
mod tests;
