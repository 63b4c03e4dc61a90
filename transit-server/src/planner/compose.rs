//! Turns a raw search path into rider-facing segments.
//!
//! Consecutive steps on the same route collapse into one riding segment;
//! a route change between runs becomes a transfer segment at the shared
//! stop. Walking segments are added by the route finder around these.

use std::collections::HashMap;

use futures::future::join_all;
use tracing::warn;

use crate::domain::{
    Coordinate, Location, LocationId, PassengerClass, RouteId, Vehicle, VehicleId, round_to,
};
use crate::estimate::{estimate_wait_minutes, fare, travel_minutes};
use crate::graph::TransitGraph;
use crate::routing::RoutingProvider;
use crate::store::VehicleRepository;
use crate::walking::{WalkEstimate, WalkSource, WalkingConnector};

use super::config::PlannerConfig;
use super::search::PathStep;

/// A named point a segment starts or ends at.
///
/// `id` is `None` for points supplied by the user rather than taken from
/// the network.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRef {
    pub id: Option<LocationId>,
    pub name: String,
    pub coord: Coordinate,
}

impl StopRef {
    pub fn user(name: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            id: None,
            name: name.into(),
            coord,
        }
    }
}

impl From<&Location> for StopRef {
    fn from(location: &Location) -> Self {
        Self {
            id: Some(location.id),
            name: location.name.clone(),
            coord: location.coord,
        }
    }
}

/// Walk between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkLeg {
    pub from: StopRef,
    pub to: StopRef,
    pub distance_m: u32,
    pub duration_min: u32,
    pub directions: String,
    pub geometry: Vec<Coordinate>,
    pub source: WalkSource,
}

impl WalkLeg {
    pub fn new(from: StopRef, to: StopRef, estimate: WalkEstimate) -> Self {
        let directions = format!("Walk {}m to {}", estimate.distance_m, to.name);
        Self {
            from,
            to,
            distance_m: estimate.distance_m,
            duration_min: estimate.duration_min,
            directions,
            geometry: estimate.geometry,
            source: estimate.source,
        }
    }
}

/// Operator details shown on a riding segment.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInfo {
    pub id: VehicleId,
    pub name: String,
    pub image_path: Option<String>,
    /// `HH:MM`
    pub starts_at: Option<String>,
    pub stops_at: Option<String>,
    /// Vehicles of this kind on the route.
    pub count: u32,
}

impl VehicleInfo {
    fn for_route(vehicle: &Vehicle, route: RouteId) -> Self {
        let hours = vehicle.operating_hours;
        Self {
            id: vehicle.id,
            name: vehicle.name.clone(),
            image_path: vehicle.image_path.clone(),
            starts_at: hours.map(|h| h.starts_at.format("%H:%M").to_string()),
            stops_at: hours.map(|h| h.stops_at.format("%H:%M").to_string()),
            count: vehicle.count_on(route).max(1),
        }
    }
}

/// Bus ride along one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RideLeg {
    pub route_id: RouteId,
    pub route_name: String,
    pub from: StopRef,
    pub to: StopRef,
    /// Names of the stops passed without alighting.
    pub stops_in_between: Vec<String>,
    /// Kilometres, 2 decimals.
    pub distance_km: f64,
    pub fare: u32,
    pub vehicle: Option<VehicleInfo>,
    pub conductor_instruction: String,
    pub wait_time_min: Option<u32>,
    pub wait_time_estimate: Option<String>,
    pub duration_min: u32,
    pub geometry: Vec<Coordinate>,
}

/// Change of bus at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferStop {
    pub at: StopRef,
    pub from_route: String,
    pub to_route: String,
    pub instruction: String,
    pub wait_time_min: u32,
}

/// One step of a rider-facing plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Walking(WalkLeg),
    Riding(RideLeg),
    Transfer(TransferStop),
}

impl Segment {
    pub fn origin(&self) -> &StopRef {
        match self {
            Segment::Walking(w) => &w.from,
            Segment::Riding(r) => &r.from,
            Segment::Transfer(t) => &t.at,
        }
    }

    pub fn destination(&self) -> &StopRef {
        match self {
            Segment::Walking(w) => &w.to,
            Segment::Riding(r) => &r.to,
            Segment::Transfer(t) => &t.at,
        }
    }

    /// Minutes this segment adds to the trip.
    pub fn duration_min(&self) -> u32 {
        match self {
            Segment::Walking(w) => w.duration_min,
            Segment::Riding(r) => r.duration_min,
            Segment::Transfer(t) => t.wait_time_min,
        }
    }
}

/// Stops ridden on one route without changing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRun {
    pub route: RouteId,
    /// Boarding stop first, alighting stop last.
    pub stops: Vec<LocationId>,
}

/// Group a path into same-route runs.
///
/// A path of fewer than two steps has no runs. Adjacent runs share their
/// boundary stop.
pub fn ride_runs(path: &[PathStep]) -> Vec<RideRun> {
    let mut runs: Vec<RideRun> = Vec::new();

    for pair in path.windows(2) {
        let (prev, step) = (pair[0], pair[1]);
        let Some(route) = step.route else {
            continue;
        };

        match runs.last_mut() {
            Some(run) if run.route == route => run.stops.push(step.location),
            _ => runs.push(RideRun {
                route,
                stops: vec![prev.location, step.location],
            }),
        }
    }

    runs
}

/// Builds riding and transfer segments for a path.
pub struct SegmentComposer<'a, S, P> {
    graph: &'a TransitGraph,
    vehicles: &'a S,
    walker: &'a WalkingConnector<'a, P>,
    config: &'a PlannerConfig,
}

impl<'a, S, P> SegmentComposer<'a, S, P>
where
    S: VehicleRepository,
    P: RoutingProvider,
{
    pub fn new(
        graph: &'a TransitGraph,
        vehicles: &'a S,
        walker: &'a WalkingConnector<'a, P>,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            graph,
            vehicles,
            walker,
            config,
        }
    }

    /// Segments for `path`, alternating rides and transfers.
    pub async fn compose(&self, path: &[PathStep], passenger: PassengerClass) -> Vec<Segment> {
        let runs: Vec<(RideRun, Vec<&Location>)> = ride_runs(path)
            .into_iter()
            .filter_map(|run| {
                let stops: Option<Vec<&Location>> =
                    run.stops.iter().map(|id| self.graph.location(*id)).collect();
                match stops {
                    Some(stops) => Some((run, stops)),
                    None => {
                        warn!(route_id = %run.route, "path references unknown location, dropping run");
                        None
                    }
                }
            })
            .collect();

        let mut fleet: HashMap<RouteId, Vec<Vehicle>> = HashMap::new();
        for (run, _) in &runs {
            if !fleet.contains_key(&run.route) {
                fleet.insert(run.route, self.fleet_for(run.route).await);
            }
        }

        let geometries = join_all(runs.iter().map(|(_, stops)| {
            let coords: Vec<Coordinate> = stops.iter().map(|l| l.coord).collect();
            async move { self.walker.ride_geometry(&coords).await }
        }))
        .await;

        let mut segments = Vec::with_capacity(runs.len() * 2);
        let mut previous_route: Option<RouteId> = None;

        for ((run, stops), geometry) in runs.iter().zip(geometries) {
            let vehicles = fleet.get(&run.route).map(Vec::as_slice).unwrap_or(&[]);
            let wait = self.wait_minutes(run.route, vehicles);

            if let (Some(prev), Some(board)) = (previous_route, stops.first()) {
                let to_route = self.graph.route_name(run.route);
                segments.push(Segment::Transfer(TransferStop {
                    at: StopRef::from(*board),
                    from_route: self.graph.route_name(prev),
                    instruction: format!("Change to {to_route} at {}", board.name),
                    to_route,
                    wait_time_min: wait.unwrap_or(self.config.default_wait_mins),
                }));
            }

            if let Some(ride) = self.ride(run, stops, vehicles, wait, geometry, passenger) {
                segments.push(Segment::Riding(ride));
            }
            previous_route = Some(run.route);
        }

        segments
    }

    fn ride(
        &self,
        run: &RideRun,
        stops: &[&Location],
        vehicles: &[Vehicle],
        wait: Option<u32>,
        geometry: Vec<Coordinate>,
        passenger: PassengerClass,
    ) -> Option<RideLeg> {
        let (board, alight) = (stops.first()?, stops.last()?);

        let distance_km: f64 = stops
            .windows(2)
            .map(|w| w[0].coord.distance_km(&w[1].coord))
            .sum();

        let stops_in_between = stops[1..stops.len() - 1]
            .iter()
            .map(|l| l.name.clone())
            .collect();

        Some(RideLeg {
            route_id: run.route,
            route_name: self.graph.route_name(run.route),
            from: StopRef::from(*board),
            to: StopRef::from(*alight),
            stops_in_between,
            distance_km: round_to(distance_km, 2),
            fare: fare(distance_km, passenger, &self.config.fare),
            vehicle: vehicles.first().map(|v| VehicleInfo::for_route(v, run.route)),
            conductor_instruction: format!("Tell the conductor: \"{}\"", alight.name),
            wait_time_min: wait,
            wait_time_estimate: wait.map(|m| format!("~{m} min")),
            duration_min: travel_minutes(distance_km, self.config.avg_bus_speed_kmh),
            geometry,
        })
    }

    /// Approved vehicles on `route`; empty when the lookup fails.
    async fn fleet_for(&self, route: RouteId) -> Vec<Vehicle> {
        match self.vehicles.vehicles_for_route(route).await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                warn!(route_id = %route, error = %e, "vehicle lookup failed");
                Vec::new()
            }
        }
    }

    fn wait_minutes(&self, route: RouteId, vehicles: &[Vehicle]) -> Option<u32> {
        let route_km = self.graph.route(route)?.total_distance_km;
        let count = vehicles.iter().map(|v| v.count_on(route)).sum();
        estimate_wait_minutes(route_km, count, self.config.avg_bus_speed_kmh)
    }
}
