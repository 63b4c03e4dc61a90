//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Alert, Coordinate, LocationId, PassengerClass, RouteId};
use crate::planner::{
    RideLeg, RouteFailure, RouteFindOutcome, RoutePlan, Segment, StopRef, Summary, TransferStop,
    VehicleInfo, WalkLeg,
};
use crate::walking::{NearbyStop, WalkSource};

/// Request to find a route between two locations.
#[derive(Debug, Deserialize)]
pub struct FindRouteRequest {
    pub start_location_id: u32,
    pub end_location_id: u32,

    /// `regular`, `student` or `elderly`. Anything else is `regular`.
    #[serde(default)]
    pub passenger_type: Option<String>,

    /// The user's own position, if they shared it
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,

    /// Where the user actually wants to end up
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl FindRouteRequest {
    pub fn passenger(&self) -> PassengerClass {
        self.passenger_type
            .as_deref()
            .map(PassengerClass::parse_lenient)
            .unwrap_or_default()
    }

    /// The user's start point. Both halves must be present and valid.
    pub fn user_start(&self) -> Option<Coordinate> {
        point(self.start_lat, self.start_lng)
    }

    pub fn user_end(&self) -> Option<Coordinate> {
        point(self.end_lat, self.end_lng)
    }
}

fn point(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinate> {
    Coordinate::new(lat?, lng?).ok()
}

/// Query for stops near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyStopsQuery {
    pub lat: f64,
    pub lng: f64,
    pub limit: Option<usize>,
    /// Kilometres. Unbounded if absent.
    pub radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct NearbyStopsResponse {
    pub stops: Vec<NearbyStop>,
}

/// An active service alert.
#[derive(Debug, Serialize)]
pub struct AlertResult {
    pub alert_id: u32,
    pub name: String,
    pub description: Option<String>,
    pub routes_affected: Vec<RouteId>,
    /// `None` for alerts that never expire
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Alert> for AlertResult {
    fn from(alert: &Alert) -> Self {
        Self {
            alert_id: alert.id.get(),
            name: alert.name.clone(),
            description: alert.description.clone(),
            routes_affected: alert.affected_routes.clone(),
            expires_at: alert.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertResult>,
}

/// Result of a route search.
///
/// Serializes as `{"success": true, ...plan}` or
/// `{"success": false, "message": ..., ...}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FindRouteResponse {
    Found(RoutePlanResult),
    Failed(RouteFailureResult),
}

impl From<RouteFindOutcome> for FindRouteResponse {
    fn from(outcome: RouteFindOutcome) -> Self {
        match outcome {
            RouteFindOutcome::Found(plan) => FindRouteResponse::Found(RoutePlanResult::from(&plan)),
            RouteFindOutcome::Failed(failure) => FindRouteResponse::Failed(failure.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoutePlanResult {
    pub success: bool,
    pub summary: SummaryResult,
    pub segments: Vec<SegmentResult>,
    pub routes_used: Vec<RouteId>,
}

impl From<&RoutePlan> for RoutePlanResult {
    fn from(plan: &RoutePlan) -> Self {
        Self {
            success: true,
            summary: SummaryResult::from(&plan.summary),
            segments: plan.segments.iter().map(SegmentResult::from).collect(),
            routes_used: plan.routes_used.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteFailureResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nearby_start: Vec<NearbyStop>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nearby_end: Vec<NearbyStop>,
}

impl From<RouteFailure> for RouteFailureResult {
    fn from(failure: RouteFailure) -> Self {
        Self {
            success: false,
            message: failure.message,
            nearby_start: failure.nearby_start,
            nearby_end: failure.nearby_end,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResult {
    pub total_distance_km: f64,
    pub total_fare: u32,
    pub estimated_duration_min: u32,
    pub transfers: usize,
    pub alerts: Vec<AlertResult>,
}

impl From<&Summary> for SummaryResult {
    fn from(summary: &Summary) -> Self {
        Self {
            total_distance_km: summary.total_distance_km,
            total_fare: summary.total_fare,
            estimated_duration_min: summary.estimated_duration_min,
            transfers: summary.transfers,
            alerts: summary.alerts.iter().map(AlertResult::from).collect(),
        }
    }
}

/// A named point in a plan.
#[derive(Debug, Serialize)]
pub struct StopResult {
    /// Absent for the user's own position
    pub location_id: Option<LocationId>,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&StopRef> for StopResult {
    fn from(stop: &StopRef) -> Self {
        Self {
            location_id: stop.id,
            name: stop.name.clone(),
            lat: stop.coord.lat,
            lng: stop.coord.lng,
        }
    }
}

/// A plan segment, tagged by `type`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentResult {
    Walking(WalkResult),
    Riding(RideResult),
    Transfer(TransferResult),
}

impl From<&Segment> for SegmentResult {
    fn from(segment: &Segment) -> Self {
        match segment {
            Segment::Walking(walk) => SegmentResult::Walking(walk.into()),
            Segment::Riding(ride) => SegmentResult::Riding(ride.into()),
            Segment::Transfer(transfer) => SegmentResult::Transfer(transfer.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalkResult {
    pub from: StopResult,
    pub to: StopResult,
    pub distance_m: u32,
    pub duration_min: u32,
    pub directions: String,
    /// `[lat, lng]` pairs
    pub geometry: Vec<[f64; 2]>,
    pub source: WalkSource,
}

impl From<&WalkLeg> for WalkResult {
    fn from(walk: &WalkLeg) -> Self {
        Self {
            from: StopResult::from(&walk.from),
            to: StopResult::from(&walk.to),
            distance_m: walk.distance_m,
            duration_min: walk.duration_min,
            directions: walk.directions.clone(),
            geometry: pairs(&walk.geometry),
            source: walk.source,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleResult {
    pub vehicle_id: u32,
    pub name: String,
    pub image_path: Option<String>,
    pub starts_at: Option<String>,
    pub stops_at: Option<String>,
    pub count: u32,
}

impl From<&VehicleInfo> for VehicleResult {
    fn from(vehicle: &VehicleInfo) -> Self {
        Self {
            vehicle_id: vehicle.id.get(),
            name: vehicle.name.clone(),
            image_path: vehicle.image_path.clone(),
            starts_at: vehicle.starts_at.clone(),
            stops_at: vehicle.stops_at.clone(),
            count: vehicle.count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RideResult {
    pub route_id: RouteId,
    pub route_name: String,
    pub from: StopResult,
    pub to: StopResult,
    pub stops_in_between: Vec<String>,
    pub distance_km: f64,
    pub fare: u32,
    pub vehicle: Option<VehicleResult>,
    pub conductor_instruction: String,
    pub wait_time_min: Option<u32>,
    pub wait_time_estimate: Option<String>,
    pub duration_min: u32,
    pub geometry: Vec<[f64; 2]>,
}

impl From<&RideLeg> for RideResult {
    fn from(ride: &RideLeg) -> Self {
        Self {
            route_id: ride.route_id,
            route_name: ride.route_name.clone(),
            from: StopResult::from(&ride.from),
            to: StopResult::from(&ride.to),
            stops_in_between: ride.stops_in_between.clone(),
            distance_km: ride.distance_km,
            fare: ride.fare,
            vehicle: ride.vehicle.as_ref().map(VehicleResult::from),
            conductor_instruction: ride.conductor_instruction.clone(),
            wait_time_min: ride.wait_time_min,
            wait_time_estimate: ride.wait_time_estimate.clone(),
            duration_min: ride.duration_min,
            geometry: pairs(&ride.geometry),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub at: StopResult,
    pub from_route: String,
    pub to_route: String,
    pub instruction: String,
    pub wait_time_min: u32,
}

impl From<&TransferStop> for TransferResult {
    fn from(transfer: &TransferStop) -> Self {
        Self {
            at: StopResult::from(&transfer.at),
            from_route: transfer.from_route.clone(),
            to_route: transfer.to_route.clone(),
            instruction: transfer.instruction.clone(),
            wait_time_min: transfer.wait_time_min,
        }
    }
}

fn pairs(geometry: &[Coordinate]) -> Vec<[f64; 2]> {
    geometry.iter().map(|c| [c.lat, c.lng]).collect()
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
