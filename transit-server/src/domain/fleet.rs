//! Vehicles and service alerts.
//!
//! Neither takes part in the search itself. They enrich a computed path
//! with operator details, wait estimates, and disruption notices.

use chrono::{DateTime, NaiveTime, Utc};

use super::{AlertId, RouteId, VehicleId};

/// Daily operating window of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    pub starts_at: NaiveTime,
    pub stops_at: NaiveTime,
}

/// How many vehicles of a kind are assigned to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAssignment {
    pub route: RouteId,
    pub count: u32,
}

/// An approved vehicle type and the routes it operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub image_path: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub assignments: Vec<RouteAssignment>,
}

impl Vehicle {
    /// Returns true if the vehicle operates on `route`.
    pub fn serves(&self, route: RouteId) -> bool {
        self.assignments.iter().any(|a| a.route == route)
    }

    /// Number of vehicles of this kind assigned to `route`.
    pub fn count_on(&self, route: RouteId) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.route == route)
            .map(|a| a.count)
            .sum()
    }
}

/// A disruption notice affecting one or more routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub name: String,
    pub description: Option<String>,
    pub affected_routes: Vec<RouteId>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// An alert is active until it expires; alerts without expiry never do.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| expiry > now)
    }

    /// Returns true if the alert names any of the given routes.
    pub fn affects_any(&self, routes: &[RouteId]) -> bool {
        self.affected_routes.iter().any(|r| routes.contains(r))
    }
}
