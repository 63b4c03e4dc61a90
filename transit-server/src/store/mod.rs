//! Network data access.
//!
//! The route finder reads the network through these repository traits and
//! never writes. `MemoryStore` implements all of them from a JSON export of
//! the network tables.

mod error;
mod memory;
pub mod records;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{Alert, Location, Route, RouteId, Vehicle};

pub use error::StoreError;
pub use memory::MemoryStore;

/// Source of approved locations.
pub trait LocationRepository: Send + Sync {
    fn approved_locations(&self) -> impl Future<Output = Result<Vec<Location>, StoreError>> + Send;
}

/// Source of approved routes.
pub trait RouteRepository: Send + Sync {
    fn approved_routes(&self) -> impl Future<Output = Result<Vec<Route>, StoreError>> + Send;
}

/// Source of approved vehicles.
pub trait VehicleRepository: Send + Sync {
    /// Approved vehicles assigned to `route`.
    fn vehicles_for_route(
        &self,
        route: RouteId,
    ) -> impl Future<Output = Result<Vec<Vehicle>, StoreError>> + Send;
}

/// Source of service alerts.
pub trait AlertRepository: Send + Sync {
    /// Alerts that have not expired at `now`.
    fn active_alerts(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Alert>, StoreError>> + Send;
}

/// Everything the route finder reads.
pub trait TransitStore:
    LocationRepository + RouteRepository + VehicleRepository + AlertRepository
{
}

impl<T> TransitStore for T where
    T: LocationRepository + RouteRepository + VehicleRepository + AlertRepository
{
}
