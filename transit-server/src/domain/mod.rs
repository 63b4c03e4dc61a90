//! Domain types for the transit route finder.
//!
//! This module contains the validated model the rest of the crate works
//! with: identifiers, coordinates, locations, routes, vehicles and alerts.
//! Raw store rows are converted into these types at the repository
//! boundary, so code that receives them can trust their validity.

mod coord;
mod error;
mod fleet;
mod ids;
mod location;
mod passenger;
mod route;

pub use coord::{Coordinate, EARTH_RADIUS_KM, round_to};
pub use error::DomainError;
pub use fleet::{Alert, OperatingHours, RouteAssignment, Vehicle};
pub use ids::{AlertId, InvalidId, LocationId, RouteId, VehicleId};
pub use location::{Location, LocationKind};
pub use passenger::PassengerClass;
pub use route::{Route, StopEntry};
