//! Road routing provider.
//!
//! Supplies road-following geometry and walking distances between two
//! points. Providers are best-effort: every failure is reported as a
//! `RoutingError` and the caller decides on a fallback.

mod client;
mod error;
mod types;

use std::fmt;
use std::future::Future;

use crate::domain::Coordinate;

pub use client::{OsrmClient, OsrmConfig};
pub use error::RoutingError;
pub use types::{OsrmGeometry, OsrmResponse, OsrmRoute};

/// Travel mode of a routing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Foot,
    Driving,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Foot => "foot",
            Profile::Driving => "driving",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routed path between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub distance_m: f64,
    pub duration_s: f64,
    /// Polyline in `(lat, lng)` order.
    pub geometry: Vec<Coordinate>,
}

/// Trait for road routing backends.
///
/// This abstraction allows testing the route finder without network
/// access.
pub trait RoutingProvider: Send + Sync {
    /// Route from `from` to `to` using the given travel mode.
    fn route(
        &self,
        profile: Profile,
        from: Coordinate,
        to: Coordinate,
    ) -> impl Future<Output = Result<RoutedPath, RoutingError>> + Send;
}
