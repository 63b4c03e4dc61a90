//! In-memory network store backed by a JSON snapshot.
//!
//! Loads an export of the network tables from disk and serves it through
//! the repository traits. Only approved rows are kept; rows that fail
//! validation are logged and skipped.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{Alert, Location, Route, RouteId, Vehicle};

use super::error::StoreError;
use super::records::Snapshot;
use super::{AlertRepository, LocationRepository, RouteRepository, VehicleRepository};

/// Validated contents of one snapshot.
#[derive(Debug, Clone, Default)]
struct Network {
    locations: Vec<Location>,
    routes: Vec<Route>,
    vehicles: Vec<Vehicle>,
    alerts: Vec<Alert>,
}

impl Network {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let locations = snapshot
            .locations
            .into_iter()
            .filter(|row| row.is_approved())
            .filter_map(|row| {
                let id = row.location_id;
                row.into_domain()
                    .inspect_err(|e| warn!(location_id = id, error = %e, "skipping location"))
                    .ok()
            })
            .collect();

        let routes = snapshot
            .routes
            .into_iter()
            .filter(|row| row.is_approved())
            .filter_map(|row| {
                let id = row.route_id;
                row.into_domain()
                    .inspect_err(|e| warn!(route_id = id, error = %e, "skipping route"))
                    .ok()
            })
            .collect();

        let vehicles = snapshot
            .vehicles
            .into_iter()
            .filter(|row| row.is_approved())
            .filter_map(|row| {
                let id = row.vehicle_id;
                row.into_domain()
                    .inspect_err(|e| warn!(vehicle_id = id, error = %e, "skipping vehicle"))
                    .ok()
            })
            .collect();

        let alerts = snapshot
            .alerts
            .into_iter()
            .filter_map(|row| {
                let id = row.alert_id;
                row.into_domain()
                    .inspect_err(|e| warn!(alert_id = id, error = %e, "skipping alert"))
                    .ok()
            })
            .collect();

        Self {
            locations,
            routes,
            vehicles,
            alerts,
        }
    }
}

/// Network store holding the whole network in memory.
///
/// Cloning is cheap; clones share the same data, so a `reload` through
/// one handle is seen by all of them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    network: Arc<RwLock<Network>>,
}

impl MemoryStore {
    /// Load a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let network = read_network(path.as_ref())?;
        Ok(Self::wrap(network))
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::wrap(Network::from_snapshot(snapshot)))
    }

    /// Build a store from already-validated domain values.
    pub fn from_parts(
        locations: Vec<Location>,
        routes: Vec<Route>,
        vehicles: Vec<Vehicle>,
        alerts: Vec<Alert>,
    ) -> Self {
        Self::wrap(Network {
            locations,
            routes,
            vehicles,
            alerts,
        })
    }

    fn wrap(network: Network) -> Self {
        Self {
            network: Arc::new(RwLock::new(network)),
        }
    }

    /// Re-read the snapshot file and swap it in.
    ///
    /// On error the current data is left untouched.
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let fresh = read_network(path.as_ref())?;
        *self.network.write().await = fresh;
        Ok(())
    }

    /// Number of approved locations and routes currently held.
    pub async fn counts(&self) -> (usize, usize) {
        let network = self.network.read().await;
        (network.locations.len(), network.routes.len())
    }
}

fn read_network(path: &Path) -> Result<Network, StoreError> {
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;
    let network = Network::from_snapshot(snapshot);

    info!(
        path = %path.display(),
        locations = network.locations.len(),
        routes = network.routes.len(),
        vehicles = network.vehicles.len(),
        alerts = network.alerts.len(),
        "loaded network snapshot"
    );

    Ok(network)
}

impl LocationRepository for MemoryStore {
    async fn approved_locations(&self) -> Result<Vec<Location>, StoreError> {
        Ok(self.network.read().await.locations.clone())
    }
}

impl RouteRepository for MemoryStore {
    async fn approved_routes(&self) -> Result<Vec<Route>, StoreError> {
        Ok(self.network.read().await.routes.clone())
    }
}

impl VehicleRepository for MemoryStore {
    async fn vehicles_for_route(&self, route: RouteId) -> Result<Vec<Vehicle>, StoreError> {
        let network = self.network.read().await;
        Ok(network
            .vehicles
            .iter()
            .filter(|v| v.serves(route))
            .cloned()
            .collect())
    }
}

impl AlertRepository for MemoryStore {
    async fn active_alerts(&self, now: DateTime<Utc>) -> Result<Vec<Alert>, StoreError> {
        let network = self.network.read().await;
        Ok(network
            .alerts
            .iter()
            .filter(|a| a.is_active(now))
            .cloned()
            .collect())
    }
}
