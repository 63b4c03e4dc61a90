//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedRoutingProvider;
use crate::planner::{PlannerConfig, RouteFinder};
use crate::routing::OsrmClient;
use crate::store::MemoryStore;

/// Provider used by the server: OSRM behind a response cache.
pub type ServerProvider = CachedRoutingProvider<OsrmClient>;

/// Route finder as wired up by the server.
pub type ServerFinder = RouteFinder<MemoryStore, ServerProvider>;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Network data, shared with the finder
    pub store: MemoryStore,

    /// Route finder over `store`
    pub finder: Arc<ServerFinder>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: MemoryStore, provider: ServerProvider, config: PlannerConfig) -> Self {
        // MemoryStore clones share data, so a reload is seen by the finder
        let finder = RouteFinder::new(Arc::new(store.clone()), Arc::new(provider), config);
        Self {
            store,
            finder: Arc::new(finder),
        }
    }
}
