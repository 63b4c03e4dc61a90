//! Caching layer for routing provider responses.
//!
//! Road geometry between two fixed points changes rarely, and the same
//! stop pairs come up in request after request. Successful responses are
//! cached keyed by profile and both endpoints at micro-degree precision.
//! Failures are never cached, so a provider outage does not outlive its
//! own duration.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::Coordinate;
use crate::routing::{Profile, RoutedPath, RoutingError, RoutingProvider};

/// Cache key: (profile, origin, destination), positions in micro-degrees.
type RouteKey = (Profile, (i64, i64), (i64, i64));

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Routing provider with caching.
///
/// Wraps any `RoutingProvider` and serves repeated requests from memory.
pub struct CachedRoutingProvider<P> {
    inner: P,
    routes: MokaCache<RouteKey, Arc<RoutedPath>>,
}

impl<P> CachedRoutingProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    fn key(profile: Profile, from: Coordinate, to: Coordinate) -> RouteKey {
        (profile, from.micro_degrees(), to.micro_degrees())
    }

    /// Access the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: RoutingProvider> RoutingProvider for CachedRoutingProvider<P> {
    async fn route(
        &self,
        profile: Profile,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<RoutedPath, RoutingError> {
        let key = Self::key(profile, from, to);

        if let Some(cached) = self.routes.get(&key).await {
            trace!(%profile, "route cache hit");
            return Ok(cached.as_ref().clone());
        }

        let path = self.inner.route(profile, from, to).await?;
        self.routes.insert(key, Arc::new(path.clone())).await;

        Ok(path)
    }
}
