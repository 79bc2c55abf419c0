//! Distance resolution with cache and provider escalation.

use std::collections::HashMap;

use log::warn;

use crate::error::AssignmentError;
use crate::models::Address;
use crate::stores::{canonical_pair, DistanceCacheStore, RoadDistanceProvider};

use super::haversine::great_circle;

/// Default distance above which the great-circle estimate is no longer
/// trusted and the external provider is queried.
pub const DEFAULT_PROVIDER_THRESHOLD: f64 = 1000.0;

/// Resolves and caches travel distances between addresses.
///
/// Resolution order for a pair of distinct addresses:
///
/// 1. the request-scoped snapshot (persisted cache entries preloaded via
///    [`preload`](DistanceResolver::preload), plus pairs already resolved
///    during this request),
/// 2. the great-circle estimate, returned directly when below the provider
///    threshold,
/// 3. the external road-distance provider, whose result is persisted; any
///    provider failure degrades to the great-circle estimate with a
///    warning — a routing request never fails because the provider is down.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::DistanceResolver;
/// use fleet_routing::models::{Address, GeoPoint};
/// use fleet_routing::stores::memory::{InMemoryDistanceCache, OfflineRoadProvider};
///
/// let cache = InMemoryDistanceCache::new();
/// let provider = OfflineRoadProvider;
/// let mut resolver = DistanceResolver::new(&cache, &provider);
///
/// let a = Address::new(1).with_location(GeoPoint::new(0.0, 0.0));
/// let b = Address::new(2).with_location(GeoPoint::new(0.0, 0.01));
/// let d = resolver.distance(&a, &b).unwrap();
/// assert!(d > 1000.0 && d < 1200.0);
/// ```
pub struct DistanceResolver<'a, C, P> {
    cache: &'a C,
    provider: &'a P,
    threshold: f64,
    snapshot: HashMap<(i64, i64), f64>,
}

impl<'a, C: DistanceCacheStore, P: RoadDistanceProvider> DistanceResolver<'a, C, P> {
    /// Creates a resolver over the given cache store and provider, with the
    /// default provider threshold.
    pub fn new(cache: &'a C, provider: &'a P) -> Self {
        Self {
            cache,
            provider,
            threshold: DEFAULT_PROVIDER_THRESHOLD,
            snapshot: HashMap::new(),
        }
    }

    /// Sets the distance threshold above which the provider is consulted.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Loads the persisted cache entries among `ids` into the
    /// request-scoped snapshot.
    ///
    /// Staleness across requests is acceptable; a re-resolved distance
    /// simply overwrites the persisted value.
    pub fn preload(&mut self, ids: &[i64]) {
        for entry in self.cache.get(ids) {
            if let Some(distance) = entry.distance {
                self.snapshot
                    .insert(canonical_pair(entry.loc1, entry.loc2), distance);
            }
        }
    }

    /// Resolves the travel distance between two addresses, in meters.
    ///
    /// Returns 0 for the same address without touching the cache. Fails
    /// only when an address involved has no location.
    pub fn distance(&mut self, a: &Address, b: &Address) -> Result<f64, AssignmentError> {
        if a.id() == b.id() {
            return Ok(0.0);
        }

        let key = canonical_pair(a.id(), b.id());
        if let Some(&cached) = self.snapshot.get(&key) {
            return Ok(cached);
        }

        let origin = a
            .location()
            .ok_or(AssignmentError::MissingLocation(a.id()))?;
        let destination = b
            .location()
            .ok_or(AssignmentError::MissingLocation(b.id()))?;

        let estimate = great_circle(origin, destination);
        if estimate < self.threshold {
            self.snapshot.insert(key, estimate);
            return Ok(estimate);
        }

        let resolved = match self.provider.query(origin, destination) {
            Ok(road) => {
                self.cache.upsert(key.0, key.1, road);
                road
            }
            Err(err) => {
                warn!(
                    "road distance provider failed for pair ({}, {}): {err}; using great-circle estimate",
                    key.0, key.1
                );
                estimate
            }
        };
        self.snapshot.insert(key, resolved);
        Ok(resolved)
    }
}
