//! In-memory collaborator implementations.
//!
//! Suitable for tests and for embedders that keep the address book and the
//! distance cache in process memory.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{Address, GeoPoint};

use super::{canonical_pair, AddressStore, DistanceCacheEntry, DistanceCacheStore, ProviderError,
    RoadDistanceProvider};

/// An address store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryAddressStore {
    addresses: HashMap<i64, Address>,
}

impl InMemoryAddressStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an address.
    pub fn insert(&mut self, address: Address) {
        self.addresses.insert(address.id(), address);
    }
}

impl FromIterator<Address> for InMemoryAddressStore {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        let mut store = Self::new();
        for address in iter {
            store.insert(address);
        }
        store
    }
}

impl AddressStore for InMemoryAddressStore {
    fn find(&self, ids: &[i64]) -> Vec<Address> {
        ids.iter()
            .filter_map(|id| self.addresses.get(id).cloned())
            .collect()
    }
}

/// A distance cache backed by a mutex-guarded `HashMap`.
///
/// The single lock makes `upsert` an atomic insert-or-update on the
/// canonical pair, so concurrent writers cannot race a check-then-write
/// into duplicate entries.
#[derive(Debug, Default)]
pub struct InMemoryDistanceCache {
    entries: Mutex<HashMap<(i64, i64), Option<f64>>>,
}

impl InMemoryDistanceCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns `true` if no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DistanceCacheStore for InMemoryDistanceCache {
    fn get(&self, ids: &[i64]) -> Vec<DistanceCacheEntry> {
        let entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .iter()
            .filter(|((loc1, loc2), _)| ids.contains(loc1) && ids.contains(loc2))
            .map(|(&(loc1, loc2), &distance)| DistanceCacheEntry {
                loc1,
                loc2,
                distance,
            })
            .collect()
    }

    fn upsert(&self, loc1: i64, loc2: i64, distance: f64) {
        let key = canonical_pair(loc1, loc2);
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key, Some(distance));
    }
}

/// A road-distance provider that is never available.
///
/// Lets the engine run in pure great-circle mode: every query is reported
/// as unavailable and the resolver falls back to its haversine estimate.
#[derive(Debug, Default)]
pub struct OfflineRoadProvider;

impl RoadDistanceProvider for OfflineRoadProvider {
    fn query(&self, _origin: GeoPoint, _destination: GeoPoint) -> Result<f64, ProviderError> {
        Err(ProviderError::Unavailable("provider disabled".into()))
    }
}
