//! Collaborator interfaces for persistence and external services.
//!
//! The routing core consumes these as traits only: an address store, a
//! persisted pairwise-distance cache, and an external road-distance
//! provider. [`memory`] holds in-memory implementations used by tests and
//! by embedders that do not need persistence.

pub mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Address, GeoPoint};

/// A persisted distance between two addresses, keyed by the canonical
/// unordered pair (`loc1 < loc2`).
///
/// The distance may be absent for pairs that were registered but never
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceCacheEntry {
    /// Smaller address id of the pair.
    pub loc1: i64,
    /// Larger address id of the pair.
    pub loc2: i64,
    /// Cached distance, if known.
    pub distance: Option<f64>,
}

/// Canonicalizes an unordered address-id pair as `(min, max)`.
///
/// # Examples
///
/// ```
/// use fleet_routing::stores::canonical_pair;
///
/// assert_eq!(canonical_pair(9, 4), (4, 9));
/// assert_eq!(canonical_pair(4, 9), (4, 9));
/// ```
pub fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Read access to the external address store.
pub trait AddressStore {
    /// Returns the known addresses among `ids`; missing ids are simply
    /// absent from the result.
    fn find(&self, ids: &[i64]) -> Vec<Address>;
}

/// The persisted pairwise-distance cache.
///
/// `upsert` must be an atomic insert-or-update on the canonical pair so
/// concurrent writers cannot create duplicate entries.
pub trait DistanceCacheStore {
    /// Returns cached entries whose both endpoints are in `ids`.
    fn get(&self, ids: &[i64]) -> Vec<DistanceCacheEntry>;

    /// Inserts or overwrites the distance for the canonical pair of
    /// `loc1`/`loc2`.
    fn upsert(&self, loc1: i64, loc2: i64, distance: f64);
}

/// Failure of the external road-distance provider.
///
/// Every variant is absorbed by the resolver: the request degrades to the
/// great-circle estimate instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network failure or non-success response.
    #[error("road distance provider unavailable: {0}")]
    Unavailable(String),
    /// The provider responded but the payload could not be interpreted.
    #[error("malformed provider response: {0}")]
    Malformed(String),
    /// The provider is not configured with credentials.
    #[error("provider credentials missing")]
    MissingCredentials,
}

/// An external service resolving road distance between two points.
pub trait RoadDistanceProvider {
    /// Queries the road distance from `origin` to `destination`.
    fn query(&self, origin: GeoPoint, destination: GeoPoint) -> Result<f64, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_canonical_pair_is_order_independent(a in -1000i64..1000, b in -1000i64..1000) {
            prop_assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
            let (lo, hi) = canonical_pair(a, b);
            prop_assert!(lo <= hi);
        }
    }
}
