//! Address type.

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A known delivery or depot address.
///
/// Addresses are owned by an external address store; the routing core only
/// reads them. The location may be absent for addresses that have not been
/// geocoded yet — such addresses cannot be routed to.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{Address, GeoPoint};
///
/// let a = Address::new(42).with_location(GeoPoint::new(0.0, 1.0));
/// assert_eq!(a.id(), 42);
/// assert!(a.location().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    id: i64,
    location: Option<GeoPoint>,
}

impl Address {
    /// Creates an address with the given identifier and no location.
    pub fn new(id: i64) -> Self {
        Self { id, location: None }
    }

    /// Sets the geocoded location.
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Unique address identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Geocoded location, if known.
    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }
}
