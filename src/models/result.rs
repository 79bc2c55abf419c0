//! Request and response types for a route calculation.

use serde::{Deserialize, Serialize};

use super::{CalcOptions, DeliveryOrder, GeoPoint, Vehicle};

/// Why an order could not be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnassignedReason {
    /// The order's address id matched no known address, or the address has
    /// no location.
    NoDeliveryAddress,
    /// The order's demand exceeds the largest policy-selected capacity in
    /// the fleet.
    ExceedsCapacity,
    /// No vehicle could take the order in any trip.
    NoVehicleAvailable,
}

impl std::fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            UnassignedReason::NoDeliveryAddress => "no delivery address found",
            UnassignedReason::ExceedsCapacity => "demand exceeds every vehicle's capacity",
            UnassignedReason::NoVehicleAvailable => "no vehicle available",
        };
        f.write_str(text)
    }
}

/// An order left out of every shipment, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedOrder {
    /// Order identifier.
    pub order_id: i64,
    /// Why the order was not routed.
    pub reason: UnassignedReason,
}

/// A single stop on a vehicle's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    /// Address being visited.
    pub address_id: i64,
    /// Order delivered at this stop.
    pub order_id: i64,
    /// 1-based position within the route.
    pub sequence: u32,
    /// Stop coordinates, for map markers.
    pub location: GeoPoint,
    /// Minutes from trip start until service begins at this stop.
    pub start_time: f64,
    /// Distance travelled from the previous point (depot for the first stop).
    pub distance_from_previous: f64,
}

/// One trip of one vehicle: an ordered stop sequence with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Vehicle serving this trip.
    pub vehicle_id: i64,
    /// 1-based trip number, increasing across scheduler rounds.
    pub trip: u32,
    /// Ordered stops, depot departure and return excluded.
    pub route: Vec<RoutePoint>,
    /// Total distance including the return to the depot.
    pub total_distance: f64,
    /// Total minutes including service time and the return leg.
    pub total_time: f64,
    /// Total weight loaded.
    pub total_weight: f64,
    /// Total volume loaded.
    pub total_volume: f64,
    /// Monetary cost from the request's cost model.
    pub total_cost: f64,
    /// Weight used ÷ policy-selected weight limit (0 if the limit is 0).
    pub weight_rate: f64,
    /// Volume used ÷ policy-selected volume limit (0 if the limit is 0).
    pub volume_rate: f64,
}

/// Input to a route calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    /// Available fleet, in dispatch-preference order.
    pub vehicles: Vec<Vehicle>,
    /// Orders to route.
    pub orders: Vec<DeliveryOrder>,
    /// Address id of the depot every trip starts from and returns to.
    pub depot_address_id: i64,
    /// Calculation options.
    pub options: CalcOptions,
}

/// Output of a route calculation.
///
/// Every input order appears in exactly one shipment route or exactly once
/// in `unassigned_orders`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignmentResult {
    /// Emitted trips; vehicles and trips with no stops are omitted.
    pub shipments: Vec<Shipment>,
    /// Orders that could not be routed, each with a reason.
    pub unassigned_orders: Vec<UnassignedOrder>,
}

impl AssignmentResult {
    /// Number of routed stops across all shipments.
    pub fn num_routed(&self) -> usize {
        self.shipments.iter().map(|s| s.route.len()).sum()
    }
}
