//! Domain model types for delivery-order assignment.
//!
//! Provides the request-scoped entities: geographic points and addresses,
//! vehicles with per-dimension capacity figures, delivery orders with
//! aggregated demand, calculation options, and the shipment/unassigned
//! response representation.

mod address;
mod options;
mod order;
mod point;
mod result;
mod vehicle;

pub use address::Address;
pub use options::{CalcOptions, CapacityConstraints, CostKind, CostWeight, FillPolicy,
    StrategyPreference};
pub use order::{DeliveryOrder, Demand, OrderLine};
pub use point::GeoPoint;
pub use result::{AssignmentRequest, AssignmentResult, RoutePoint, Shipment, UnassignedOrder,
    UnassignedReason};
pub use vehicle::{Dimension, Vehicle};
