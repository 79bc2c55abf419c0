//! Demand preparation.
//!
//! Turns the raw order list into routable nodes: resolves delivery
//! addresses, aggregates order-line demand, rejects orders that cannot be
//! routed at all, and prepends the synthetic depot node. Node index 0
//! always denotes the depot.

use std::collections::HashMap;

use crate::error::AssignmentError;
use crate::models::{CapacityConstraints, DeliveryOrder, Demand, Dimension, FillPolicy, GeoPoint,
    UnassignedOrder, UnassignedReason, Vehicle};
use crate::stores::AddressStore;

/// A routable node: the depot (node 0, zero demand) or an order with a
/// resolved location and aggregated demand.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// Order identifier; `None` for the synthetic depot node.
    pub order_id: Option<i64>,
    /// Address the node sits at.
    pub address_id: i64,
    /// Resolved coordinates.
    pub location: GeoPoint,
    /// Aggregated weight/volume demand; zero for the depot.
    pub demand: Demand,
}

impl OrderNode {
    /// Returns `true` for the synthetic depot node.
    pub fn is_depot(&self) -> bool {
        self.order_id.is_none()
    }
}

/// Output of demand preparation.
#[derive(Debug)]
pub struct PreparedOrders {
    /// Routable nodes; `nodes[0]` is the depot.
    pub nodes: Vec<OrderNode>,
    /// Orders removed from further processing, each with a reason.
    pub rejected: Vec<UnassignedOrder>,
}

/// The largest policy-selected capacity figure across the fleet, per
/// dimension.
///
/// `None` when the policy disables the dimension. An order whose demand
/// exceeds this ceiling could never fit any vehicle, regardless of how
/// routing proceeds.
pub fn fleet_ceiling(vehicles: &[Vehicle], dimension: Dimension, policy: FillPolicy) -> Option<f64> {
    vehicles
        .iter()
        .filter_map(|v| v.capacity_for(dimension, policy))
        .fold(None, |acc, cap| {
            Some(match acc {
                Some(best) if best >= cap => best,
                _ => cap,
            })
        })
}

/// Validates and aggregates orders into routable nodes.
///
/// Orders whose address id has no match (or whose address has no location)
/// are rejected with [`UnassignedReason::NoDeliveryAddress`]; orders whose
/// demand exceeds the fleet-wide ceiling of a constrained dimension are
/// rejected with [`UnassignedReason::ExceedsCapacity`]. An unresolvable
/// depot is fatal — the request cannot proceed without one.
pub fn prepare_orders<A: AddressStore>(
    addresses: &A,
    orders: &[DeliveryOrder],
    vehicles: &[Vehicle],
    depot_address_id: i64,
    constraints: &CapacityConstraints,
) -> Result<PreparedOrders, AssignmentError> {
    let mut ids: Vec<i64> = orders.iter().map(|o| o.address_id()).collect();
    ids.push(depot_address_id);
    ids.sort_unstable();
    ids.dedup();

    let known: HashMap<i64, _> = addresses
        .find(&ids)
        .into_iter()
        .map(|a| (a.id(), a))
        .collect();

    let depot = known
        .get(&depot_address_id)
        .ok_or(AssignmentError::DepotNotFound(depot_address_id))?;
    let depot_location = depot
        .location()
        .ok_or(AssignmentError::MissingLocation(depot_address_id))?;

    let weight_ceiling = fleet_ceiling(vehicles, Dimension::Weight, constraints.weight);
    let volume_ceiling = fleet_ceiling(vehicles, Dimension::Volume, constraints.volume);

    let mut nodes = vec![OrderNode {
        order_id: None,
        address_id: depot_address_id,
        location: depot_location,
        demand: Demand::default(),
    }];
    let mut rejected = Vec::new();

    for order in orders {
        let location = known
            .get(&order.address_id())
            .and_then(|a| a.location());
        let Some(location) = location else {
            rejected.push(UnassignedOrder {
                order_id: order.id(),
                reason: UnassignedReason::NoDeliveryAddress,
            });
            continue;
        };

        let demand = order.demand();
        let too_heavy = weight_ceiling.is_some_and(|cap| demand.weight > cap);
        let too_bulky = volume_ceiling.is_some_and(|cap| demand.volume > cap);
        if too_heavy || too_bulky {
            rejected.push(UnassignedOrder {
                order_id: order.id(),
                reason: UnassignedReason::ExceedsCapacity,
            });
            continue;
        }

        nodes.push(OrderNode {
            order_id: Some(order.id()),
            address_id: order.address_id(),
            location,
            demand,
        });
    }

    Ok(PreparedOrders { nodes, rejected })
}
