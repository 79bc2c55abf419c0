//! Result assembly: turning solved routes into shipments.

use crate::models::{CapacityConstraints, Demand, Dimension, RoutePoint, Shipment, Vehicle};
use crate::scheduler::SchedulerConfig;
use crate::solver::RoutingModel;

/// Travel time in minutes for `meters` at `speed_kmh`.
fn travel_minutes(meters: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }
    meters / 1000.0 / speed_kmh * 60.0
}

/// Utilization ratio of `used` against an optional limit; 0 when the limit
/// is absent or zero.
fn utilization(used: f64, limit: Option<f64>) -> f64 {
    match limit {
        Some(cap) if cap > 0.0 => used / cap,
        _ => 0.0,
    }
}

/// Builds the shipment for one vehicle trip.
///
/// Walks the route accumulating distance and time: each stop adds the
/// travel leg from the previous point plus the per-stop service time, and
/// the totals include the return leg to the depot. Sequence numbers are
/// 1-based; `start_time` is the cumulative minute at which service begins
/// at the stop.
pub fn assemble_shipment(
    model: &RoutingModel,
    route: &[usize],
    vehicle: &Vehicle,
    trip: u32,
    constraints: &CapacityConstraints,
    cost_per_km: f64,
    config: &SchedulerConfig,
) -> Shipment {
    let mut points = Vec::with_capacity(route.len());
    let mut elapsed = 0.0;
    let mut total_distance = 0.0;
    let mut load = Demand::default();
    let mut prev = 0usize;

    for &node_idx in route {
        let node = &model.nodes[node_idx];
        let Some(order_id) = node.order_id else {
            continue;
        };
        let leg = model.matrix.get(prev, node_idx);
        total_distance += leg;
        elapsed += travel_minutes(leg, config.average_speed_kmh);

        points.push(RoutePoint {
            address_id: node.address_id,
            order_id,
            sequence: points.len() as u32 + 1,
            location: node.location,
            start_time: elapsed,
            distance_from_previous: leg,
        });

        elapsed += config.service_minutes;
        load = load.plus(node.demand);
        prev = node_idx;
    }

    let return_leg = model.matrix.get(prev, 0);
    total_distance += return_leg;
    let total_time = elapsed + travel_minutes(return_leg, config.average_speed_kmh);

    let weight_limit = vehicle.capacity_for(Dimension::Weight, constraints.weight);
    let volume_limit = vehicle.capacity_for(Dimension::Volume, constraints.volume);

    Shipment {
        vehicle_id: vehicle.id(),
        trip,
        route: points,
        total_distance,
        total_time,
        total_weight: load.weight,
        total_volume: load.volume,
        total_cost: cost_per_km * total_distance / 1000.0,
        weight_rate: utilization(load.weight, weight_limit),
        volume_rate: utilization(load.volume, volume_limit),
    }
}
