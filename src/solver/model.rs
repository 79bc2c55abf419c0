//! Capacitated routing model.

use crate::distance::{DistanceMatrix, DistanceResolver};
use crate::error::AssignmentError;
use crate::models::{Address, CapacityConstraints, Demand, Dimension, Vehicle};
use crate::prepare::OrderNode;
use crate::stores::{DistanceCacheStore, RoadDistanceProvider};

/// Arc-cost multiplier of the overflow slot. High enough that any move off
/// the overflow vehicle pays for itself against real travel costs.
pub const OVERFLOW_ARC_MULTIPLIER: f64 = 1.0e6;

/// Fixed cost of using the overflow slot. It must never beat any feasible
/// real-vehicle assignment.
pub const OVERFLOW_FIXED_COST: f64 = 1.0e15;

/// Fixed-cost increment between consecutive real vehicles. Creates a stable
/// preference for filling earlier vehicles first.
pub const FIXED_COST_STEP: f64 = 1_000.0;

/// One vehicle position in the routing model: a real fleet vehicle or the
/// synthetic overflow slot.
#[derive(Debug, Clone)]
pub struct VehicleSlot {
    /// Identifier of the underlying vehicle; meaningless for the overflow
    /// slot.
    pub vehicle_id: i64,
    /// Policy-selected weight bound; `None` when unbounded.
    pub weight_limit: Option<f64>,
    /// Policy-selected volume bound; `None` when unbounded.
    pub volume_limit: Option<f64>,
    /// Cost charged once if the slot serves any node.
    pub fixed_cost: f64,
    /// Multiplier applied to every arc travelled by this slot.
    pub arc_multiplier: f64,
    /// `true` for the synthetic overflow slot.
    pub overflow: bool,
}

impl VehicleSlot {
    /// Returns `true` if adding `extra` on top of `load` stays within both
    /// capacity bounds.
    pub fn fits(&self, load: Demand, extra: Demand) -> bool {
        self.weight_limit
            .is_none_or(|cap| load.weight + extra.weight <= cap)
            && self
                .volume_limit
                .is_none_or(|cap| load.volume + extra.volume <= cap)
    }
}

/// A candidate assignment of nodes to vehicle slots.
///
/// `routes[s]` is the ordered node sequence of slot `s`, depot excluded.
/// Nodes in `unassigned` were placed nowhere — a complete solution has an
/// empty `unassigned` list.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Per-slot ordered node sequences.
    pub routes: Vec<Vec<usize>>,
    /// Node indices no slot serves.
    pub unassigned: Vec<usize>,
}

impl Assignment {
    /// Creates an assignment with the given number of empty routes.
    pub fn empty(num_slots: usize) -> Self {
        Self {
            routes: vec![Vec::new(); num_slots],
            unassigned: Vec::new(),
        }
    }

    /// Number of nodes placed on any slot.
    pub fn num_assigned(&self) -> usize {
        self.routes.iter().map(|r| r.len()).sum()
    }
}

/// A capacitated-routing problem instance: depot + order nodes, the resolved
/// distance matrix, and vehicle slots (the real fleet plus, in the first
/// trip round, the overflow slot).
///
/// Node index 0 always denotes the depot.
#[derive(Debug)]
pub struct RoutingModel {
    /// Routable nodes; `nodes[0]` is the depot.
    pub nodes: Vec<OrderNode>,
    /// Pairwise distances between node indices.
    pub matrix: DistanceMatrix,
    /// Vehicle slots in dispatch-preference order; the overflow slot, if
    /// present, is last.
    pub slots: Vec<VehicleSlot>,
}

impl RoutingModel {
    /// Builds a model over `nodes` for the given vehicle pool.
    ///
    /// Distances are resolved through `resolver` (which memoizes by
    /// canonical address pair, so duplicate addresses cost one resolution).
    /// Capacity bounds come from the per-dimension fill policy; a disabled
    /// dimension leaves the bound open. With `include_overflow`, a synthetic
    /// unbounded, maximal-cost slot is appended so that a complete solution
    /// always exists.
    pub fn build<C: DistanceCacheStore, P: RoadDistanceProvider>(
        nodes: Vec<OrderNode>,
        vehicles: &[Vehicle],
        constraints: &CapacityConstraints,
        include_overflow: bool,
        resolver: &mut DistanceResolver<'_, C, P>,
    ) -> Result<Self, AssignmentError> {
        let matrix = DistanceMatrix::try_symmetric(nodes.len(), |i, j| {
            let a = Address::new(nodes[i].address_id).with_location(nodes[i].location);
            let b = Address::new(nodes[j].address_id).with_location(nodes[j].location);
            resolver.distance(&a, &b)
        })?;

        let mut slots: Vec<VehicleSlot> = vehicles
            .iter()
            .enumerate()
            .map(|(index, vehicle)| VehicleSlot {
                vehicle_id: vehicle.id(),
                weight_limit: vehicle.capacity_for(Dimension::Weight, constraints.weight),
                volume_limit: vehicle.capacity_for(Dimension::Volume, constraints.volume),
                fixed_cost: index as f64 * FIXED_COST_STEP,
                arc_multiplier: 1.0,
                overflow: false,
            })
            .collect();
        if include_overflow {
            slots.push(VehicleSlot {
                vehicle_id: -1,
                weight_limit: None,
                volume_limit: None,
                fixed_cost: OVERFLOW_FIXED_COST,
                arc_multiplier: OVERFLOW_ARC_MULTIPLIER,
                overflow: true,
            });
        }

        Ok(Self {
            nodes,
            matrix,
            slots,
        })
    }

    /// Number of order nodes (excluding the depot).
    pub fn num_orders(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Demand at a node; zero at the depot.
    pub fn demand(&self, node: usize) -> Demand {
        self.nodes[node].demand
    }

    /// Objective cost of traversing the arc `i → j` with slot `slot`.
    ///
    /// Arcs touching the depot are free; other arcs cost the resolved
    /// distance scaled by the slot's multiplier.
    pub fn arc_cost(&self, slot: usize, i: usize, j: usize) -> f64 {
        if i == 0 || j == 0 {
            0.0
        } else {
            self.matrix.get(i, j) * self.slots[slot].arc_multiplier
        }
    }

    /// Total load of a route.
    pub fn route_load(&self, route: &[usize]) -> Demand {
        route
            .iter()
            .fold(Demand::default(), |acc, &n| acc.plus(self.demand(n)))
    }

    /// Physical route distance `depot → … → depot`, unscaled.
    pub fn route_distance(&self, route: &[usize]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let mut distance = self.matrix.get(0, route[0]);
        for pair in route.windows(2) {
            distance += self.matrix.get(pair[0], pair[1]);
        }
        distance + self.matrix.get(route[route.len() - 1], 0)
    }

    /// Objective cost of a route on a slot: fixed cost (if used) plus
    /// scaled arc costs.
    pub fn route_cost(&self, slot: usize, route: &[usize]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let mut cost = self.slots[slot].fixed_cost + self.arc_cost(slot, 0, route[0]);
        for pair in route.windows(2) {
            cost += self.arc_cost(slot, pair[0], pair[1]);
        }
        cost + self.arc_cost(slot, route[route.len() - 1], 0)
    }

    /// Objective cost of a whole assignment.
    pub fn total_cost(&self, assignment: &Assignment) -> f64 {
        assignment
            .routes
            .iter()
            .enumerate()
            .map(|(slot, route)| self.route_cost(slot, route))
            .sum()
    }

    /// Returns `true` if every route respects its slot's capacity bounds.
    pub fn within_capacity(&self, assignment: &Assignment) -> bool {
        assignment.routes.iter().enumerate().all(|(slot, route)| {
            self.slots[slot].fits(Demand::default(), self.route_load(route))
        })
    }

    /// Returns `true` for a solution the escalator may accept: every
    /// non-depot node is served exactly once and all capacity bounds hold.
    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        if !assignment.unassigned.is_empty() {
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        for route in &assignment.routes {
            for &node in route {
                if node == 0 || seen[node] {
                    return false;
                }
                seen[node] = true;
            }
        }
        seen.iter().skip(1).all(|&s| s) && self.within_capacity(assignment)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{FillPolicy, GeoPoint};
    use crate::stores::memory::{InMemoryDistanceCache, OfflineRoadProvider};

    /// Builds a model with orders on a line of longitude, one per weight
    /// figure, and a fleet bounded by maximum weight.
    pub(crate) fn line_model(weights: &[f64], capacities: &[f64], overflow: bool) -> RoutingModel {
        let mut nodes = vec![OrderNode {
            order_id: None,
            address_id: 0,
            location: GeoPoint::new(0.0, 0.0),
            demand: Demand::default(),
        }];
        for (i, &w) in weights.iter().enumerate() {
            nodes.push(OrderNode {
                order_id: Some(100 + i as i64),
                address_id: 1 + i as i64,
                location: GeoPoint::new(0.0, 0.001 * (i + 1) as f64),
                demand: Demand::new(w, 0.0),
            });
        }
        let vehicles: Vec<Vehicle> = capacities
            .iter()
            .enumerate()
            .map(|(i, &cap)| Vehicle::new(1 + i as i64).with_weight(0.0, 0.0, cap))
            .collect();
        let constraints = CapacityConstraints {
            weight: FillPolicy::Maximum,
            volume: FillPolicy::Disabled,
        };
        let cache = InMemoryDistanceCache::new();
        let provider = OfflineRoadProvider;
        let mut resolver = DistanceResolver::new(&cache, &provider).with_threshold(f64::INFINITY);
        RoutingModel::build(nodes, &vehicles, &constraints, overflow, &mut resolver)
            .expect("all nodes located")
    }

    #[test]
    fn test_build_slots_and_fixed_costs() {
        let model = line_model(&[5.0, 5.0], &[10.0, 10.0], true);
        assert_eq!(model.slots.len(), 3);
        assert_eq!(model.slots[0].fixed_cost, 0.0);
        assert_eq!(model.slots[1].fixed_cost, FIXED_COST_STEP);
        assert!(model.slots[2].overflow);
        assert_eq!(model.slots[2].fixed_cost, OVERFLOW_FIXED_COST);
        assert!(model.slots[2].weight_limit.is_none());
    }

    #[test]
    fn test_depot_arcs_are_free() {
        let model = line_model(&[5.0, 5.0], &[10.0], false);
        assert_eq!(model.arc_cost(0, 0, 1), 0.0);
        assert_eq!(model.arc_cost(0, 2, 0), 0.0);
        assert!(model.arc_cost(0, 1, 2) > 0.0);
    }

    #[test]
    fn test_overflow_arcs_are_scaled() {
        let model = line_model(&[5.0, 5.0], &[10.0], true);
        let real = model.arc_cost(0, 1, 2);
        let overflow = model.arc_cost(1, 1, 2);
        assert!((overflow / real - OVERFLOW_ARC_MULTIPLIER).abs() < 1e-3);
    }

    #[test]
    fn test_route_distance_includes_depot_legs() {
        let model = line_model(&[5.0], &[10.0], false);
        let d = model.route_distance(&[1]);
        assert!((d - 2.0 * model.matrix.get(0, 1)).abs() < 1e-9);
        assert_eq!(model.route_distance(&[]), 0.0);
    }

    #[test]
    fn test_feasibility_checks() {
        let model = line_model(&[5.0, 6.0], &[10.0], false);

        let mut complete = Assignment::empty(1);
        complete.routes[0] = vec![1, 2];
        // 11 > 10: capacity violated.
        assert!(!model.is_feasible(&complete));

        let mut partial = Assignment::empty(1);
        partial.routes[0] = vec![1];
        partial.unassigned = vec![2];
        assert!(!model.is_feasible(&partial));

        let model = line_model(&[5.0, 6.0], &[12.0], false);
        let mut ok = Assignment::empty(1);
        ok.routes[0] = vec![2, 1];
        assert!(model.is_feasible(&ok));
    }

    #[test]
    fn test_duplicate_node_is_infeasible() {
        let model = line_model(&[1.0, 1.0], &[10.0, 10.0], false);
        let mut asg = Assignment::empty(2);
        asg.routes[0] = vec![1, 2];
        asg.routes[1] = vec![2];
        assert!(!model.is_feasible(&asg));
    }
}
