//! Deterministic greedy fallback assigner.
//!
//! Engaged only when every search strategy fails. A single bin-packing
//! pass with no backtracking: it trades route quality for the guarantee
//! that the request still gets an answer.

use log::warn;

use crate::models::Demand;
use crate::solver::{Assignment, RoutingModel};

/// Remaining weight below which a vehicle stops accepting orders.
const WEIGHT_CUTOFF: f64 = 1.0;
/// Remaining volume below which a vehicle stops accepting orders.
const VOLUME_CUTOFF: f64 = 0.1;

/// Packs orders onto vehicles by decreasing combined demand.
///
/// 1. Non-depot nodes are sorted descending by weight + volume (ties broken
///    by node index, keeping the pass deterministic).
/// 2. Each real vehicle, in pool order, accepts nodes from the front of the
///    remaining list while they fit its leftover budget; once the leftover
///    weight drops under 1 unit or the leftover volume under 0.1 units the
///    vehicle is considered full.
/// 3. Accepted nodes are sequenced in their sorted order — no distance
///    re-optimization.
///
/// Nodes accepted by no vehicle stay in the assignment's `unassigned` list.
pub fn greedy_fallback(model: &RoutingModel) -> Assignment {
    warn!("engaging greedy fallback assignment for {} orders", model.num_orders());

    let mut remaining: Vec<usize> = (1..model.nodes.len()).collect();
    remaining.sort_by(|&a, &b| {
        model
            .demand(b)
            .combined()
            .partial_cmp(&model.demand(a).combined())
            .expect("demand should not be NaN")
            .then(a.cmp(&b))
    });

    let mut assignment = Assignment::empty(model.slots.len());

    for (slot_idx, slot) in model.slots.iter().enumerate() {
        if slot.overflow || remaining.is_empty() {
            continue;
        }

        let mut load = Demand::default();
        let mut route = Vec::new();
        let mut rest = Vec::with_capacity(remaining.len());
        let mut drained = remaining.into_iter();

        for node in drained.by_ref() {
            let demand = model.demand(node);
            if !slot.fits(load, demand) {
                rest.push(node);
                continue;
            }
            route.push(node);
            load = load.plus(demand);

            let weight_exhausted = slot
                .weight_limit
                .is_some_and(|cap| cap - load.weight < WEIGHT_CUTOFF);
            let volume_exhausted = slot
                .volume_limit
                .is_some_and(|cap| cap - load.volume < VOLUME_CUTOFF);
            if weight_exhausted || volume_exhausted {
                break;
            }
        }
        rest.extend(drained);

        assignment.routes[slot_idx] = route;
        remaining = rest;
    }

    assignment.unassigned = remaining;
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::tests::line_model;

    #[test]
    fn test_greedy_sorts_by_demand_descending() {
        let model = line_model(&[2.0, 9.0, 5.0], &[20.0], false);
        let asg = greedy_fallback(&model);
        // Heaviest first: node 2 (9.0), node 3 (5.0), node 1 (2.0).
        assert_eq!(asg.routes[0], vec![2, 3, 1]);
        assert!(asg.unassigned.is_empty());
    }

    #[test]
    fn test_greedy_respects_capacity() {
        let model = line_model(&[8.0, 8.0, 8.0], &[16.0, 16.0], false);
        let asg = greedy_fallback(&model);
        assert!(model.within_capacity(&asg));
        assert_eq!(asg.num_assigned(), 3);
        assert!(asg.unassigned.is_empty());
    }

    #[test]
    fn test_greedy_leaves_unfittable_unassigned() {
        let model = line_model(&[9.0, 9.0, 9.0], &[10.0], false);
        let asg = greedy_fallback(&model);
        assert_eq!(asg.num_assigned(), 1);
        assert_eq!(asg.unassigned.len(), 2);
    }

    #[test]
    fn test_greedy_cutoff_stops_scanning() {
        // Capacity 10, first node takes 9.5: remaining 0.5 < 1.0 cutoff, so
        // the 0.2-unit node is not considered for this vehicle.
        let model = line_model(&[9.5, 0.2], &[10.0], false);
        let asg = greedy_fallback(&model);
        assert_eq!(asg.routes[0], vec![1]);
        assert_eq!(asg.unassigned, vec![2]);
    }

    #[test]
    fn test_greedy_skips_overflow_slot() {
        let model = line_model(&[5.0, 5.0, 5.0], &[10.0], true);
        let asg = greedy_fallback(&model);
        let overflow = model.slots.len() - 1;
        assert!(asg.routes[overflow].is_empty());
        assert_eq!(asg.num_assigned(), 2);
        assert_eq!(asg.unassigned.len(), 1);
    }
}
