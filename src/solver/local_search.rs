//! Deadline-aware local search over an assignment.
//!
//! Three move families, applied first-improvement until the assignment
//! stops improving or the budget runs out:
//!
//! - **insertion** — place unassigned nodes at their cheapest feasible
//!   position (completeness before cost),
//! - **relocate** — move a node to a better position on another slot; with
//!   the overflow slot's huge arc multiplier this is also what drains the
//!   overflow vehicle back onto the real fleet,
//! - **2-opt** — intra-route segment reversal (Croes, 1958).

use rand::Rng;

use crate::models::Demand;

use super::deadline::Deadline;
use super::model::{Assignment, RoutingModel};

const EPSILON: f64 = 1e-9;

/// Objective change from inserting `node` at `pos` of `route` on `slot`.
fn insertion_delta(
    model: &RoutingModel,
    slot: usize,
    route: &[usize],
    pos: usize,
    node: usize,
) -> f64 {
    let prev = if pos == 0 { 0 } else { route[pos - 1] };
    let next = if pos == route.len() { 0 } else { route[pos] };
    let mut delta = model.arc_cost(slot, prev, node) + model.arc_cost(slot, node, next)
        - model.arc_cost(slot, prev, next);
    if route.is_empty() {
        delta += model.slots[slot].fixed_cost;
    }
    delta
}

/// Objective change from removing the node at `pos` of `route` on `slot`.
fn removal_delta(model: &RoutingModel, slot: usize, route: &[usize], pos: usize) -> f64 {
    let node = route[pos];
    let prev = if pos == 0 { 0 } else { route[pos - 1] };
    let next = if pos == route.len() - 1 { 0 } else { route[pos + 1] };
    let mut delta = model.arc_cost(slot, prev, next)
        - model.arc_cost(slot, prev, node)
        - model.arc_cost(slot, node, next);
    if route.len() == 1 {
        delta -= model.slots[slot].fixed_cost;
    }
    delta
}

/// Places unassigned nodes at their cheapest feasible position.
///
/// Insertions are accepted regardless of cost: serving a node always beats
/// leaving it unserved. Returns `true` if anything was placed.
fn insert_unassigned(model: &RoutingModel, assignment: &mut Assignment, deadline: &Deadline) -> bool {
    let mut any = false;
    let pending = std::mem::take(&mut assignment.unassigned);
    for node in pending {
        if deadline.expired() {
            assignment.unassigned.push(node);
            continue;
        }
        let demand = model.demand(node);
        let mut best: Option<(usize, usize, f64)> = None;
        for (slot, route) in assignment.routes.iter().enumerate() {
            if !model.slots[slot].fits(model.route_load(route), demand) {
                continue;
            }
            for pos in 0..=route.len() {
                let delta = insertion_delta(model, slot, route, pos, node);
                if best.is_none_or(|(_, _, cost)| delta < cost) {
                    best = Some((slot, pos, delta));
                }
            }
        }
        match best {
            Some((slot, pos, _)) => {
                assignment.routes[slot].insert(pos, node);
                any = true;
            }
            None => assignment.unassigned.push(node),
        }
    }
    any
}

/// One round of first-improvement inter-route relocation.
///
/// Returns `true` if a move was applied; the caller rescans until quiet.
fn relocate_once(model: &RoutingModel, assignment: &mut Assignment, deadline: &Deadline) -> bool {
    let num_slots = assignment.routes.len();
    for from in 0..num_slots {
        if deadline.expired() {
            return false;
        }
        for pos_from in 0..assignment.routes[from].len() {
            let node = assignment.routes[from][pos_from];
            let demand = model.demand(node);
            let removal = removal_delta(model, from, &assignment.routes[from], pos_from);

            for to in 0..num_slots {
                // The overflow slot only receives from construction; moves
                // into it never serve the dispatch objective.
                if to == from || model.slots[to].overflow {
                    continue;
                }
                let load = model.route_load(&assignment.routes[to]);
                if !model.slots[to].fits(load, demand) {
                    continue;
                }
                for pos_to in 0..=assignment.routes[to].len() {
                    let delta =
                        removal + insertion_delta(model, to, &assignment.routes[to], pos_to, node);
                    if delta < -EPSILON {
                        assignment.routes[from].remove(pos_from);
                        assignment.routes[to].insert(pos_to, node);
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Intra-route 2-opt over every slot.
///
/// For edge pairs `(i-1, i)` and `(j, j+1)`, reversing the segment
/// `[i..=j]` is accepted when it shortens the route under the slot's arc
/// costs. Returns `true` if any reversal was applied.
fn two_opt_pass(model: &RoutingModel, assignment: &mut Assignment, deadline: &Deadline) -> bool {
    let mut any = false;
    for (slot, route) in assignment.routes.iter_mut().enumerate() {
        if route.len() < 2 {
            continue;
        }
        let mut improved = true;
        while improved && !deadline.expired() {
            improved = false;
            let len = route.len();
            for i in 0..len - 1 {
                for j in i + 1..len {
                    let prev = if i == 0 { 0 } else { route[i - 1] };
                    let next = if j == len - 1 { 0 } else { route[j + 1] };
                    let old_cost = model.arc_cost(slot, prev, route[i])
                        + model.arc_cost(slot, route[j], next);
                    let new_cost = model.arc_cost(slot, prev, route[j])
                        + model.arc_cost(slot, route[i], next);
                    if new_cost - old_cost < -EPSILON {
                        route[i..=j].reverse();
                        improved = true;
                        any = true;
                    }
                }
            }
        }
    }
    any
}

/// Improves an assignment in place until no move helps or the deadline
/// expires.
pub fn improve(model: &RoutingModel, assignment: &mut Assignment, deadline: &Deadline) {
    loop {
        let mut improved = insert_unassigned(model, assignment, deadline);
        while relocate_once(model, assignment, deadline) {
            improved = true;
        }
        improved |= two_opt_pass(model, assignment, deadline);
        if !improved || deadline.expired() {
            break;
        }
    }
}

/// Kicks an assignment out of a local optimum by unassigning a random
/// fifth of the served nodes (at least one).
///
/// The caller re-runs [`improve`] to repair; a seeded generator keeps the
/// walk deterministic.
pub fn perturb(assignment: &mut Assignment, rng: &mut impl Rng) {
    let assigned = assignment.num_assigned();
    if assigned == 0 {
        return;
    }
    let kicks = (assigned / 5).max(1);
    for _ in 0..kicks {
        let nonempty: Vec<usize> = assignment
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .map(|(s, _)| s)
            .collect();
        let Some(&slot) = nonempty.get(rng.random_range(0..nonempty.len())) else {
            return;
        };
        let pos = rng.random_range(0..assignment.routes[slot].len());
        let node = assignment.routes[slot].remove(pos);
        assignment.unassigned.push(node);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::solver::model::tests::line_model;

    fn generous() -> Deadline {
        Deadline::after(Duration::from_secs(60))
    }

    #[test]
    fn test_insertion_completes_assignment() {
        let model = line_model(&[5.0, 5.0], &[20.0], false);
        let mut asg = Assignment::empty(1);
        asg.unassigned = vec![1, 2];
        improve(&model, &mut asg, &generous());
        assert!(asg.unassigned.is_empty());
        assert_eq!(asg.num_assigned(), 2);
        assert!(model.is_feasible(&asg));
    }

    #[test]
    fn test_insertion_respects_capacity() {
        let model = line_model(&[5.0, 6.0], &[5.0], false);
        let mut asg = Assignment::empty(1);
        asg.unassigned = vec![1, 2];
        improve(&model, &mut asg, &generous());
        assert_eq!(asg.num_assigned(), 1);
        assert_eq!(asg.unassigned, vec![2]);
    }

    #[test]
    fn test_relocate_drains_overflow() {
        let model = line_model(&[5.0, 5.0], &[20.0], true);
        let overflow = model.slots.len() - 1;
        let mut asg = Assignment::empty(model.slots.len());
        asg.routes[overflow] = vec![1, 2];
        improve(&model, &mut asg, &generous());
        assert!(asg.routes[overflow].is_empty(), "overflow should drain");
        assert_eq!(asg.routes[0].len(), 2);
        assert!(model.is_feasible(&asg));
    }

    #[test]
    fn test_relocate_keeps_overflow_when_fleet_is_full() {
        let model = line_model(&[5.0, 5.0, 5.0], &[10.0], true);
        let overflow = model.slots.len() - 1;
        let mut asg = Assignment::empty(model.slots.len());
        asg.routes[0] = vec![1, 2];
        asg.routes[overflow] = vec![3];
        improve(&model, &mut asg, &generous());
        assert_eq!(asg.routes[0].len(), 2);
        assert_eq!(asg.routes[overflow], vec![3]);
    }

    #[test]
    fn test_two_opt_orders_line_route() {
        let model = line_model(&[1.0, 1.0, 1.0, 1.0], &[10.0], false);
        let mut asg = Assignment::empty(1);
        asg.routes[0] = vec![3, 1, 4, 2]; // deliberately tangled
        let before = model.route_cost(0, &asg.routes[0]);
        improve(&model, &mut asg, &generous());
        let after = model.route_cost(0, &asg.routes[0]);
        assert!(after <= before + 1e-9);
        // On a line the interior-optimal order is monotone.
        let mut sorted = asg.routes[0].clone();
        sorted.sort_unstable();
        assert!(asg.routes[0] == sorted || asg.routes[0].iter().rev().eq(sorted.iter()));
    }

    #[test]
    fn test_perturb_unassigns_some_nodes() {
        let mut asg = Assignment::empty(1);
        asg.routes[0] = (1..=10).collect();
        let mut rng = StdRng::seed_from_u64(7);
        perturb(&mut asg, &mut rng);
        assert_eq!(asg.unassigned.len(), 2);
        assert_eq!(asg.num_assigned(), 8);
    }

    #[test]
    fn test_improve_is_deadline_bounded() {
        let model = line_model(&[1.0; 6], &[20.0], false);
        let mut asg = Assignment::empty(1);
        asg.unassigned = (1..=6).collect();
        let expired = Deadline::after(Duration::ZERO);
        improve(&model, &mut asg, &expired);
        // Nothing placed once the budget is already spent.
        assert_eq!(asg.unassigned.len(), 6);
    }
}
