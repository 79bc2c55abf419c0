//! Constructive heuristics for an initial assignment.
//!
//! All three builders place every node they can on the real fleet and push
//! what is left onto the overflow slot when the model carries one;
//! otherwise the leftovers are reported unassigned. Each polls the deadline
//! and bails out with `None` when the budget is spent mid-construction.
//!
//! - [`cheapest_arc`] — greedy nearest-feasible path extension, O(n²)
//! - [`savings`] — Clarke-Wright savings merge (1964), O(n² log n)
//! - [`sweep`] — polar-angle sweep packing (Gillett & Miller, 1974), O(n log n)

use crate::models::Demand;

use super::deadline::Deadline;
use super::model::{Assignment, RoutingModel};

/// Indices of the model's real (non-overflow) slots, in preference order.
fn real_slots(model: &RoutingModel) -> Vec<usize> {
    model
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.overflow)
        .map(|(i, _)| i)
        .collect()
}

/// Puts `leftovers` on the overflow slot if the model has one, otherwise
/// marks them unassigned.
fn absorb_leftovers(model: &RoutingModel, assignment: &mut Assignment, leftovers: Vec<usize>) {
    if leftovers.is_empty() {
        return;
    }
    match model.slots.iter().position(|s| s.overflow) {
        Some(overflow) => assignment.routes[overflow].extend(leftovers),
        None => assignment.unassigned.extend(leftovers),
    }
}

/// Extends each slot's route by the nearest unserved node that still fits,
/// slot by slot in preference order.
///
/// Cheapest-arc path extension: starting at the depot, repeatedly travel
/// the cheapest arc to a node the vehicle can still carry.
pub fn cheapest_arc(model: &RoutingModel, deadline: &Deadline) -> Option<Assignment> {
    let n = model.nodes.len();
    let mut assignment = Assignment::empty(model.slots.len());
    if n <= 1 {
        return Some(assignment);
    }

    let mut remaining: Vec<usize> = (1..n).collect();

    for (slot_idx, slot) in model.slots.iter().enumerate() {
        let mut current = 0usize;
        let mut load = Demand::default();
        let mut route = Vec::new();

        loop {
            if deadline.expired() {
                return None;
            }
            let candidates: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&node| slot.fits(load, model.demand(node)))
                .collect();
            let Some(next) = model.matrix.nearest_neighbor(current, &candidates) else {
                break;
            };
            remaining.retain(|&node| node != next);
            load = load.plus(model.demand(next));
            route.push(next);
            current = next;
        }
        assignment.routes[slot_idx] = route;

        if remaining.is_empty() {
            break;
        }
    }

    assignment.unassigned = remaining;
    Some(assignment)
}

/// A savings value for merging two nodes' routes.
#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: f64,
}

/// Clarke-Wright savings construction.
///
/// # Algorithm
///
/// Starts with each node on its own route (depot → node → depot) and merges
/// route ends in decreasing order of the savings
///
/// ```text
/// s(i, j) = d(0, i) + d(0, j) - d(i, j)
/// ```
///
/// subject to the loosest per-dimension capacity in the real fleet. The
/// merged clusters are then placed onto concrete vehicles largest-first;
/// clusters no vehicle can take spill onto the overflow slot.
///
/// # Reference
///
/// Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
/// Depot to a Number of Delivery Points", *Operations Research* 12(4).
pub fn savings(model: &RoutingModel, deadline: &Deadline) -> Option<Assignment> {
    let n = model.nodes.len();
    let mut assignment = Assignment::empty(model.slots.len());
    if n <= 1 {
        return Some(assignment);
    }

    let real = real_slots(model);
    // Per dimension the policy gives every real slot the same kind of bound,
    // so the merge ceiling is the loosest one (None ⇔ dimension disabled).
    let merge_weight = real
        .iter()
        .filter_map(|&s| model.slots[s].weight_limit)
        .fold(None, |acc: Option<f64>, cap| {
            Some(acc.map_or(cap, |best| best.max(cap)))
        });
    let merge_volume = real
        .iter()
        .filter_map(|&s| model.slots[s].volume_limit)
        .fold(None, |acc: Option<f64>, cap| {
            Some(acc.map_or(cap, |best| best.max(cap)))
        });
    let merge_fits = |d: Demand| {
        merge_weight.is_none_or(|cap| d.weight <= cap)
            && merge_volume.is_none_or(|cap| d.volume <= cap)
    };

    // Compute savings for all node pairs.
    let mut savings = Vec::with_capacity((n - 1) * (n - 2) / 2);
    for i in 1..n {
        if deadline.expired() {
            return None;
        }
        for j in (i + 1)..n {
            let s = model.matrix.get(0, i) + model.matrix.get(0, j) - model.matrix.get(i, j);
            if s > 0.0 {
                savings.push(Saving { i, j, value: s });
            }
        }
    }
    savings.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .expect("savings should not be NaN")
    });

    // Each node starts in its own route.
    let mut route_of = vec![0usize; n];
    let mut route_load = vec![Demand::default(); n];
    let mut route_members: Vec<Vec<usize>> = vec![Vec::new(); n];
    for i in 1..n {
        route_of[i] = i;
        route_load[i] = model.demand(i);
        route_members[i].push(i);
    }

    // Merge route ends in decreasing savings order.
    for saving in &savings {
        if deadline.expired() {
            return None;
        }
        let ri = route_of[saving.i];
        let rj = route_of[saving.j];
        if ri == rj {
            continue;
        }
        let combined = route_load[ri].plus(route_load[rj]);
        if !merge_fits(combined) {
            continue;
        }

        let i_at_end = route_members[ri].last() == Some(&saving.i);
        let j_at_start = route_members[rj].first() == Some(&saving.j);
        let i_at_start = route_members[ri].first() == Some(&saving.i);
        let j_at_end = route_members[rj].last() == Some(&saving.j);

        let (merge_from, merge_into, reverse_from, reverse_into) = if i_at_end && j_at_start {
            (rj, ri, false, false)
        } else if j_at_end && i_at_start {
            (ri, rj, false, false)
        } else if i_at_end && j_at_end {
            (rj, ri, true, false)
        } else if i_at_start && j_at_start {
            (rj, ri, false, true)
        } else {
            continue;
        };

        let mut from_members = std::mem::take(&mut route_members[merge_from]);
        if reverse_from {
            from_members.reverse();
        }
        if reverse_into {
            route_members[merge_into].reverse();
        }
        route_members[merge_into].append(&mut from_members);
        route_load[merge_into] = combined;
        route_load[merge_from] = Demand::default();

        for &node in &route_members[merge_into] {
            route_of[node] = merge_into;
        }
    }

    // Place clusters onto concrete vehicles, largest cluster first.
    let mut clusters: Vec<Vec<usize>> = route_members
        .into_iter()
        .filter(|members| !members.is_empty())
        .collect();
    clusters.sort_by(|a, b| {
        model
            .route_load(b)
            .combined()
            .partial_cmp(&model.route_load(a).combined())
            .expect("loads should not be NaN")
    });

    let mut used = vec![false; model.slots.len()];
    let mut leftovers = Vec::new();
    for cluster in clusters {
        let load = model.route_load(&cluster);
        let slot = real
            .iter()
            .copied()
            .find(|&s| !used[s] && model.slots[s].fits(Demand::default(), load));
        match slot {
            Some(s) => {
                used[s] = true;
                assignment.routes[s] = cluster;
            }
            None => leftovers.extend(cluster),
        }
    }
    absorb_leftovers(model, &mut assignment, leftovers);
    Some(assignment)
}

/// Polar-angle sweep construction.
///
/// # Algorithm
///
/// Sorts nodes by polar angle around the depot, then packs them into the
/// real slots sequentially while capacity lasts, exploiting geographic
/// clustering: nearby nodes tend to share an angle and land on the same
/// vehicle.
///
/// # Reference
///
/// Gillett, B.E. & Miller, L.R. (1974). "A Heuristic Algorithm for the
/// Vehicle-Dispatch Problem", *Operations Research* 22(2).
pub fn sweep(model: &RoutingModel, deadline: &Deadline) -> Option<Assignment> {
    let n = model.nodes.len();
    let mut assignment = Assignment::empty(model.slots.len());
    if n <= 1 {
        return Some(assignment);
    }

    let depot = model.nodes[0].location;
    let mut angle_order: Vec<(usize, f64)> = (1..n)
        .map(|i| {
            let dx = model.nodes[i].location.longitude() - depot.longitude();
            let dy = model.nodes[i].location.latitude() - depot.latitude();
            (i, dy.atan2(dx))
        })
        .collect();
    angle_order.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("angles should not be NaN"));

    let real = real_slots(model);
    let mut slot_cursor = 0usize;
    let mut load = Demand::default();
    let mut leftovers = Vec::new();

    for &(node, _) in &angle_order {
        if deadline.expired() {
            return None;
        }
        let demand = model.demand(node);
        loop {
            let Some(&slot) = real.get(slot_cursor) else {
                leftovers.push(node);
                break;
            };
            if model.slots[slot].fits(load, demand) {
                assignment.routes[slot].push(node);
                load = load.plus(demand);
                break;
            }
            if assignment.routes[slot].is_empty() {
                // Does not fit even an empty vehicle; keep the vehicle for
                // smaller nodes later in the sweep.
                leftovers.push(node);
                break;
            }
            slot_cursor += 1;
            load = Demand::default();
        }
    }

    absorb_leftovers(model, &mut assignment, leftovers);
    Some(assignment)
}
