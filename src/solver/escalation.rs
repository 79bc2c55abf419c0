//! Search-strategy escalation.
//!
//! A fixed ladder of (first-solution heuristic, improvement metaheuristic,
//! time budget) triples, tried in priority order. The first strategy that
//! yields a feasible solution wins; exhausting the ladder is a distinct,
//! handled outcome, not an error. Budgets scale with instance size and are
//! delivered cooperatively through [`Deadline`].

use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::StrategyPreference;

use super::constructive::{cheapest_arc, savings, sweep};
use super::deadline::Deadline;
use super::local_search::{improve, perturb};
use super::model::{Assignment, RoutingModel};

/// First-solution heuristic of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstSolution {
    /// Greedy nearest-feasible path extension.
    CheapestArc,
    /// Clarke-Wright savings merge.
    Savings,
    /// Polar-angle sweep packing.
    Sweep,
    /// Pick by instance size: savings up to medium instances, cheapest-arc
    /// beyond.
    Automatic,
}

/// Improvement metaheuristic of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Improvement {
    /// Local-search descent to a local optimum.
    Descent,
    /// Descent interleaved with seeded random kicks until the budget runs
    /// out, keeping the best assignment seen.
    Perturbation,
}

/// One rung of the escalation ladder.
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    /// Display name for logs.
    pub name: &'static str,
    /// How the initial assignment is built.
    pub first: FirstSolution,
    /// How the initial assignment is improved.
    pub improvement: Improvement,
    /// Multiplier on the instance's base time budget.
    pub budget_scale: f64,
}

/// Time-budget model: `base + per_order·N + per_vehicle·V` per strategy,
/// before the strategy's own scale factor.
#[derive(Debug, Clone)]
pub struct BudgetModel {
    /// Flat budget per attempt.
    pub base: Duration,
    /// Additional budget per order node.
    pub per_order: Duration,
    /// Additional budget per vehicle slot.
    pub per_vehicle: Duration,
}

impl Default for BudgetModel {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(200),
            per_order: Duration::from_millis(10),
            per_vehicle: Duration::from_millis(20),
        }
    }
}

impl BudgetModel {
    /// Budget for an instance with `orders` order nodes and `vehicles`
    /// vehicle slots.
    pub fn budget(&self, orders: usize, vehicles: usize) -> Duration {
        self.base + self.per_order * orders as u32 + self.per_vehicle * vehicles as u32
    }
}

/// The default ladder, ordered by expected solve quality/speed trade-off.
///
/// A non-automatic preference rotates the first matching rung to the front;
/// the rest keep their order.
pub fn default_ladder(preference: StrategyPreference) -> Vec<SearchStrategy> {
    let mut ladder = vec![
        SearchStrategy {
            name: "cheapest-arc + descent",
            first: FirstSolution::CheapestArc,
            improvement: Improvement::Descent,
            budget_scale: 1.0,
        },
        SearchStrategy {
            name: "cheapest-arc + perturbation",
            first: FirstSolution::CheapestArc,
            improvement: Improvement::Perturbation,
            budget_scale: 1.0,
        },
        SearchStrategy {
            name: "savings + descent",
            first: FirstSolution::Savings,
            improvement: Improvement::Descent,
            budget_scale: 1.5,
        },
        SearchStrategy {
            name: "sweep + perturbation",
            first: FirstSolution::Sweep,
            improvement: Improvement::Perturbation,
            budget_scale: 1.5,
        },
        SearchStrategy {
            name: "automatic + descent",
            first: FirstSolution::Automatic,
            improvement: Improvement::Descent,
            budget_scale: 2.0,
        },
        SearchStrategy {
            name: "extended cheapest-arc",
            first: FirstSolution::CheapestArc,
            improvement: Improvement::Perturbation,
            budget_scale: 3.0,
        },
    ];

    let wanted = match preference {
        StrategyPreference::Automatic => None,
        StrategyPreference::CheapestArc => Some(FirstSolution::CheapestArc),
        StrategyPreference::Savings => Some(FirstSolution::Savings),
        StrategyPreference::Sweep => Some(FirstSolution::Sweep),
    };
    if let Some(first) = wanted {
        if let Some(pos) = ladder.iter().position(|s| s.first == first) {
            ladder[..=pos].rotate_right(1);
        }
    }
    ladder
}

/// Tries strategies in ladder order until one yields a feasible solution.
pub struct SearchEscalator {
    ladder: Vec<SearchStrategy>,
    budgets: BudgetModel,
}

impl SearchEscalator {
    /// Creates an escalator with the default ladder for `preference` and
    /// default budgets.
    pub fn new(preference: StrategyPreference) -> Self {
        Self {
            ladder: default_ladder(preference),
            budgets: BudgetModel::default(),
        }
    }

    /// Replaces the budget model.
    pub fn with_budgets(mut self, budgets: BudgetModel) -> Self {
        self.budgets = budgets;
        self
    }

    /// Replaces the strategy ladder.
    pub fn with_ladder(mut self, ladder: Vec<SearchStrategy>) -> Self {
        self.ladder = ladder;
        self
    }

    /// Runs the ladder against `model`.
    ///
    /// Returns the first feasible assignment, or `None` when every strategy
    /// fails within its budget — the caller is expected to fall back to the
    /// greedy assigner.
    pub fn solve(&self, model: &RoutingModel) -> Option<Assignment> {
        let base = self.budgets.budget(model.num_orders(), model.slots.len());

        for (rung, strategy) in self.ladder.iter().enumerate() {
            let deadline = Deadline::after(base.mul_f64(strategy.budget_scale));
            debug!("trying search strategy '{}'", strategy.name);

            let constructed = match resolve_first(strategy.first, model) {
                FirstSolution::Savings => savings(model, &deadline),
                FirstSolution::Sweep => sweep(model, &deadline),
                _ => cheapest_arc(model, &deadline),
            };
            let Some(mut assignment) = constructed else {
                debug!("strategy '{}' ran out of budget during construction", strategy.name);
                continue;
            };

            match strategy.improvement {
                Improvement::Descent => improve(model, &mut assignment, &deadline),
                Improvement::Perturbation => {
                    improve(model, &mut assignment, &deadline);
                    let mut rng = StdRng::seed_from_u64(0x5eed + rung as u64);
                    let mut best = assignment.clone();
                    let mut best_score = score(model, &best);
                    while !deadline.expired() {
                        perturb(&mut assignment, &mut rng);
                        improve(model, &mut assignment, &deadline);
                        let candidate = score(model, &assignment);
                        if candidate < best_score {
                            best = assignment.clone();
                            best_score = candidate;
                        } else {
                            assignment = best.clone();
                        }
                    }
                    assignment = best;
                }
            }

            if model.is_feasible(&assignment) {
                debug!("strategy '{}' found a feasible solution", strategy.name);
                return Some(assignment);
            }
            debug!("strategy '{}' found no feasible solution", strategy.name);
        }
        None
    }
}

/// Resolves `Automatic` to a concrete heuristic by instance size.
fn resolve_first(first: FirstSolution, model: &RoutingModel) -> FirstSolution {
    match first {
        FirstSolution::Automatic => {
            if model.num_orders() <= 40 {
                FirstSolution::Savings
            } else {
                FirstSolution::CheapestArc
            }
        }
        concrete => concrete,
    }
}

/// Lexicographic score: completeness first, then objective cost.
fn score(model: &RoutingModel, assignment: &Assignment) -> (usize, f64) {
    (assignment.unassigned.len(), model.total_cost(assignment))
}
