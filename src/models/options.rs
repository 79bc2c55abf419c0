//! Calculation options: capacity fill policies, cost model, strategy preference.

use serde::{Deserialize, Serialize};

/// Which vehicle-capacity figure bounds a dimension during solving.
///
/// `Disabled` removes the dimension from the routing model entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillPolicy {
    /// Do not constrain this dimension.
    Disabled,
    /// Bound by the vehicle's minimum figure.
    Minimum,
    /// Bound by the vehicle's recommended figure.
    #[default]
    Recommended,
    /// Bound by the vehicle's maximum figure.
    Maximum,
}

/// Per-dimension fill policy for a calculation.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{CapacityConstraints, FillPolicy};
///
/// let c = CapacityConstraints::default();
/// assert_eq!(c.weight, FillPolicy::Recommended);
/// assert_eq!(c.volume, FillPolicy::Recommended);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapacityConstraints {
    /// Policy governing the weight dimension.
    pub weight: FillPolicy,
    /// Policy governing the volume dimension.
    pub volume: FillPolicy,
}

/// A kind of cost contributing to the objective.
///
/// Only `Distance` is consumed by the current algorithm; the other kinds are
/// carried as extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CostKind {
    /// Cost per unit of route distance.
    Distance,
    /// Cost per unit of route time.
    Time,
}

/// A weighted cost component, e.g. cost per kilometre driven.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeight {
    /// What this component is charged against.
    pub kind: CostKind,
    /// Cost per unit (per kilometre for `Distance`).
    pub value: f64,
}

/// Preferred first-solution heuristic for the search ladder.
///
/// `Automatic` leaves the ladder in its default order; a concrete preference
/// rotates the matching strategy to the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyPreference {
    /// Use the default strategy order.
    #[default]
    Automatic,
    /// Prefer cheapest-arc path extension.
    CheapestArc,
    /// Prefer the savings algorithm.
    Savings,
    /// Prefer polar-angle sweep.
    Sweep,
}

/// Options controlling a single route calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalcOptions {
    /// Ordered cost components; only distance-based kinds are charged.
    pub costs: Vec<CostWeight>,
    /// Per-dimension capacity fill policy.
    pub constraints: CapacityConstraints,
    /// Preferred first-solution heuristic.
    pub strategy: StrategyPreference,
}

impl CalcOptions {
    /// Sum of the cost weights charged per kilometre of distance.
    pub fn distance_cost_per_km(&self) -> f64 {
        self.costs
            .iter()
            .filter(|c| c.kind == CostKind::Distance)
            .map(|c| c.value)
            .sum()
    }
}
