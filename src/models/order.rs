//! Delivery order types and demand aggregation.

use serde::{Deserialize, Serialize};

/// A single line of a delivery order.
///
/// Weight and volume are per unit; the line's contribution to the order's
/// demand is `quantity × weight` and `quantity × volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Item description, if any.
    pub item: Option<String>,
    /// Number of units, ≥ 0.
    pub quantity: f64,
    /// Weight per unit, ≥ 0.
    pub weight: f64,
    /// Volume per unit, ≥ 0.
    pub volume: f64,
}

impl OrderLine {
    /// Creates a line with the given quantity and per-unit weight/volume.
    pub fn new(quantity: f64, weight: f64, volume: f64) -> Self {
        Self {
            item: None,
            quantity,
            weight,
            volume,
        }
    }
}

/// Aggregated weight/volume demand of an order.
///
/// Computed once during demand preparation and treated as immutable
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Demand {
    /// Total weight, Σ quantity × unit weight.
    pub weight: f64,
    /// Total volume, Σ quantity × unit volume.
    pub volume: f64,
}

impl Demand {
    /// Creates a demand from totals.
    pub fn new(weight: f64, volume: f64) -> Self {
        Self { weight, volume }
    }

    /// Component-wise sum.
    pub fn plus(&self, other: Demand) -> Demand {
        Demand {
            weight: self.weight + other.weight,
            volume: self.volume + other.volume,
        }
    }

    /// Combined magnitude used for greedy ordering.
    pub fn combined(&self) -> f64 {
        self.weight + self.volume
    }
}

/// A delivery order to be routed to a single address.
///
/// The optional deadline and priority are carried through untouched; the
/// assignment algorithm does not consume them.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{DeliveryOrder, OrderLine};
///
/// let order = DeliveryOrder::new(1, 100).with_line(OrderLine::new(2.0, 3.0, 0.5));
/// let demand = order.demand();
/// assert_eq!(demand.weight, 6.0);
/// assert_eq!(demand.volume, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOrder {
    id: i64,
    address_id: i64,
    lines: Vec<OrderLine>,
    deadline: Option<i64>,
    priority: Option<String>,
}

impl DeliveryOrder {
    /// Creates an order for the given delivery address, with no lines.
    pub fn new(id: i64, address_id: i64) -> Self {
        Self {
            id,
            address_id,
            lines: Vec::new(),
            deadline: None,
            priority: None,
        }
    }

    /// Appends an order line.
    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Sets the delivery deadline (epoch seconds). Carried, not consumed.
    pub fn with_deadline(mut self, deadline: i64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the textual priority. Carried, not consumed.
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Order identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Delivery address identifier.
    pub fn address_id(&self) -> i64 {
        self.address_id
    }

    /// Order lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Delivery deadline in epoch seconds, if any.
    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    /// Textual priority, if any.
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// Aggregates line quantities into total weight and volume.
    pub fn demand(&self) -> Demand {
        self.lines.iter().fold(Demand::default(), |acc, line| {
            acc.plus(Demand::new(
                line.quantity * line.weight,
                line.quantity * line.volume,
            ))
        })
    }
}
