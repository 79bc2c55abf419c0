//! Cooperative search deadline.

use std::time::{Duration, Instant};

/// A soft deadline checked cooperatively inside search loops.
///
/// Strategy time budgets are cancellation signals, not hard preemption:
/// a solve routine polls [`expired`](Deadline::expired) between moves and
/// winds down once the budget is spent.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    end: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    /// Returns `true` once the budget is spent.
    pub fn expired(&self) -> bool {
        Instant::now() >= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_deadline_not_expired() {
        let d = Deadline::after(Duration::from_secs(60));
        assert!(!d.expired());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let d = Deadline::after(Duration::ZERO);
        assert!(d.expired());
    }
}
