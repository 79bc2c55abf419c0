//! Fatal error taxonomy.
//!
//! Only conditions that abort a whole request live here. Per-order problems
//! are reported as [`UnassignedOrder`](crate::models::UnassignedOrder)
//! entries, and degraded paths (external provider down, search exhaustion)
//! are absorbed with a log warning.

use thiserror::Error;

/// A fatal request-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    /// The depot address id matched no known address.
    #[error("depot address {0} not found")]
    DepotNotFound(i64),
    /// An address required for routing has no geocoded location.
    #[error("address {0} has no location")]
    MissingLocation(i64),
    /// Orders were supplied but the vehicle list is empty.
    #[error("no vehicles supplied")]
    EmptyFleet,
}
