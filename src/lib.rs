//! # fleet-routing
//!
//! Assigns a batch of delivery orders to a capacity-limited fleet departing
//! from a single depot, producing ordered stop sequences ("trips") per
//! vehicle that respect weight/volume limits and minimize travel cost.
//! Every order ends either in exactly one shipment or in the unassigned
//! list with a reason.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (addresses, vehicles, orders, options, shipments)
//! - [`stores`] — Collaborator traits (address store, distance cache, road provider)
//! - [`distance`] — Haversine math, cache-backed resolver, dense distance matrix
//! - [`prepare`] — Demand preparation and pre-filtering of unroutable orders
//! - [`solver`] — Routing model, constructive heuristics, local search, strategy escalation
//! - [`greedy`] — Deterministic bin-packing fallback when every strategy fails
//! - [`scheduler`] — The multi-trip loop driving the whole pipeline
//! - [`assemble`] — Shipment assembly with timing and utilization metrics
//!
//! The entry point is [`scheduler::TripScheduler::plan`].

pub mod assemble;
pub mod distance;
pub mod error;
pub mod greedy;
pub mod models;
pub mod prepare;
pub mod scheduler;
pub mod solver;
pub mod stores;

pub use error::AssignmentError;
pub use scheduler::{SchedulerConfig, TripScheduler};
