//! Distance resolution: great-circle math, the cache-backed resolver, and
//! the request-scoped dense matrix.

mod haversine;
mod matrix;
mod resolver;

pub use haversine::{great_circle, pairwise_great_circle, EARTH_RADIUS};
pub use matrix::DistanceMatrix;
pub use resolver::{DistanceResolver, DEFAULT_PROVIDER_THRESHOLD};
