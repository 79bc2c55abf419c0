//! Vehicle type with per-dimension capacity figures.

use serde::{Deserialize, Serialize};

use super::FillPolicy;

/// A constrained capacity dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// Load weight.
    Weight,
    /// Load volume.
    Volume,
}

/// A delivery vehicle with minimum, recommended, and maximum capacity figures
/// per dimension.
///
/// All figures are non-negative and satisfy `minimum ≤ recommended ≤ maximum`.
/// Which figure actually bounds a calculation is decided per request by the
/// fill policy, resolved through [`Vehicle::capacity_for`].
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{Dimension, FillPolicy, Vehicle};
///
/// let v = Vehicle::new(3).with_weight(500.0, 800.0, 1000.0);
/// assert_eq!(v.capacity_for(Dimension::Weight, FillPolicy::Maximum), Some(1000.0));
/// assert_eq!(v.capacity_for(Dimension::Weight, FillPolicy::Disabled), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: i64,
    code: Option<String>,
    weight_min: f64,
    weight_recommended: f64,
    weight_max: f64,
    volume_min: f64,
    volume_recommended: f64,
    volume_max: f64,
}

impl Vehicle {
    /// Creates a vehicle with the given ID and zero capacity in both
    /// dimensions.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            code: None,
            weight_min: 0.0,
            weight_recommended: 0.0,
            weight_max: 0.0,
            volume_min: 0.0,
            volume_recommended: 0.0,
            volume_max: 0.0,
        }
    }

    /// Sets the weight capacity figures (minimum, recommended, maximum).
    pub fn with_weight(mut self, min: f64, recommended: f64, max: f64) -> Self {
        self.weight_min = min;
        self.weight_recommended = recommended;
        self.weight_max = max;
        self
    }

    /// Sets the volume capacity figures (minimum, recommended, maximum).
    pub fn with_volume(mut self, min: f64, recommended: f64, max: f64) -> Self {
        self.volume_min = min;
        self.volume_recommended = recommended;
        self.volume_max = max;
        self
    }

    /// Sets the human-readable fleet code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Vehicle identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Fleet code, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Resolves the capacity figure that bounds `dimension` under `policy`.
    ///
    /// Returns `None` when the policy disables the dimension.
    pub fn capacity_for(&self, dimension: Dimension, policy: FillPolicy) -> Option<f64> {
        let figure = match (dimension, policy) {
            (_, FillPolicy::Disabled) => return None,
            (Dimension::Weight, FillPolicy::Minimum) => self.weight_min,
            (Dimension::Weight, FillPolicy::Recommended) => self.weight_recommended,
            (Dimension::Weight, FillPolicy::Maximum) => self.weight_max,
            (Dimension::Volume, FillPolicy::Minimum) => self.volume_min,
            (Dimension::Volume, FillPolicy::Recommended) => self.volume_recommended,
            (Dimension::Volume, FillPolicy::Maximum) => self.volume_max,
        };
        Some(figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(1);
        assert_eq!(v.id(), 1);
        assert!(v.code().is_none());
        assert_eq!(
            v.capacity_for(Dimension::Weight, FillPolicy::Maximum),
            Some(0.0)
        );
    }

    #[test]
    fn test_vehicle_builder() {
        let v = Vehicle::new(2)
            .with_code("T-02")
            .with_weight(100.0, 150.0, 200.0)
            .with_volume(1.0, 1.5, 2.0);
        assert_eq!(v.code(), Some("T-02"));
        assert_eq!(
            v.capacity_for(Dimension::Weight, FillPolicy::Minimum),
            Some(100.0)
        );
        assert_eq!(
            v.capacity_for(Dimension::Weight, FillPolicy::Recommended),
            Some(150.0)
        );
        assert_eq!(
            v.capacity_for(Dimension::Volume, FillPolicy::Maximum),
            Some(2.0)
        );
    }

    #[test]
    fn test_capacity_disabled() {
        let v = Vehicle::new(3).with_weight(1.0, 2.0, 3.0);
        assert_eq!(v.capacity_for(Dimension::Weight, FillPolicy::Disabled), None);
        assert_eq!(v.capacity_for(Dimension::Volume, FillPolicy::Disabled), None);
    }
}
