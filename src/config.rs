use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tolerances and tunables of the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Slack for overlap and extension comparisons, in mm.
    pub epsilon: f64,
    /// Shortest edge, in multiples of material thickness, that can carry a
    /// filletable corner.
    pub min_corner_edge_factor: f64,
    /// Fillet radii below this are treated as no fillet, in mm.
    pub min_fillet_radius: f64,
    /// Vertices with an interior angle at or above this are not corners, in degrees.
    pub near_straight_deg: f64,
    /// Arc segments used for each fillet.
    pub fillet_segments: u32,
    /// Smallest allowed panel width or height, in mm.
    pub min_panel_dimension: f64,
    /// Extensions longer than this many `(finger_width + clearance)` lengths
    /// get a long-fingers warning.
    pub long_extension_factor: f64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            min_corner_edge_factor: 1.5,
            min_fillet_radius: 1.0,
            near_straight_deg: 179.0,
            fillet_segments: 8,
            min_panel_dimension: 10.0,
            long_extension_factor: 2.0,
        }
    }
}

impl KernelConfig {
    /// Parses a config from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BoxcutError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = KernelConfig::from_json(r#"{ "fillet_segments": 16 }"#).unwrap();
        assert_eq!(cfg.fillet_segments, 16);
        assert!((cfg.epsilon - 0.01).abs() < 1e-12);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(KernelConfig::from_json("{ nope").is_err());
    }
}
