use crate::config::KernelConfig;

/// Largest fillet radius a corner can take.
///
/// `angle` is the interior angle in radians. The tangent points of a fillet
/// of this radius stay on both adjacent edges. Near-straight vertices return
/// infinity (there is no corner to round), radii below the configured minimum
/// return zero.
#[must_use]
pub fn calculate_max_fillet_radius(edge_a: f64, edge_b: f64, angle: f64, config: &KernelConfig) -> f64 {
    if angle.to_degrees() >= config.near_straight_deg {
        return f64::INFINITY;
    }
    let r = edge_a.min(edge_b) * (angle * 0.5).sin();
    if r < config.min_fillet_radius {
        0.0
    } else {
        r
    }
}
