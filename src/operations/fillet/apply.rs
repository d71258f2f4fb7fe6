use super::radius::calculate_max_fillet_radius;
use crate::config::KernelConfig;
use crate::error::{GeometryError, Result};
use crate::math::arc_2d::{interior_angle, tangent_arc};
use crate::math::Point2;

/// Maximum radius of the vertex at `index` of a closed contour, or `None`
/// when the vertex has a zero-length edge.
#[must_use]
pub fn corner_max_radius(points: &[Point2], index: usize, config: &KernelConfig) -> Option<f64> {
    let n = points.len();
    if n < 3 || index >= n {
        return None;
    }
    let prev = &points[(index + n - 1) % n];
    let vertex = &points[index];
    let next = &points[(index + 1) % n];
    let theta = interior_angle(prev, vertex, next)?;
    Some(calculate_max_fillet_radius(
        (vertex - prev).norm(),
        (next - vertex).norm(),
        theta,
        config,
    ))
}

/// Replaces the vertex at `index` of a closed contour with an arc of
/// `segments` segments tangent to both adjacent edges.
///
/// The radius is clamped to the corner's maximum.
///
/// # Errors
///
/// Fails for an out-of-range index, a non-positive radius, a corner that
/// cannot take a fillet, or fewer than one segment.
pub fn apply_fillet_to_corner(
    points: &[Point2],
    index: usize,
    radius: f64,
    segments: u32,
    config: &KernelConfig,
) -> Result<Vec<Point2>> {
    fillet_corner(points, index, radius, segments, config).map(|(out, _)| out)
}

/// Like [`apply_fillet_to_corner`], also returning the radius the arc got
/// after clamping against the contour as it is now.
///
/// # Errors
///
/// Same as [`apply_fillet_to_corner`].
pub fn fillet_corner(
    points: &[Point2],
    index: usize,
    radius: f64,
    segments: u32,
    config: &KernelConfig,
) -> Result<(Vec<Point2>, f64)> {
    let n = points.len();
    if n < 3 {
        return Err(GeometryError::TooFewPoints {
            required: 3,
            actual: n,
        }
        .into());
    }
    if index >= n {
        return Err(GeometryError::IneligibleCorner { index }.into());
    }
    if !(radius > 0.0) || segments == 0 {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "radius",
            value: radius,
            min: 0.0,
            max: f64::INFINITY,
        }
        .into());
    }
    let max = corner_max_radius(points, index, config).unwrap_or(0.0);
    if !(max > 0.0) || max.is_infinite() {
        return Err(GeometryError::IneligibleCorner { index }.into());
    }
    let r = radius.min(max);
    let prev = &points[(index + n - 1) % n];
    let next = &points[(index + 1) % n];
    let arc = tangent_arc(prev, &points[index], next, r, segments)
        .ok_or_else(|| GeometryError::Degenerate(format!("fillet at corner {index}")))?;

    let mut out = Vec::with_capacity(n + arc.len());
    out.extend_from_slice(&points[..index]);
    out.extend(arc);
    out.extend_from_slice(&points[index + 1..]);
    Ok((out, r))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::{centered_rectangle, is_simple, signed_area};

    #[test]
    fn fillet_replaces_corner_with_arc() {
        let cfg = KernelConfig::default();
        let rect = centered_rectangle(0.0, 0.0, 100.0, 80.0);
        let out = apply_fillet_to_corner(&rect, 2, 10.0, 8, &cfg).unwrap();
        assert_eq!(out.len(), 4 - 1 + 9);
        assert!(is_simple(&out));
        let lost = signed_area(&rect) - signed_area(&out);
        // A quarter-round of radius 10 removes r^2 (1 - pi/4).
        assert!((lost - 100.0 * (1.0 - std::f64::consts::FRAC_PI_4)).abs() < 1.0);
    }

    #[test]
    fn radius_is_clamped_to_max() {
        let cfg = KernelConfig::default();
        let rect = centered_rectangle(0.0, 0.0, 20.0, 10.0);
        let max = corner_max_radius(&rect, 0, &cfg).unwrap();
        let out = apply_fillet_to_corner(&rect, 0, 1000.0, 4, &cfg).unwrap();
        // The first arc point is the tangent point on the incoming edge.
        let tangent = max / (std::f64::consts::FRAC_PI_4).tan();
        assert!(((out[0] - rect[0]).norm() - tangent).abs() < 1e-9);
    }

    #[test]
    fn neighbouring_fillet_shrinks_the_applied_radius() {
        let cfg = KernelConfig::default();
        let rect = centered_rectangle(0.0, 0.0, 20.0, 100.0);
        let before = corner_max_radius(&rect, 0, &cfg).unwrap();
        let (once, r1) = fillet_corner(&rect, 1, 9.0, 4, &cfg).unwrap();
        assert!((r1 - 9.0).abs() < 1e-12);
        let after = corner_max_radius(&once, 0, &cfg).unwrap();
        let (_, r0) = fillet_corner(&once, 0, 9.0, 4, &cfg).unwrap();
        assert!(before > 9.0);
        assert!((r0 - after).abs() < 1e-12 && r0 < 9.0);
    }

    #[test]
    fn bad_requests_fail() {
        let cfg = KernelConfig::default();
        let rect = centered_rectangle(0.0, 0.0, 20.0, 10.0);
        assert!(apply_fillet_to_corner(&rect, 9, 1.0, 4, &cfg).is_err());
        assert!(apply_fillet_to_corner(&rect, 0, -1.0, 4, &cfg).is_err());
    }
}
