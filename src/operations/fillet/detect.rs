use serde::{Deserialize, Serialize};

use super::radius::calculate_max_fillet_radius;
use crate::config::KernelConfig;
use crate::math::arc_2d::{interior_angle, turn_cross};
use crate::math::polygon_2d::{distance_to_boundary, point_in_polygon};
use crate::math::Point2;
use crate::tree::{ContourRef, CornerId, PanelCorner};

/// A filletable vertex candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub id: CornerId,
    pub position: Point2,
    /// Interior angle in degrees.
    pub angle: f64,
    /// Left turn along the contour's stored winding.
    pub convex: bool,
    /// Length of the incoming edge.
    pub edge_a: f64,
    /// Length of the outgoing edge.
    pub edge_b: f64,
    pub max_radius: f64,
    pub eligible: bool,
    /// Fixed panel corner this vertex stands for, if any.
    pub fixed: Option<PanelCorner>,
}

/// Finds the corners of an outline and its holes.
///
/// A vertex counts when both adjacent edges are at least
/// `min_corner_edge_factor x mt` long (this skips finger teeth) and it is
/// not near-straight. Corners inside a `forbidden` polygon or with no room
/// for the minimum radius are reported but not eligible.
#[must_use]
pub fn detect_corners(
    outline: &[Point2],
    holes: &[Vec<Point2>],
    forbidden: &[Vec<Point2>],
    mt: f64,
    config: &KernelConfig,
) -> Vec<Corner> {
    let mut corners = contour_corners(outline, ContourRef::Outline, forbidden, mt, config);
    for (i, hole) in holes.iter().enumerate() {
        corners.extend(contour_corners(hole, ContourRef::Hole(i), forbidden, mt, config));
    }
    corners
}

fn contour_corners(
    points: &[Point2],
    contour: ContourRef,
    forbidden: &[Vec<Point2>],
    mt: f64,
    config: &KernelConfig,
) -> Vec<Corner> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    let min_edge = config.min_corner_edge_factor * mt;
    let mut out = Vec::new();
    for index in 0..n {
        let prev = &points[(index + n - 1) % n];
        let vertex = &points[index];
        let next = &points[(index + 1) % n];
        let (edge_a, edge_b) = ((vertex - prev).norm(), (next - vertex).norm());
        if edge_a < min_edge || edge_b < min_edge {
            continue;
        }
        let Some(theta) = interior_angle(prev, vertex, next) else {
            continue;
        };
        if theta.to_degrees() >= config.near_straight_deg {
            continue;
        }
        let max_radius = calculate_max_fillet_radius(edge_a, edge_b, theta, config);
        let blocked = forbidden
            .iter()
            .any(|f| point_in_polygon(vertex, f) || distance_to_boundary(vertex, f) < config.epsilon);
        out.push(Corner {
            id: CornerId { contour, index },
            position: *vertex,
            angle: theta.to_degrees(),
            convex: turn_cross(prev, vertex, next) > 0.0,
            edge_a,
            edge_b,
            max_radius,
            eligible: !blocked && max_radius > 0.0 && max_radius.is_finite(),
            fixed: None,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::{centered_rectangle, ensure_cw, rectangle};

    #[test]
    fn rectangle_has_four_convex_corners() {
        let outline = centered_rectangle(0.0, 0.0, 100.0, 80.0);
        let corners = detect_corners(&outline, &[], &[], 3.0, &KernelConfig::default());
        assert_eq!(corners.len(), 4);
        assert!(corners.iter().all(|c| c.convex && c.eligible));
        assert!((corners[0].max_radius - 80.0 * (std::f64::consts::FRAC_PI_4).sin()).abs() < 1e-9);
    }

    #[test]
    fn short_edges_and_forbidden_corners() {
        let outline = centered_rectangle(0.0, 0.0, 100.0, 80.0);
        let tiny_hole = ensure_cw(&centered_rectangle(0.0, 0.0, 3.0, 3.0));
        let hole = ensure_cw(&centered_rectangle(0.0, 0.0, 20.0, 20.0));
        let forbidden = vec![rectangle(40.0, 30.0, 60.0, 50.0)];
        let corners = detect_corners(&outline, &[tiny_hole, hole], &forbidden, 3.0, &KernelConfig::default());
        assert_eq!(corners.len(), 8);
        assert_eq!(corners.iter().filter(|c| !c.eligible).count(), 1);
        assert!(corners
            .iter()
            .filter(|c| c.id.contour == ContourRef::Hole(1))
            .all(|c| !c.convex));
    }
}
