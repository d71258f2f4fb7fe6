use serde::{Deserialize, Serialize};

use super::ops::{intersection_area, MIN_AREA};
use crate::math::polygon_2d::signed_area;
use crate::math::Point2;

/// Where a user-drawn polygon sits relative to a panel outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonClassification {
    /// Fully inside (touching the boundary is allowed).
    Interior,
    /// Crosses the outline.
    Boundary,
    /// Fully outside.
    Exterior,
}

const RATIO_TOL: f64 = 1e-6;

/// Classifies `polygon` against `outline` by the share of its area inside.
///
/// Degenerate polygons (no area) classify as exterior.
#[must_use]
pub fn classify_polygon(polygon: &[Point2], outline: &[Point2]) -> PolygonClassification {
    let area = signed_area(polygon).abs();
    if polygon.len() < 3 || area <= MIN_AREA {
        return PolygonClassification::Exterior;
    }
    let ratio = intersection_area(polygon, outline) / area;
    if ratio >= 1.0 - RATIO_TOL {
        PolygonClassification::Interior
    } else if ratio <= RATIO_TOL {
        PolygonClassification::Exterior
    } else {
        PolygonClassification::Boundary
    }
}
