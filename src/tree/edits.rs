use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::assembly::AssemblyId;
use super::types::{Axis, FaceId};
use super::void::VoidId;
use crate::error::{invalid, GeometryError, Result};
use crate::geometry::edge_path::EdgePath;
use crate::math::polygon_2d::{centered_rectangle, circle, ensure_ccw, is_simple, signed_area};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Upper bound on the segments of a circular cutout.
pub const MAX_CIRCLE_SEGMENTS: usize = 256;

/// Identifies a derived panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PanelId {
    Face { assembly: AssemblyId, face: FaceId },
    /// The `index`-th divider of the split along `axis` in `void`.
    Divider { void: VoidId, axis: Axis, index: usize },
}

impl PanelId {
    #[must_use]
    pub fn is_divider(&self) -> bool {
        matches!(self, PanelId::Divider { .. })
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelId::Face { assembly, face } => write!(f, "face[{assembly:?}/{face:?}]"),
            PanelId::Divider { void, axis, index } => {
                write!(f, "divider[{void:?}/{axis:?}{index}]")
            }
        }
    }
}

/// One of the four edges of a panel in its local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl EdgeSide {
    pub const ALL: [EdgeSide; 4] = [EdgeSide::Top, EdgeSide::Right, EdgeSide::Bottom, EdgeSide::Left];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            EdgeSide::Top => 0,
            EdgeSide::Right => 1,
            EdgeSide::Bottom => 2,
            EdgeSide::Left => 3,
        }
    }

    /// Outward direction in panel-local coordinates.
    #[must_use]
    pub fn outward(self) -> Vector2 {
        match self {
            EdgeSide::Top => Vector2::new(0.0, 1.0),
            EdgeSide::Right => Vector2::new(1.0, 0.0),
            EdgeSide::Bottom => Vector2::new(0.0, -1.0),
            EdgeSide::Left => Vector2::new(-1.0, 0.0),
        }
    }

    #[must_use]
    pub fn opposite(self) -> EdgeSide {
        match self {
            EdgeSide::Top => EdgeSide::Bottom,
            EdgeSide::Right => EdgeSide::Left,
            EdgeSide::Bottom => EdgeSide::Top,
            EdgeSide::Left => EdgeSide::Right,
        }
    }

    /// `true` for edges running along the local x axis.
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, EdgeSide::Top | EdgeSide::Bottom)
    }

    /// The two edges meeting this one at its ends.
    #[must_use]
    pub fn neighbours(self) -> [EdgeSide; 2] {
        if self.is_horizontal() {
            [EdgeSide::Left, EdgeSide::Right]
        } else {
            [EdgeSide::Bottom, EdgeSide::Top]
        }
    }

    /// Canonical start and end corners of the edge on a centred `w x h` rectangle.
    ///
    /// Horizontal edges run left to right, vertical edges bottom to top; edge
    /// paths measure `t` in this direction.
    #[must_use]
    pub fn endpoints(self, half_w: f64, half_h: f64) -> (Point2, Point2) {
        match self {
            EdgeSide::Top => (Point2::new(-half_w, half_h), Point2::new(half_w, half_h)),
            EdgeSide::Bottom => (Point2::new(-half_w, -half_h), Point2::new(half_w, -half_h)),
            EdgeSide::Left => (Point2::new(-half_w, -half_h), Point2::new(-half_w, half_h)),
            EdgeSide::Right => (Point2::new(half_w, -half_h), Point2::new(half_w, half_h)),
        }
    }
}

/// A corner of the panel's nominal rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PanelCorner {
    BottomLeft,
    BottomRight,
    TopRight,
    TopLeft,
}

impl PanelCorner {
    pub const ALL: [PanelCorner; 4] = [
        PanelCorner::BottomLeft,
        PanelCorner::BottomRight,
        PanelCorner::TopRight,
        PanelCorner::TopLeft,
    ];

    /// Signs of the corner's local coordinates.
    #[must_use]
    pub fn signs(self) -> (f64, f64) {
        match self {
            PanelCorner::BottomLeft => (-1.0, -1.0),
            PanelCorner::BottomRight => (1.0, -1.0),
            PanelCorner::TopRight => (1.0, 1.0),
            PanelCorner::TopLeft => (-1.0, 1.0),
        }
    }

    /// The two edges meeting at this corner.
    #[must_use]
    pub fn edges(self) -> [EdgeSide; 2] {
        match self {
            PanelCorner::BottomLeft => [EdgeSide::Bottom, EdgeSide::Left],
            PanelCorner::BottomRight => [EdgeSide::Bottom, EdgeSide::Right],
            PanelCorner::TopRight => [EdgeSide::Top, EdgeSide::Right],
            PanelCorner::TopLeft => [EdgeSide::Top, EdgeSide::Left],
        }
    }
}

/// Which contour of a panel a corner sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContourRef {
    Outline,
    Hole(usize),
}

/// Identifies a detected corner: a vertex index within one contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CornerId {
    pub contour: ContourRef,
    pub index: usize,
}

/// Shape of a user cutout, in centred panel-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CutoutShape {
    Rect {
        center: Point2,
        width: f64,
        height: f64,
    },
    Circle {
        center: Point2,
        radius: f64,
        segments: usize,
    },
    Polygon {
        points: Vec<Point2>,
    },
}

impl CutoutShape {
    /// Polygon approximation of the shape, counter-clockwise.
    ///
    /// Circles use at most [`MAX_CIRCLE_SEGMENTS`] segments.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite coordinates, non-positive sizes and
    /// polygons that are degenerate or cross themselves.
    pub fn to_polygon(&self) -> Result<Vec<Point2>> {
        match self {
            CutoutShape::Rect {
                center,
                width,
                height,
            } => {
                finite_point(center)?;
                if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) {
                    return Err(invalid(format!(
                        "cutout rectangle must have positive size, got {width} x {height}"
                    )));
                }
                Ok(centered_rectangle(center.x, center.y, *width, *height))
            }
            CutoutShape::Circle {
                center,
                radius,
                segments,
            } => {
                finite_point(center)?;
                if !radius.is_finite() {
                    return Err(invalid(format!("cutout radius {radius} is not finite")));
                }
                circle(center.x, center.y, *radius, (*segments).min(MAX_CIRCLE_SEGMENTS))
            }
            CutoutShape::Polygon { points } => {
                check_user_polygon(points)?;
                Ok(ensure_ccw(points))
            }
        }
    }

    /// `true` for shapes that approximate a curve.
    #[must_use]
    pub fn is_curved(&self) -> bool {
        matches!(self, CutoutShape::Circle { .. })
    }
}

fn finite_point(p: &Point2) -> Result<()> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("point ({}, {}) is not finite", p.x, p.y)))
    }
}

/// Accepts a user-drawn polygon: at least three finite points, non-zero
/// area, no self-intersections.
///
/// # Errors
///
/// Returns the first problem found.
pub fn check_user_polygon(points: &[Point2]) -> Result<()> {
    if points.len() < 3 {
        return Err(GeometryError::TooFewPoints {
            required: 3,
            actual: points.len(),
        }
        .into());
    }
    points.iter().try_for_each(finite_point)?;
    if signed_area(points).abs() <= TOLERANCE {
        return Err(GeometryError::Degenerate("polygon has no area".into()).into());
    }
    if !is_simple(points) {
        return Err(GeometryError::Degenerate("polygon crosses itself".into()).into());
    }
    Ok(())
}

/// A user-placed hole in a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutout {
    pub id: String,
    pub shape: CutoutShape,
}

/// User edits attached to one panel.
///
/// Panels are derived, so everything the user changes on a panel lives here
/// and is replayed by projection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelEdits {
    pub extensions: BTreeMap<EdgeSide, f64>,
    pub corner_fillets: BTreeMap<PanelCorner, f64>,
    pub all_corner_fillets: BTreeMap<CornerId, f64>,
    pub cutouts: Vec<Cutout>,
    pub edge_paths: BTreeMap<EdgeSide, EdgePath>,
}

impl PanelEdits {
    /// Extension of `side` in mm (0 when unset).
    #[must_use]
    pub fn extension(&self, side: EdgeSide) -> f64 {
        self.extensions.get(&side).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn cutout(&self, id: &str) -> Option<&Cutout> {
        self.cutouts.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
            && self.corner_fillets.is_empty()
            && self.all_corner_fillets.is_empty()
            && self.cutouts.is_empty()
            && self.edge_paths.is_empty()
    }

    /// First free `op-N` cutout id.
    #[must_use]
    pub fn next_operation_id(&self) -> String {
        let mut n = 1usize;
        loop {
            let id = format!("op-{n}");
            if self.cutout(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn edge_endpoints_run_in_canonical_direction() {
        let (a, b) = EdgeSide::Right.endpoints(50.0, 40.0);
        assert!((a - Point2::new(50.0, -40.0)).norm() < 1e-12);
        assert!((b - Point2::new(50.0, 40.0)).norm() < 1e-12);
        for side in EdgeSide::ALL {
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn rect_cutout_polygon() {
        let shape = CutoutShape::Rect {
            center: Point2::new(0.0, 0.0),
            width: 20.0,
            height: 10.0,
        };
        let poly = shape.to_polygon().unwrap();
        assert_eq!(poly.len(), 4);
        let bad = CutoutShape::Rect {
            center: Point2::new(0.0, 0.0),
            width: 0.0,
            height: 10.0,
        };
        assert!(bad.to_polygon().is_err());
    }

    #[test]
    fn cutouts_reject_non_finite_and_crossing_shapes() {
        let nan_rect = CutoutShape::Rect {
            center: Point2::new(f64::NAN, 0.0),
            width: f64::NAN,
            height: 10.0,
        };
        assert!(nan_rect.to_polygon().is_err());
        let nan_size = CutoutShape::Rect {
            center: Point2::new(0.0, 0.0),
            width: f64::NAN,
            height: 10.0,
        };
        assert!(nan_size.to_polygon().is_err());
        let inf_circle = CutoutShape::Circle {
            center: Point2::new(0.0, f64::INFINITY),
            radius: 5.0,
            segments: 16,
        };
        assert!(inf_circle.to_polygon().is_err());
        let nan_radius = CutoutShape::Circle {
            center: Point2::new(0.0, 0.0),
            radius: f64::NAN,
            segments: 16,
        };
        assert!(nan_radius.to_polygon().is_err());
        let bowtie = CutoutShape::Polygon {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(10.0, 0.0),
                Point2::new(0.0, 4.0),
            ],
        };
        assert!(bowtie.to_polygon().is_err());
        let flat = CutoutShape::Polygon {
            points: vec![Point2::new(0.0, 0.0), Point2::new(5.0, 0.0), Point2::new(10.0, 0.0)],
        };
        assert!(flat.to_polygon().is_err());
    }

    #[test]
    fn circle_segments_are_capped() {
        let shape = CutoutShape::Circle {
            center: Point2::new(0.0, 0.0),
            radius: 5.0,
            segments: 1_000_000,
        };
        assert_eq!(shape.to_polygon().unwrap().len(), MAX_CIRCLE_SEGMENTS);
    }

    #[test]
    fn operation_ids_skip_taken() {
        let mut edits = PanelEdits::default();
        edits.cutouts.push(Cutout {
            id: "op-1".into(),
            shape: CutoutShape::Rect {
                center: Point2::new(0.0, 0.0),
                width: 1.0,
                height: 1.0,
            },
        });
        assert_eq!(edits.next_operation_id(), "op-2");
    }
}
