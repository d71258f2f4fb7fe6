use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use serde::{Deserialize, Serialize};

use crate::math::polygon_2d::{ensure_ccw, ensure_cw, is_simple, signed_area, simplify};
use crate::math::Point2;

/// Smallest area a boolean result may have, in mm^2.
pub const MIN_AREA: f64 = 1e-6;

const SIMPLIFY_TOL: f64 = 1e-7;

/// A polygon with holes: counter-clockwise outer, clockwise holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

impl Shape {
    /// Net area (outer minus holes).
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }
}

/// Boolean operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

/// Runs a boolean between two contour sets.
///
/// Contours are interpreted with the non-zero rule, so outers must be
/// counter-clockwise and holes clockwise. The result is normalised: every
/// outer is counter-clockwise, every hole clockwise, with duplicate and
/// collinear vertices removed and slivers dropped.
#[must_use]
pub fn overlay(subject: &[Vec<Point2>], clip: &[Vec<Point2>], op: BooleanOp) -> Vec<Shape> {
    let subject = to_paths(subject);
    let clip = to_paths(clip);
    if subject.is_empty() && op != BooleanOp::Union {
        return Vec::new();
    }
    let rule = match op {
        BooleanOp::Union => OverlayRule::Union,
        BooleanOp::Difference => OverlayRule::Difference,
        BooleanOp::Intersection => OverlayRule::Intersect,
    };
    let shapes = subject.overlay(&clip, rule, FillRule::NonZero);
    from_shapes(&shapes)
}

/// Union of two simple polygons, or `None` unless the result is one simple
/// contour without holes and with positive area.
#[must_use]
pub fn union_polygons(a: &[Point2], b: &[Point2]) -> Option<Vec<Point2>> {
    single(overlay(&[ensure_ccw(a)], &[ensure_ccw(b)], BooleanOp::Union))
}

/// `a` minus `b`, or `None` unless the result is one simple contour without
/// holes and with positive area.
#[must_use]
pub fn difference_polygons(a: &[Point2], b: &[Point2]) -> Option<Vec<Point2>> {
    single(overlay(&[ensure_ccw(a)], &[ensure_ccw(b)], BooleanOp::Difference))
}

/// Area shared by two polygons.
#[must_use]
pub fn intersection_area(a: &[Point2], b: &[Point2]) -> f64 {
    overlay(&[ensure_ccw(a)], &[ensure_ccw(b)], BooleanOp::Intersection)
        .iter()
        .map(Shape::area)
        .sum()
}

/// Union of any number of polygons.
#[must_use]
pub fn union_all(polygons: &[Vec<Point2>]) -> Vec<Shape> {
    let contours: Vec<Vec<Point2>> = polygons.iter().map(|p| ensure_ccw(p)).collect();
    overlay(&contours, &[], BooleanOp::Union)
}

/// Subtracts `cuts` from a shape given as outer contour plus holes.
#[must_use]
pub fn subtract_all(outer: &[Point2], holes: &[Vec<Point2>], cuts: &[Vec<Point2>]) -> Vec<Shape> {
    let mut subject = vec![ensure_ccw(outer)];
    subject.extend(holes.iter().map(|h| ensure_cw(h)));
    let clip: Vec<Vec<Point2>> = cuts.iter().map(|c| ensure_ccw(c)).collect();
    overlay(&subject, &clip, BooleanOp::Difference)
}

/// The largest shape of a result, if any.
#[must_use]
pub fn largest(shapes: Vec<Shape>) -> Option<Shape> {
    shapes
        .into_iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
}

fn single(mut shapes: Vec<Shape>) -> Option<Vec<Point2>> {
    if shapes.len() != 1 {
        return None;
    }
    let shape = shapes.pop()?;
    if !shape.holes.is_empty() || shape.area() <= MIN_AREA || !is_simple(&shape.outer) {
        return None;
    }
    Some(shape.outer)
}

fn to_paths(contours: &[Vec<Point2>]) -> Vec<Vec<[f64; 2]>> {
    contours
        .iter()
        .filter(|c| c.len() >= 3)
        .map(|c| c.iter().map(|p| [p.x, p.y]).collect())
        .collect()
}

fn from_shapes(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Shape> {
    let mut out = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let mut contours = shape.iter().map(|c| {
            let pts: Vec<Point2> = c.iter().map(|p| Point2::new(p[0], p[1])).collect();
            simplify(&pts, SIMPLIFY_TOL)
        });
        let Some(outer) = contours.next() else {
            continue;
        };
        if outer.len() < 3 || signed_area(&outer).abs() <= MIN_AREA {
            continue;
        }
        let holes: Vec<Vec<Point2>> = contours
            .filter(|h| h.len() >= 3 && signed_area(h).abs() > MIN_AREA)
            .map(|h| ensure_cw(&h))
            .collect();
        out.push(Shape {
            outer: ensure_ccw(&outer),
            holes,
        });
    }
    out
}
