//! 2D arc math for corner fillets.
//!
//! Angles are in radians. A corner is described by the vertex and its two
//! neighbours; the interior angle is the angle between the two edges as seen
//! from the vertex (`PI` for a straight continuation).
use std::f64::consts::PI;

use super::{Point2, Vector2, TOLERANCE};

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(center: &Point2, radius: f64, start_angle: f64, sweep: f64, t: f64) -> Point2 {
    let angle = start_angle + sweep * t;
    Point2::new(
        center.x + radius * angle.cos(),
        center.y + radius * angle.sin(),
    )
}

/// Angle between the edges `vertex -> prev` and `vertex -> next`, in `[0, PI]`.
///
/// Returns `None` when either edge has zero length.
#[must_use]
pub fn interior_angle(prev: &Point2, vertex: &Point2, next: &Point2) -> Option<f64> {
    let a = prev - vertex;
    let b = next - vertex;
    let (la, lb) = (a.norm(), b.norm());
    if la < TOLERANCE || lb < TOLERANCE {
        return None;
    }
    let cos = (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Signed turn at `vertex` walking `prev -> vertex -> next`: positive for a left turn.
#[must_use]
pub fn turn_cross(prev: &Point2, vertex: &Point2, next: &Point2) -> f64 {
    let a = vertex - prev;
    let b = next - vertex;
    a.x * b.y - a.y * b.x
}

/// Wraps an angle difference into `(-PI, PI]`.
#[must_use]
pub fn normalize_sweep(sweep: f64) -> f64 {
    let mut s = sweep;
    while s <= -PI {
        s += 2.0 * PI;
    }
    while s > PI {
        s -= 2.0 * PI;
    }
    s
}

/// Replaces the corner at `vertex` with an arc of `radius` tangent to both edges.
///
/// Returns `segments + 1` points running from the tangent point on the
/// incoming edge to the tangent point on the outgoing edge, or `None` when the
/// corner is degenerate (zero-length edge, straight or folded back) or the
/// tangent points would fall outside the adjacent edges.
#[must_use]
pub fn tangent_arc(
    prev: &Point2,
    vertex: &Point2,
    next: &Point2,
    radius: f64,
    segments: u32,
) -> Option<Vec<Point2>> {
    if radius <= TOLERANCE || segments == 0 {
        return None;
    }
    let theta = interior_angle(prev, vertex, next)?;
    if theta < 1e-6 || PI - theta < 1e-6 {
        return None;
    }
    let to_prev: Vector2 = (prev - vertex).normalize();
    let to_next: Vector2 = (next - vertex).normalize();

    let tangent_len = radius / (theta * 0.5).tan();
    if tangent_len > (prev - vertex).norm() + TOLERANCE
        || tangent_len > (next - vertex).norm() + TOLERANCE
    {
        return None;
    }
    let t1 = vertex + to_prev * tangent_len;
    let t2 = vertex + to_next * tangent_len;

    let bisector = (to_prev + to_next).normalize();
    let center = vertex + bisector * (radius / (theta * 0.5).sin());

    let start = (t1.y - center.y).atan2(t1.x - center.x);
    let end = (t2.y - center.y).atan2(t2.x - center.x);
    let sweep = normalize_sweep(end - start);

    let mut points = Vec::with_capacity(segments as usize + 1);
    points.push(t1);
    for i in 1..segments {
        let t = f64::from(i) / f64::from(segments);
        points.push(arc_point_at(&center, radius, start, sweep, t));
    }
    points.push(t2);
    Some(points)
}
