use super::intersect_2d::segments_cross_2d;
use super::{Point2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the polygon with counter-clockwise winding.
#[must_use]
pub fn ensure_ccw(points: &[Point2]) -> Vec<Point2> {
    if signed_area(points) < 0.0 {
        points.iter().rev().copied().collect()
    } else {
        points.to_vec()
    }
}

/// Returns the polygon with clockwise winding (hole orientation).
#[must_use]
pub fn ensure_cw(points: &[Point2]) -> Vec<Point2> {
    if signed_area(points) > 0.0 {
        points.iter().rev().copied().collect()
    } else {
        points.to_vec()
    }
}

/// Removes consecutive duplicate points, including a closing point equal to the first.
#[must_use]
pub fn dedup_consecutive(points: &[Point2], tol: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        if let Some(last) = out.last() {
            if (pt - last).norm() < tol {
                continue;
            }
        }
        out.push(pt);
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() < tol {
        out.pop();
    }
    out
}

/// Removes duplicate and collinear vertices from a closed polygon.
///
/// A vertex is collinear when the cross product of its two adjacent edges is
/// below `tol` and the path does not reverse direction through it.
#[must_use]
pub fn simplify(points: &[Point2], tol: f64) -> Vec<Point2> {
    let mut pts = dedup_consecutive(points, tol);
    loop {
        let n = pts.len();
        if n < 4 {
            return pts;
        }
        let mut removed = false;
        let mut i = 0;
        while i < pts.len() && pts.len() >= 4 {
            let n = pts.len();
            let prev = pts[(i + n - 1) % n];
            let curr = pts[i];
            let next = pts[(i + 1) % n];
            let a = curr - prev;
            let b = next - curr;
            let cross = a.x * b.y - a.y * b.x;
            if cross.abs() < tol * a.norm().max(b.norm()).max(1.0) && a.dot(&b) > 0.0 {
                pts.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            return pts;
        }
    }
}

/// Ray-casting point-in-polygon test. Points on the boundary may go either way.
#[must_use]
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from `point` to the closest edge of a closed polygon.
#[must_use]
pub fn distance_to_boundary(point: &Point2, polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        best = best.min(distance_to_segment(point, &a, &b));
    }
    best
}

/// Distance from `point` to the segment `a`-`b`.
#[must_use]
pub fn distance_to_segment(point: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

/// Returns `true` if no two non-adjacent edges of the closed polygon cross or touch.
#[must_use]
pub fn is_simple(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 1)..n {
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if segments_cross_2d(&a0, &a1, &b0, &b1) {
                return false;
            }
        }
    }
    true
}

/// Returns `true` if every edge of the closed polygon is horizontal or vertical.
#[must_use]
pub fn is_axis_aligned(points: &[Point2], tol: f64) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        (a.x - b.x).abs() < tol || (a.y - b.y).abs() < tol
    })
}

/// Returns `true` if two consecutive points coincide (wrapping around).
#[must_use]
pub fn has_consecutive_duplicates(points: &[Point2], tol: f64) -> bool {
    let n = points.len();
    n > 1 && (0..n).any(|i| (points[i] - points[(i + 1) % n]).norm() < tol)
}

/// Builds a counter-clockwise axis-aligned rectangle.
#[must_use]
pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Point2> {
    vec![
        Point2::new(min_x, min_y),
        Point2::new(max_x, min_y),
        Point2::new(max_x, max_y),
        Point2::new(min_x, max_y),
    ]
}

/// Builds a counter-clockwise rectangle centred on `(cx, cy)`.
#[must_use]
pub fn centered_rectangle(cx: f64, cy: f64, width: f64, height: f64) -> Vec<Point2> {
    rectangle(
        cx - width * 0.5,
        cy - height * 0.5,
        cx + width * 0.5,
        cy + height * 0.5,
    )
}

/// Approximates a circle with a counter-clockwise regular polygon.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` for a non-positive radius or fewer than 3 segments.
pub fn circle(cx: f64, cy: f64, radius: f64, segments: usize) -> Result<Vec<Point2>> {
    if radius <= TOLERANCE || segments < 3 {
        return Err(GeometryError::Degenerate(format!(
            "circle with radius {radius} and {segments} segments"
        ))
        .into());
    }
    #[allow(clippy::cast_precision_loss)]
    let step = std::f64::consts::TAU / segments as f64;
    Ok((0..segments)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let a = step * i as f64;
            Point2::new(cx + radius * a.cos(), cy + radius * a.sin())
        })
        .collect())
}
