use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::math::{Point2, Vector2};

/// A point on an edge path: `t` runs along the edge from its start corner (0)
/// to its end corner (1); `offset` is the outward deviation in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePathPoint {
    pub t: f64,
    pub offset: f64,
}

impl EdgePathPoint {
    #[must_use]
    pub fn new(t: f64, offset: f64) -> Self {
        Self { t, offset }
    }
}

/// Deviation of a panel edge from its straight line.
///
/// When `mirrored` is set only the first half (`t <= 0.5`) is stored and the
/// second half is its reflection about `t = 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePath {
    pub points: Vec<EdgePathPoint>,
    #[serde(default)]
    pub mirrored: bool,
}

const T_TOL: f64 = 1e-9;

impl EdgePath {
    #[must_use]
    pub fn new(points: Vec<EdgePathPoint>) -> Self {
        Self {
            points,
            mirrored: false,
        }
    }

    /// Checks that the path is well formed.
    ///
    /// # Errors
    ///
    /// Rejects paths with fewer than two points, non-finite values, `t`
    /// outside `[0, 1]` or decreasing `t`.
    pub fn validate(&self) -> Result<()> {
        if self.points.len() < 2 {
            return Err(invalid("edge path needs at least 2 points"));
        }
        let limit = if self.mirrored { 0.5 } else { 1.0 };
        let mut last = f64::NEG_INFINITY;
        for p in &self.points {
            if !p.t.is_finite() || !p.offset.is_finite() {
                return Err(invalid("edge path contains a non-finite value"));
            }
            if p.t < -T_TOL || p.t > limit + T_TOL {
                return Err(invalid(format!("edge path t = {} out of range", p.t)));
            }
            if p.t < last - T_TOL {
                return Err(invalid("edge path t values must not decrease"));
            }
            last = p.t;
        }
        Ok(())
    }

    /// Full-length point list with mirroring expanded and anchors at `t = 0` and `t = 1`.
    #[must_use]
    pub fn resolved(&self) -> Vec<EdgePathPoint> {
        let mut pts: Vec<EdgePathPoint> = if self.mirrored {
            let half: Vec<EdgePathPoint> = self
                .points
                .iter()
                .copied()
                .filter(|p| p.t <= 0.5 + T_TOL)
                .collect();
            let mut full = half.clone();
            for p in half.iter().rev() {
                let mirrored = EdgePathPoint::new(1.0 - p.t, p.offset);
                if full
                    .last()
                    .is_some_and(|l| (l.t - mirrored.t).abs() < T_TOL && (l.offset - mirrored.offset).abs() < T_TOL)
                {
                    continue;
                }
                full.push(mirrored);
            }
            full
        } else {
            self.points.clone()
        };
        if pts.first().is_none_or(|p| p.t > T_TOL || p.offset.abs() > T_TOL) {
            pts.insert(0, EdgePathPoint::new(0.0, 0.0));
        }
        if pts
            .last()
            .is_none_or(|p| p.t < 1.0 - T_TOL || p.offset.abs() > T_TOL)
        {
            pts.push(EdgePathPoint::new(1.0, 0.0));
        }
        dedup_path(&pts)
    }

    /// `true` when every offset is zero, so the path leaves the edge straight.
    #[must_use]
    pub fn is_straight(&self, tol: f64) -> bool {
        self.points.iter().all(|p| p.offset.abs() < tol)
    }

    /// `true` when consecutive points share either `t` or the offset.
    #[must_use]
    pub fn is_axis_aligned(&self, tol: f64) -> bool {
        self.resolved()
            .windows(2)
            .all(|w| (w[0].t - w[1].t).abs() < tol || (w[0].offset - w[1].offset).abs() < tol)
    }

    /// Maps the path onto the segment `start -> end`, pushing offsets along `outward`.
    ///
    /// The returned points include both corners.
    #[must_use]
    pub fn apply(&self, start: &Point2, end: &Point2, outward: &Vector2) -> Vec<Point2> {
        let along = end - start;
        self.resolved()
            .iter()
            .map(|p| start + along * p.t + outward * p.offset)
            .collect()
    }

    /// Offset at parameter `t`, linearly interpolated (first match for vertical steps).
    #[must_use]
    pub fn offset_at(&self, t: f64) -> f64 {
        interpolate(&self.resolved(), t)
    }
}

/// Removes consecutive duplicate path points.
#[must_use]
pub fn dedup_path(points: &[EdgePathPoint]) -> Vec<EdgePathPoint> {
    let mut out: Vec<EdgePathPoint> = Vec::with_capacity(points.len());
    for &p in points {
        if out
            .last()
            .is_some_and(|l| (l.t - p.t).abs() < T_TOL && (l.offset - p.offset).abs() < T_TOL)
        {
            continue;
        }
        out.push(p);
    }
    out
}

pub(crate) fn interpolate(points: &[EdgePathPoint], t: f64) -> f64 {
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if t >= a.t - T_TOL && t <= b.t + T_TOL {
            let span = b.t - a.t;
            if span.abs() < T_TOL {
                return a.offset;
            }
            return a.offset + (b.offset - a.offset) * (t - a.t) / span;
        }
    }
    0.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn notch() -> EdgePath {
        EdgePath::new(vec![
            EdgePathPoint::new(0.2, 0.0),
            EdgePathPoint::new(0.2, -5.0),
            EdgePathPoint::new(0.4, -5.0),
            EdgePathPoint::new(0.4, 0.0),
        ])
    }

    #[test]
    fn resolved_adds_anchors() {
        let pts = notch().resolved();
        assert_eq!(pts.len(), 6);
        assert!(pts[0].t.abs() < T_TOL);
        assert!((pts[5].t - 1.0).abs() < T_TOL);
    }

    #[test]
    fn mirrored_path_reflects_second_half() {
        let mut path = notch();
        path.mirrored = true;
        let pts = path.resolved();
        assert!(pts.iter().any(|p| (p.t - 0.8).abs() < 1e-9 && (p.offset + 5.0).abs() < 1e-9));
        assert!(pts.windows(2).all(|w| w[1].t >= w[0].t - 1e-12));
    }

    #[test]
    fn apply_maps_onto_edge() {
        let pts = notch().apply(
            &Point2::new(-50.0, 40.0),
            &Point2::new(50.0, 40.0),
            &Vector2::new(0.0, 1.0),
        );
        assert!((pts[1].x + 30.0).abs() < 1e-9);
        assert!((pts[2].y - 35.0).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_decreasing_t() {
        let path = EdgePath::new(vec![EdgePathPoint::new(0.5, 0.0), EdgePathPoint::new(0.2, 0.0)]);
        assert!(path.validate().is_err());
        assert!(notch().validate().is_ok());
    }

    #[test]
    fn offset_interpolation() {
        assert!((notch().offset_at(0.3) + 5.0).abs() < 1e-9);
        assert!(notch().offset_at(0.9).abs() < 1e-9);
    }
}
