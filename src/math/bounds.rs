use serde::{Deserialize, Serialize};

use super::{Point2, Point3};

/// An axis-aligned 2D rectangle in panel-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds2 {
    /// Bounds of a point set, or `None` when empty.
    #[must_use]
    pub fn of(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Returns `true` if the rectangles share interior area larger than `eps` on both axes.
    #[must_use]
    pub fn overlaps(&self, other: &Self, eps: f64) -> bool {
        self.min_x < other.max_x - eps
            && other.min_x < self.max_x - eps
            && self.min_y < other.max_y - eps
            && other.min_y < self.max_y - eps
    }
}

/// An axis-aligned 3D bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Bounds of a point set, or `None` when empty.
    #[must_use]
    pub fn of(points: &[Point3]) -> Option<Self> {
        let first = *points.first()?;
        let mut b = Self {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            for k in 0..3 {
                b.min[k] = b.min[k].min(p[k]);
                b.max[k] = b.max[k].max(p[k]);
            }
        }
        Some(b)
    }

    /// Returns `true` if the boxes interpenetrate by more than `eps` on every axis.
    #[must_use]
    pub fn overlaps(&self, other: &Self, eps: f64) -> bool {
        (0..3).all(|k| self.min[k] < other.max[k] - eps && other.min[k] < self.max[k] - eps)
    }

    /// Returns `true` if `other` lies inside this box grown by `margin`.
    #[must_use]
    pub fn contains(&self, other: &Self, margin: f64) -> bool {
        (0..3).all(|k| other.min[k] >= self.min[k] - margin && other.max[k] <= self.max[k] + margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_points() {
        let b = Bounds2::of(&[Point2::new(-1.0, 2.0), Point2::new(3.0, -4.0)]);
        let b = b.unwrap_or(Bounds2 {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        });
        assert!((b.width() - 4.0).abs() < 1e-12);
        assert!((b.height() - 6.0).abs() < 1e-12);
        assert!(Bounds2::of(&[]).is_none());
    }

    #[test]
    fn aabb_touching_is_not_overlap() {
        let a = Aabb {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(1.0, 1.0, 1.0),
        };
        let b = Aabb {
            min: Point3::new(1.0, 0.0, 0.0),
            max: Point3::new(2.0, 1.0, 1.0),
        };
        assert!(!a.overlaps(&b, 0.01));
        let c = Aabb {
            min: Point3::new(0.5, 0.5, 0.5),
            max: Point3::new(2.0, 2.0, 2.0),
        };
        assert!(a.overlaps(&c, 0.01));
    }
}
