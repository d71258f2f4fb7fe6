//! Oriented boxes around panels and the separating axis test between them.

use serde::{Deserialize, Serialize};

use crate::geometry::panel::Panel;
use crate::math::bounds::Aabb;
use crate::math::transform::{axis, transform_point};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Oriented bounding box of a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obb {
    pub center: Point3,
    /// Unit axes (panel x, y, normal).
    pub axes: [Vector3; 3],
    /// Half extents along `axes`.
    pub half: [f64; 3],
}

impl Obb {
    /// Box around the actual outline (teeth and extensions included),
    /// extruded by the panel thickness.
    #[must_use]
    pub fn from_panel(panel: &Panel) -> Self {
        let b = panel.outline_bounds();
        let c = b.center();
        Self {
            center: transform_point(&panel.transform, &Point3::new(c.x, c.y, 0.0)),
            axes: [axis(&panel.transform, 0), axis(&panel.transform, 1), axis(&panel.transform, 2)],
            half: [b.width() * 0.5, b.height() * 0.5, panel.thickness * 0.5],
        }
    }

    #[must_use]
    pub fn corners(&self) -> [Point3; 8] {
        let mut out = [self.center; 8];
        for (i, p) in out.iter_mut().enumerate() {
            for (k, a) in self.axes.iter().enumerate() {
                let sign = if (i >> k) & 1 == 0 { -1.0 } else { 1.0 };
                *p += a * (sign * self.half[k]);
            }
        }
        out
    }

    /// World-space axis-aligned bounds.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        let corners = self.corners();
        Aabb::of(&corners).unwrap_or(Aabb {
            min: self.center,
            max: self.center,
        })
    }

    fn project(&self, dir: &Vector3) -> (f64, f64) {
        let c = self.center.coords.dot(dir);
        let r: f64 = self
            .axes
            .iter()
            .zip(self.half)
            .map(|(a, h)| h * a.dot(dir).abs())
            .sum();
        (c - r, c + r)
    }
}

/// Minimum penetration depth between two boxes, or `None` when a
/// separating axis exists.
///
/// Tests the 3 face normals of each box and the 9 cross products of their
/// axes. Touching boxes count as separated.
#[must_use]
pub fn penetration_depth(a: &Obb, b: &Obb) -> Option<f64> {
    let mut candidates: Vec<Vector3> = Vec::with_capacity(15);
    candidates.extend(a.axes);
    candidates.extend(b.axes);
    for u in &a.axes {
        for v in &b.axes {
            let c = u.cross(v);
            let n = c.norm();
            // Parallel axes are already covered by the face normals.
            if n > 1e-6 {
                candidates.push(c / n);
            }
        }
    }

    let mut depth = f64::INFINITY;
    for dir in &candidates {
        let (a_lo, a_hi) = a.project(dir);
        let (b_lo, b_hi) = b.project(dir);
        let overlap = a_hi.min(b_hi) - a_lo.max(b_lo);
        if overlap <= TOLERANCE {
            return None;
        }
        depth = depth.min(overlap);
    }
    Some(depth)
}
