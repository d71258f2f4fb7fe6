use serde::{Deserialize, Serialize};

use crate::math::{Point2, TOLERANCE};
use crate::tree::MaterialConfig;

/// Most finger cells one edge is cut into; longer edges keep a straight run
/// at both ends.
pub const MAX_FINGER_CELLS: usize = 2001;

/// Which side of a joint carries the fingers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    /// Fingers stick out of this edge.
    Male,
    /// This edge receives the mate's fingers.
    Female,
}

impl Gender {
    #[must_use]
    pub fn opposite(self) -> Gender {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

/// Finger layout along one edge.
///
/// Positions are measured along the edge from its centre, so a pattern and
/// its mirror image are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerPattern {
    /// Full edge length the pattern was computed for.
    pub length: f64,
    /// Joint region `(start, end)` after the locked-end insets.
    pub region: (f64, f64),
    /// Finger intervals `(start, end)`, ascending and disjoint.
    pub fingers: Vec<(f64, f64)>,
}

impl FingerPattern {
    #[must_use]
    pub fn is_straight(&self) -> bool {
        self.fingers.is_empty()
    }

    /// Polyline of the edge in edge coordinates: `x` runs along the edge from
    /// `from` to `to`, `y` is the offset from the base line.
    ///
    /// Teeth rise to `depth` over each finger interval (use a negative depth
    /// for notches). The end points sit on the base line.
    #[must_use]
    pub fn polyline(&self, from: f64, to: f64, depth: f64) -> Vec<Point2> {
        let forward = to >= from;
        let (lo, hi) = if forward { (from, to) } else { (to, from) };
        let mut out = Vec::with_capacity(self.fingers.len() * 4 + 2);
        push_unique_point(&mut out, Point2::new(lo, 0.0));
        for &(a, b) in &self.fingers {
            let (a, b) = (a.max(lo), b.min(hi));
            if b - a <= TOLERANCE {
                continue;
            }
            push_unique_point(&mut out, Point2::new(a, 0.0));
            push_unique_point(&mut out, Point2::new(a, depth));
            push_unique_point(&mut out, Point2::new(b, depth));
            push_unique_point(&mut out, Point2::new(b, 0.0));
        }
        push_unique_point(&mut out, Point2::new(hi, 0.0));
        if !forward {
            out.reverse();
        }
        out
    }
}

/// Generates the finger pattern for one edge of a joint.
///
/// Both mates of a joint compute the same pattern: it depends only on the
/// edge length, the material and the lock flags, never on the gender.
pub struct FingerJoint {
    length: f64,
    material: MaterialConfig,
    locked: (bool, bool),
}

impl FingerJoint {
    /// Creates a new `FingerJoint` for an edge of `length` mm.
    #[must_use]
    pub fn new(length: f64, material: MaterialConfig) -> Self {
        Self {
            length,
            material,
            locked: (false, false),
        }
    }

    /// Marks the edge ends that abut another joint; each locked end loses MT
    /// of joint region.
    #[must_use]
    pub fn locked(mut self, start: bool, end: bool) -> Self {
        self.locked = (start, end);
        self
    }

    /// Computes the pattern.
    ///
    /// The usable span (joint region minus the corner clearance at both ends)
    /// is cut into an odd number of `finger_width` cells centred on the edge;
    /// even cells are fingers. Edges too short for that get a single centred
    /// finger a third of the region wide, or no finger when that would be
    /// thinner than the material.
    #[must_use]
    pub fn execute(&self) -> FingerPattern {
        let mt = self.material.thickness;
        let half = self.length * 0.5;
        let start = -half + if self.locked.0 { mt } else { 0.0 };
        let end = half - if self.locked.1 { mt } else { 0.0 };
        let region_len = end - start;
        let centre = (start + end) * 0.5;
        let fw = self.material.finger_width;
        let clearance = self.material.corner_clearance();

        let mut pattern = FingerPattern {
            length: self.length,
            region: (start, end),
            fingers: Vec::new(),
        };
        if region_len <= TOLERANCE || fw <= TOLERANCE {
            return pattern;
        }

        let usable = region_len - 2.0 * clearance;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut cells = if usable > 0.0 {
            ((usable / fw + TOLERANCE).floor() as usize).min(MAX_FINGER_CELLS)
        } else {
            0
        };
        if cells % 2 == 0 {
            cells = cells.saturating_sub(1);
        }

        if region_len < 2.0 * (fw + clearance) || cells == 0 {
            let width = region_len / 3.0;
            if width >= mt {
                pattern
                    .fingers
                    .push((centre - width * 0.5, centre + width * 0.5));
            }
            return pattern;
        }

        #[allow(clippy::cast_precision_loss)]
        let first = centre - cells as f64 * fw * 0.5;
        for i in (0..cells).step_by(2) {
            #[allow(clippy::cast_precision_loss)]
            let a = first + i as f64 * fw;
            pattern.fingers.push((a, a + fw));
        }
        pattern
    }
}

/// Appends `point` unless it repeats the previous one.
pub(crate) fn push_unique_point(path: &mut Vec<Point2>, point: Point2) {
    if let Some(last) = path.last() {
        if (point - last).norm() < TOLERANCE {
            return;
        }
    }
    path.push(point);
}
