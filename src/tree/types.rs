use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// A world axis of the assembly frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1, 2).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// One of the six outer faces of an assembly.
///
/// Front is `+Z`, right is `+X`, top is `+Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaceId {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl FaceId {
    /// All faces in wall-priority order (earlier faces win the male role).
    pub const ALL: [FaceId; 6] = [
        FaceId::Front,
        FaceId::Back,
        FaceId::Left,
        FaceId::Right,
        FaceId::Top,
        FaceId::Bottom,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            FaceId::Front => 0,
            FaceId::Back => 1,
            FaceId::Left => 2,
            FaceId::Right => 3,
            FaceId::Top => 4,
            FaceId::Bottom => 5,
        }
    }

    /// Axis the face is perpendicular to.
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            FaceId::Front | FaceId::Back => Axis::Z,
            FaceId::Left | FaceId::Right => Axis::X,
            FaceId::Top | FaceId::Bottom => Axis::Y,
        }
    }

    /// `true` for the face on the positive side of its axis.
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, FaceId::Front | FaceId::Right | FaceId::Top)
    }

    /// Outward unit normal.
    #[must_use]
    pub fn normal(self) -> Vector3 {
        let n = self.axis().unit();
        if self.is_positive() {
            n
        } else {
            -n
        }
    }

    /// Face whose outward normal matches `dir` (within a loose tolerance).
    #[must_use]
    pub fn from_normal(dir: &Vector3) -> Option<FaceId> {
        FaceId::ALL
            .into_iter()
            .find(|f| (f.normal() - dir).norm() < 1e-6)
    }

    /// Face on the given side of `axis`.
    #[must_use]
    pub fn on_axis(axis: Axis, positive: bool) -> FaceId {
        match (axis, positive) {
            (Axis::X, true) => FaceId::Right,
            (Axis::X, false) => FaceId::Left,
            (Axis::Y, true) => FaceId::Top,
            (Axis::Y, false) => FaceId::Bottom,
            (Axis::Z, true) => FaceId::Front,
            (Axis::Z, false) => FaceId::Back,
        }
    }
}

/// Sheet material and joint sizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Sheet thickness in mm (MT).
    pub thickness: f64,
    /// Width of a single finger (and of the space between fingers) in mm.
    pub finger_width: f64,
    /// Clearance kept free of fingers at each joint end, in multiples of `finger_width`.
    pub finger_gap: f64,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            thickness: 3.0,
            finger_width: 10.0,
            finger_gap: 1.5,
        }
    }
}

impl MaterialConfig {
    /// Corner clearance in mm.
    #[must_use]
    pub fn corner_clearance(&self) -> f64 {
        self.finger_gap * self.finger_width
    }
}

/// Which way a lid's joints point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TabDirection {
    /// Wall tabs go into the lid (lid is female).
    #[default]
    TabsIn,
    /// Lid tabs go into the walls (lid is male).
    TabsOut,
}

/// Joint configuration of one lid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LidConfig {
    pub tab_direction: TabDirection,
}

/// Identifies one of the two lids (the faces perpendicular to the assembly axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LidSide {
    Negative,
    Positive,
}

impl LidSide {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            LidSide::Negative => 0,
            LidSide::Positive => 1,
        }
    }
}

/// Feet cut into the walls below the negative-axis lid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeetConfig {
    /// How far the feet reach past the box body, in mm.
    pub height: f64,
    /// Width of each foot, in mm.
    pub width: f64,
    /// Distance from each wall end to its foot, in mm.
    pub inset: f64,
}

/// Axis-aligned interior region of a void, in assembly coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoidBounds {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub h: f64,
    pub d: f64,
}

impl VoidBounds {
    /// Lower coordinate along `axis`.
    #[must_use]
    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Extent along `axis`.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
            Axis::Z => self.d,
        }
    }

    /// Upper coordinate along `axis`.
    #[must_use]
    pub fn max(&self, axis: Axis) -> f64 {
        self.min(axis) + self.extent(axis)
    }

    /// Copy with the range along `axis` replaced.
    #[must_use]
    pub fn with_range(&self, axis: Axis, min: f64, extent: f64) -> Self {
        let mut b = *self;
        match axis {
            Axis::X => {
                b.x = min;
                b.w = extent;
            }
            Axis::Y => {
                b.y = min;
                b.h = extent;
            }
            Axis::Z => {
                b.z = min;
                b.d = extent;
            }
        }
        b
    }

    /// Shrinks the bounds by `margin` on every side.
    #[must_use]
    pub fn inset(&self, margin: f64) -> Self {
        Self {
            x: self.x + margin,
            y: self.y + margin,
            z: self.z + margin,
            w: self.w - 2.0 * margin,
            h: self.h - 2.0 * margin,
            d: self.d - 2.0 * margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_normals_roundtrip() {
        for face in FaceId::ALL {
            assert_eq!(FaceId::from_normal(&face.normal()), Some(face));
            assert_eq!(FaceId::on_axis(face.axis(), face.is_positive()), face);
        }
    }

    #[test]
    fn bounds_inset() {
        let b = VoidBounds {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 200.0,
            h: 150.0,
            d: 100.0,
        }
        .inset(3.0);
        assert!((b.x - 3.0).abs() < 1e-12);
        assert!((b.w - 194.0).abs() < 1e-12);
        assert!((b.max(Axis::Z) - 97.0).abs() < 1e-12);
    }
}
