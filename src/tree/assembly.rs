use serde::{Deserialize, Serialize};

use super::types::{Axis, FaceId, FeetConfig, LidConfig, LidSide, MaterialConfig, VoidBounds};
use super::void::VoidId;
use crate::math::Point3;

slotmap::new_key_type! {
    /// Unique identifier for an assembly (the root box or a nested sub-assembly).
    pub struct AssemblyId;
}

/// Data associated with an assembly.
///
/// An assembly is a closed or partially open box of six face panels that
/// owns a root void. Coordinates are world millimetres; `origin` is the
/// minimum corner of the outer box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyData {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub origin: Point3,
    pub material: MaterialConfig,
    /// Solid flag per face, indexed by [`FaceId::index`].
    pub solid: [bool; 6],
    /// Axis the lids are perpendicular to.
    pub axis: Axis,
    /// Lid configs indexed by [`LidSide::index`].
    pub lids: [LidConfig; 2],
    pub feet: Option<FeetConfig>,
    pub root_void: VoidId,
    /// The void this assembly sits in, for sub-assemblies.
    pub parent_void: Option<VoidId>,
    /// Gap kept between a sub-assembly and its parent void on every side.
    pub clearance: f64,
}

impl AssemblyData {
    /// Outer extent along `axis`.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        }
    }

    /// Outer box of the assembly.
    #[must_use]
    pub fn outer_bounds(&self) -> VoidBounds {
        VoidBounds {
            x: self.origin.x,
            y: self.origin.y,
            z: self.origin.z,
            w: self.width,
            h: self.height,
            d: self.depth,
        }
    }

    /// Interior region enclosed by the face panels.
    #[must_use]
    pub fn interior_bounds(&self) -> VoidBounds {
        self.outer_bounds().inset(self.material.thickness)
    }

    #[must_use]
    pub fn is_solid(&self, face: FaceId) -> bool {
        self.solid[face.index()]
    }

    /// Face acting as the lid on `side`.
    #[must_use]
    pub fn lid_face(&self, side: LidSide) -> FaceId {
        FaceId::on_axis(self.axis, side == LidSide::Positive)
    }

    /// Lid side of `face`, or `None` for a wall.
    #[must_use]
    pub fn lid_side(&self, face: FaceId) -> Option<LidSide> {
        if face.axis() != self.axis {
            return None;
        }
        Some(if face.is_positive() {
            LidSide::Positive
        } else {
            LidSide::Negative
        })
    }

    #[must_use]
    pub fn is_sub_assembly(&self) -> bool {
        self.parent_void.is_some()
    }

    /// Panel dimensions `(width, height)` of a face panel.
    #[must_use]
    pub fn face_dimensions(&self, face: FaceId) -> (f64, f64) {
        match face.axis() {
            Axis::Z => (self.width, self.height),
            Axis::X => (self.depth, self.height),
            Axis::Y => (self.width, self.depth),
        }
    }
}
