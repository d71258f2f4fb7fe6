use crate::operations::joint::Gender;
use crate::tree::{AssemblyData, FaceId, LidSide, TabDirection};

/// Gender of `face` at its joint with the adjacent face `mate`.
///
/// Lids follow their tab direction; wall pairs are decided by face
/// priority (the earlier face in [`FaceId::ALL`] is male). Feet force every
/// wall female against the negative lid and that lid male.
#[must_use]
pub fn face_gender(assembly: &AssemblyData, face: FaceId, mate: FaceId) -> Gender {
    if let Some(side) = assembly.lid_side(face) {
        if side == LidSide::Negative && assembly.feet.is_some() {
            return Gender::Male;
        }
        return match assembly.lids[side.index()].tab_direction {
            TabDirection::TabsIn => Gender::Female,
            TabDirection::TabsOut => Gender::Male,
        };
    }
    if assembly.lid_side(mate).is_some() {
        return face_gender(assembly, mate, face).opposite();
    }
    if face.index() < mate.index() {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// `true` when the wall edge of `face` against `mate` carries feet.
#[must_use]
pub fn has_feet(assembly: &AssemblyData, face: FaceId, mate: FaceId) -> bool {
    assembly.feet.is_some()
        && assembly.lid_side(face).is_none()
        && mate == assembly.lid_face(LidSide::Negative)
}
