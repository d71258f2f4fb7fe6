use super::genders::{face_gender, has_feet};
use super::outline::{edge_rect, extension_slots};
use super::{min_extension, resolve_extension, PanelDraft};
use crate::geometry::panel::{EdgeInfo, EdgeStatus, PanelKind};
use crate::math::transform::frame;
use crate::math::{Point3, Vector3};
use crate::operations::joint::{FingerJoint, Gender};
use crate::tree::{AssemblyData, AssemblyId, EdgeSide, FaceId, PanelEdits, PanelId, Scene};

/// In-plane axes `(u, v)` of a face panel; the normal `u x v` points outwards.
#[must_use]
pub fn face_axes(face: FaceId) -> (Vector3, Vector3) {
    match face {
        FaceId::Front => (Vector3::x(), Vector3::y()),
        FaceId::Back => (-Vector3::x(), Vector3::y()),
        FaceId::Left => (Vector3::z(), Vector3::y()),
        FaceId::Right => (-Vector3::z(), Vector3::y()),
        FaceId::Top => (Vector3::x(), -Vector3::z()),
        FaceId::Bottom => (Vector3::x(), Vector3::z()),
    }
}

/// World direction of a local edge's outward side.
#[must_use]
pub fn edge_direction(u: &Vector3, v: &Vector3, side: EdgeSide) -> Vector3 {
    match side {
        EdgeSide::Top => *v,
        EdgeSide::Bottom => -v,
        EdgeSide::Right => *u,
        EdgeSide::Left => -u,
    }
}

/// Face adjacent to `face` across `side`.
#[must_use]
pub fn mate_face(face: FaceId, side: EdgeSide) -> Option<FaceId> {
    let (u, v) = face_axes(face);
    FaceId::from_normal(&edge_direction(&u, &v, side))
}

/// Drafts of the solid faces of one assembly.
pub(crate) fn face_drafts(scene: &Scene, id: AssemblyId, assembly: &AssemblyData) -> Vec<PanelDraft> {
    let none = PanelEdits::default();
    FaceId::ALL
        .into_iter()
        .filter(|f| assembly.is_solid(*f))
        .map(|face| {
            let edits = scene.edits(&PanelId::Face { assembly: id, face }).unwrap_or(&none);
            face_draft(id, assembly, face, edits)
        })
        .collect()
}

fn face_draft(id: AssemblyId, assembly: &AssemblyData, face: FaceId, edits: &PanelEdits) -> PanelDraft {
    let mt = assembly.material.thickness;
    let (width, height) = assembly.face_dimensions(face);
    let (u, v) = face_axes(face);
    let n = u.cross(&v);

    let outer = assembly.outer_bounds();
    let centre = Point3::new(
        outer.x + outer.w * 0.5,
        outer.y + outer.h * 0.5,
        outer.z + outer.d * 0.5,
    ) + n * (assembly.extent(face.axis()) * 0.5 - mt * 0.5);
    let transform = frame(&centre, &u, &v, &n);

    let mates = EdgeSide::ALL.map(|side| mate_face(face, side));
    let jointed = mates.map(|m| m.is_some_and(|m| assembly.is_solid(m)));
    let feet_height = assembly.feet.map_or(0.0, |f| f.height);

    let edges = EdgeSide::ALL.map(|side| {
        let mate = mates[side.index()];
        let feet = mate.is_some_and(|m| has_feet(assembly, face, m));
        let requested = edits.extension(side);
        let len = if side.is_horizontal() { width } else { height };
        let floor = min_extension(0.5 * if side.is_horizontal() { height } else { width }, mt);
        let [start, end] = side.neighbours();
        let (gender, status) = match mate.filter(|m| assembly.is_solid(*m)) {
            Some(m) => match face_gender(assembly, face, m) {
                Gender::Male => (Some(Gender::Male), EdgeStatus::Locked),
                Gender::Female => (Some(Gender::Female), EdgeStatus::OutwardOnly),
            },
            None => (None, EdgeStatus::Unlocked),
        };
        EdgeInfo {
            side,
            status,
            gender,
            mate: gender.and(mate).map(|m| PanelId::Face { assembly: id, face: m }),
            requested_extension: requested,
            extension: resolve_extension(status, requested, floor) + if feet { feet_height } else { 0.0 },
            pattern: gender.map(|_| {
                FingerJoint::new(len, assembly.material)
                    .locked(jointed[start.index()], jointed[end.index()])
                    .execute()
            }),
            feet,
        }
    });

    let mut draft = PanelDraft::new(
        PanelId::Face { assembly: id, face },
        PanelKind::Face(face),
        id,
        (width, height, mt),
        transform,
        edges,
    );
    add_extension_slots(&mut draft, assembly);
    draft
}

/// Collects extension slots; on feet edges the slots inside a relief span
/// open into the relief instead of staying closed holes.
fn add_extension_slots(draft: &mut PanelDraft, assembly: &AssemblyData) {
    let (w, h, mt) = (draft.width, draft.height, draft.thickness);
    for edge in &draft.edges {
        let slots = extension_slots(edge, w, h, mt);
        let spans = match assembly.feet {
            Some(feet) if edge.feet => feet_reliefs(edge.side, w, h, edge.extension, &draft.edges, feet),
            _ => Vec::new(),
        };
        for (i, slot) in slots.into_iter().enumerate() {
            let (a, b) = edge.pattern.as_ref().map_or((0.0, 0.0), |p| p.fingers[i]);
            if spans.iter().any(|&(lo, hi, _)| a < hi && b > lo) {
                draft.reliefs.push(slot);
            } else {
                draft.extension_slots.push((edge.side, i, slot));
            }
        }
        draft.reliefs.extend(spans.into_iter().map(|(_, _, rect)| rect));
    }
}

/// Relief rectangles between the feet of an edge, with their spans along it.
///
/// Feet of `width` mm stand `inset` mm from each end; everything else of the
/// feet extension is cut back to the body edge.
fn feet_reliefs(
    side: EdgeSide,
    width: f64,
    height: f64,
    extension: f64,
    edges: &[EdgeInfo; 4],
    feet: crate::tree::FeetConfig,
) -> Vec<(f64, f64, Vec<crate::math::Point2>)> {
    let (half, half_along) = if side.is_horizontal() {
        (height * 0.5, width * 0.5)
    } else {
        (width * 0.5, height * 0.5)
    };
    let reach = half_along
        + 1.0
        + side
            .neighbours()
            .iter()
            .map(|s| edges[s.index()].extension)
            .fold(0.0, f64::max);
    let far = half + extension + 1.0;
    let mut spans = vec![(
        -half_along + feet.inset + feet.width,
        half_along - feet.inset - feet.width,
    )];
    if feet.inset > crate::math::EPSILON_MM {
        spans.push((-reach, -half_along + feet.inset));
        spans.push((half_along - feet.inset, reach));
    }
    spans
        .into_iter()
        .filter(|(lo, hi)| hi - lo > crate::math::EPSILON_MM)
        .map(|(lo, hi)| (lo, hi, edge_rect(side, lo, hi, half, far)))
        .collect()
}
