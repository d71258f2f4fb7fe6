use std::collections::BTreeMap;

use super::face::edge_direction;
use super::outline::edge_rect;
use super::{min_extension, resolve_extension, PanelDraft};
use crate::geometry::panel::{EdgeInfo, EdgeStatus, PanelKind};
use crate::math::polygon_2d::rectangle;
use crate::math::transform::frame;
use crate::math::{Point3, Vector3};
use crate::operations::joint::{FingerJoint, Gender};
use crate::tree::{
    AssemblyData, AssemblyId, Axis, EdgeSide, FaceId, PanelEdits, PanelId, Scene, Split, VoidBounds, VoidContent,
    VoidId,
};

/// What closes off one side of a void.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Open,
    /// A solid face panel of the owning assembly.
    Face(FaceId),
    /// A divider of an enclosing subdivision.
    Divider(PanelId),
}

/// In-plane axes `(u, v)` of a divider perpendicular to `axis`.
#[must_use]
pub fn divider_axes(axis: Axis) -> (Axis, Axis) {
    match axis {
        Axis::X => (Axis::Z, Axis::Y),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

fn third_axis(a: Axis, b: Axis) -> Axis {
    Axis::ALL
        .into_iter()
        .find(|c| *c != a && *c != b)
        .unwrap_or(Axis::Z)
}

/// Boundaries of every void of an assembly, indexed by [`FaceId::index`].
#[must_use]
pub fn void_boundaries(scene: &Scene, assembly: &AssemblyData) -> BTreeMap<VoidId, [Boundary; 6]> {
    let mut out = BTreeMap::new();
    let root = FaceId::ALL.map(|f| {
        if assembly.is_solid(f) {
            Boundary::Face(f)
        } else {
            Boundary::Open
        }
    });
    out.insert(assembly.root_void, root);
    for void in scene.void_order(assembly.root_void) {
        let Ok(data) = scene.void(void) else {
            continue;
        };
        let (Some(sub), Some(own)) = (data.subdivision(), out.get(&void).copied()) else {
            continue;
        };
        let counts: Vec<usize> = sub.splits.iter().map(|s| s.positions.len() + 1).collect();
        for (k, &child) in sub.children.iter().enumerate() {
            let mut b = own;
            let mut rest = k;
            for (si, split) in sub.splits.iter().enumerate().rev() {
                let j = rest % counts[si];
                rest /= counts[si];
                if j > 0 {
                    b[FaceId::on_axis(split.axis, false).index()] = Boundary::Divider(PanelId::Divider {
                        void,
                        axis: split.axis,
                        index: j - 1,
                    });
                }
                if j < split.positions.len() {
                    b[FaceId::on_axis(split.axis, true).index()] = Boundary::Divider(PanelId::Divider {
                        void,
                        axis: split.axis,
                        index: j,
                    });
                }
            }
            out.insert(child, b);
        }
    }
    out
}

/// Drafts of every divider inside an assembly (not crossing into sub-assemblies).
pub(crate) fn divider_drafts(scene: &Scene, id: AssemblyId, assembly: &AssemblyData) -> Vec<PanelDraft> {
    let boundaries = void_boundaries(scene, assembly);
    let none = PanelEdits::default();
    let mut drafts = Vec::new();
    for void in scene.void_order(assembly.root_void) {
        let Ok(data) = scene.void(void) else {
            continue;
        };
        let VoidContent::Subdivided(sub) = &data.content else {
            continue;
        };
        let Some(sides) = boundaries.get(&void) else {
            continue;
        };
        for (si, split) in sub.splits.iter().enumerate() {
            let crossing = sub.splits.get(1 - si);
            for (index, &position) in split.positions.iter().enumerate() {
                let pid = PanelId::Divider {
                    void,
                    axis: split.axis,
                    index,
                };
                let edits = scene.edits(&pid).unwrap_or(&none);
                let mut draft = divider_draft(pid, id, assembly, &data.bounds, split.axis, position, sides, edits);
                if let Some(other) = crossing {
                    add_cross_laps(&mut draft, &data.bounds, split.axis, other, si == 0);
                }
                drafts.push(draft);
            }
        }
    }
    drafts
}

#[allow(clippy::too_many_arguments)]
fn divider_draft(
    pid: PanelId,
    owner: AssemblyId,
    assembly: &AssemblyData,
    bounds: &VoidBounds,
    axis: Axis,
    position: f64,
    sides: &[Boundary; 6],
    edits: &PanelEdits,
) -> PanelDraft {
    let mt = assembly.material.thickness;
    let (ua, va) = divider_axes(axis);
    let (u, v) = (ua.unit(), va.unit());
    let n: Vector3 = u.cross(&v);
    let mut centre = Point3::new(
        bounds.x + bounds.w * 0.5,
        bounds.y + bounds.h * 0.5,
        bounds.z + bounds.d * 0.5,
    );
    centre[axis.index()] = position;
    let transform = frame(&centre, &u, &v, &n);

    let (width, height) = (bounds.extent(ua) + 2.0 * mt, bounds.extent(va) + 2.0 * mt);
    let edges = EdgeSide::ALL.map(|side| {
        let along = if side.is_horizontal() { ua } else { va };
        let floor = min_extension(0.5 * if side.is_horizontal() { height } else { width }, mt);
        let dir = edge_direction(&u, &v, side);
        let boundary = FaceId::from_normal(&dir).map_or(Boundary::Open, |f| sides[f.index()]);
        let mate = match boundary {
            Boundary::Open => None,
            Boundary::Face(f) => Some(PanelId::Face { assembly: owner, face: f }),
            Boundary::Divider(p) => Some(p),
        };
        let status = if mate.is_some() {
            EdgeStatus::Locked
        } else {
            EdgeStatus::Unlocked
        };
        let requested = edits.extension(side);
        EdgeInfo {
            side,
            status,
            gender: mate.map(|_| Gender::Male),
            mate,
            requested_extension: requested,
            extension: resolve_extension(status, requested, floor),
            pattern: mate.map(|_| FingerJoint::new(bounds.extent(along), assembly.material).execute()),
            feet: false,
        }
    });

    PanelDraft::new(
        pid,
        PanelKind::Divider(axis),
        owner,
        (width, height, mt),
        transform,
        edges,
    )
}

/// Half-depth notches where the dividers of the other grid axis cross.
///
/// Dividers of the first split are notched from the positive side of the
/// shared axis, those of the second split from the negative side, so the
/// two interlock.
fn add_cross_laps(draft: &mut PanelDraft, bounds: &VoidBounds, axis: Axis, other: &Split, first: bool) {
    let mt = draft.thickness;
    let (ua, _) = divider_axes(axis);
    let shared = third_axis(axis, other.axis);
    let shared_is_x = ua == shared;
    let half_shared = if shared_is_x { draft.width } else { draft.height } * 0.5;
    let centre_other = bounds.min(other.axis) + bounds.extent(other.axis) * 0.5;
    let open_side = match (shared_is_x, first) {
        (true, true) => EdgeSide::Right,
        (true, false) => EdgeSide::Left,
        (false, true) => EdgeSide::Top,
        (false, false) => EdgeSide::Bottom,
    };
    // Reach past any extension of the edge the notch opens into.
    let far = half_shared + draft.edges[open_side.index()].extension.max(0.0) + 1.0;
    let (lo, hi) = if first { (0.0, far) } else { (-far, 0.0) };
    for &q in &other.positions {
        let c = q - centre_other;
        let notch = if shared_is_x {
            rectangle(lo, c - mt * 0.5, hi, c + mt * 0.5)
        } else {
            rectangle(c - mt * 0.5, lo, c + mt * 0.5, hi)
        };
        draft.reliefs.push(notch);
    }
}

/// World box of every tab on the male edges of a divider, as `(mate, corners)`.
#[must_use]
pub(crate) fn divider_tabs(draft: &PanelDraft) -> Vec<(PanelId, Vec<Point3>)> {
    let mt = draft.thickness;
    let mut out = Vec::new();
    for edge in &draft.edges {
        let (Some(mate), Some(pattern), Some(Gender::Male)) = (edge.mate, &edge.pattern, edge.gender) else {
            continue;
        };
        let half = if edge.side.is_horizontal() { draft.height } else { draft.width } * 0.5;
        for &(a, b) in &pattern.fingers {
            let rect = edge_rect(edge.side, a, b, half - mt, half);
            let corners = rect
                .iter()
                .flat_map(|p| [-mt * 0.5, mt * 0.5].map(|z| draft.to_world(p.x, p.y, z)))
                .collect();
            out.push((mate, corners));
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::MaterialConfig;

    fn scene_with_split(splits: Vec<Split>) -> (Scene, AssemblyId) {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        let root = s.assembly(id).unwrap().root_void;
        s.add_subdivision(root, splits).unwrap();
        (s, id)
    }

    #[test]
    fn single_divider_spans_to_outer_surfaces() {
        let (s, id) = scene_with_split(vec![Split {
            axis: Axis::X,
            positions: vec![100.0],
        }]);
        let drafts = divider_drafts(&s, id, s.assembly(id).unwrap());
        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert!((d.width - 100.0).abs() < 1e-9 && (d.height - 150.0).abs() < 1e-9);
        assert!(d.edges.iter().all(|e| e.status == EdgeStatus::Locked));
        let tabs = divider_tabs(d);
        assert!(tabs
            .iter()
            .any(|(m, _)| *m == PanelId::Face { assembly: id, face: FaceId::Top }));
    }

    #[test]
    fn child_voids_see_the_divider() {
        let (s, id) = scene_with_split(vec![Split {
            axis: Axis::X,
            positions: vec![100.0],
        }]);
        let a = s.assembly(id).unwrap();
        let b = void_boundaries(&s, a);
        let children = s.void(a.root_void).unwrap().subdivision().unwrap().children.clone();
        let left = b[&children[0]];
        assert!(matches!(left[FaceId::Right.index()], Boundary::Divider(_)));
        assert_eq!(left[FaceId::Left.index()], Boundary::Face(FaceId::Left));
        let right = b[&children[1]];
        assert!(matches!(right[FaceId::Left.index()], Boundary::Divider(_)));
    }

    #[test]
    fn grid_dividers_get_cross_laps() {
        let (s, id) = scene_with_split(vec![
            Split {
                axis: Axis::X,
                positions: vec![100.0],
            },
            Split {
                axis: Axis::Z,
                positions: vec![50.0],
            },
        ]);
        let drafts = divider_drafts(&s, id, s.assembly(id).unwrap());
        assert_eq!(drafts.len(), 2);
        assert!(drafts.iter().all(|d| d.reliefs.len() == 1));
    }
}
