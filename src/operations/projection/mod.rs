//! Derivation of cuttable panels from the node tree.
//!
//! Projection runs in three passes: every assembly contributes drafts for its
//! solid faces and its dividers, divider tabs then cut slots into their
//! mates, and finally each draft becomes a [`Panel`] with outline, holes and
//! fillets.

mod divider;
mod face;
mod genders;
mod outline;
mod slots;

use tracing::{debug, instrument, warn};

pub use divider::{divider_axes, void_boundaries, Boundary};
pub use face::{edge_direction, face_axes, mate_face};
pub use genders::{face_gender, has_feet};
pub use outline::{base_level, build_outline, edge_rect, extension_slots, is_rectilinear, min_extension};

use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::panel::{EdgeInfo, EdgeStatus, Hole, HoleId, Panel, PanelKind};
use crate::math::polygon_2d::ensure_cw;
use crate::math::transform::{rigid_inverse, transform_point};
use crate::math::{Matrix4, Point2, Point3};
use crate::operations::boolean::{largest, subtract_all};
use crate::operations::fillet::apply_panel_fillets;
use crate::tree::{AssemblyId, EdgeSide, PanelEdits, PanelId, Scene};

/// Extension that reaches the outline for a requested value.
///
/// Locked edges never move; outward-only edges cannot shrink; open edges
/// shrink no further than `floor`.
#[must_use]
pub fn resolve_extension(status: EdgeStatus, requested: f64, floor: f64) -> f64 {
    match status {
        EdgeStatus::Locked => 0.0,
        EdgeStatus::OutwardOnly => requested.max(0.0),
        EdgeStatus::Unlocked => requested.max(floor),
    }
}

/// A panel between edge resolution and outline construction.
pub(crate) struct PanelDraft {
    pub id: PanelId,
    pub kind: PanelKind,
    pub owner: AssemblyId,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub transform: Matrix4,
    pub edges: [EdgeInfo; 4],
    /// Slots cut by divider tabs, with the divider they receive.
    pub slots: Vec<(PanelId, Vec<Point2>)>,
    /// Closed slots left in extended female edges.
    pub extension_slots: Vec<(EdgeSide, usize, Vec<Point2>)>,
    /// Areas cut back from the outline (feet reliefs, cross-lap notches).
    pub reliefs: Vec<Vec<Point2>>,
}

impl PanelDraft {
    pub(crate) fn new(
        id: PanelId,
        kind: PanelKind,
        owner: AssemblyId,
        (width, height, thickness): (f64, f64, f64),
        transform: Matrix4,
        edges: [EdgeInfo; 4],
    ) -> Self {
        Self {
            id,
            kind,
            owner,
            width,
            height,
            thickness,
            transform,
            edges,
            slots: Vec::new(),
            extension_slots: Vec::new(),
            reliefs: Vec::new(),
        }
    }

    pub(crate) fn to_world(&self, x: f64, y: f64, z: f64) -> Point3 {
        transform_point(&self.transform, &Point3::new(x, y, z))
    }

    pub(crate) fn to_local(&self, p: &Point3) -> Point3 {
        transform_point(&rigid_inverse(&self.transform), p)
    }
}

/// Derives every panel of the scene.
///
/// The result depends only on the scene: the same tree always yields the
/// same panels in the same order (assemblies depth first, faces in
/// [`crate::tree::FaceId::ALL`] order, then dividers).
///
/// # Errors
///
/// Returns an error only for a corrupted tree.
#[instrument(skip_all, fields(revision = scene.revision()))]
pub fn project(scene: &Scene, config: &KernelConfig) -> Result<Vec<Panel>> {
    let mut drafts = Vec::new();
    for id in scene.assembly_order() {
        let assembly = scene.assembly(id)?;
        drafts.extend(face::face_drafts(scene, id, assembly));
        drafts.extend(divider::divider_drafts(scene, id, assembly));
    }
    slots::add_tab_slots(&mut drafts);

    let none = PanelEdits::default();
    let panels: Vec<Panel> = drafts
        .into_iter()
        .map(|draft| {
            let edits = scene.edits(&draft.id).unwrap_or(&none);
            build_panel(draft, edits, config)
        })
        .collect();
    debug!(panels = panels.len(), "projection finished");
    Ok(panels)
}

fn build_panel(draft: PanelDraft, edits: &PanelEdits, config: &KernelConfig) -> Panel {
    let mut outline = build_outline(
        draft.width,
        draft.height,
        draft.thickness,
        &draft.edges,
        Some(&edits.edge_paths),
    );
    if !draft.reliefs.is_empty() {
        if let Some(shape) = largest(subtract_all(&outline, &[], &draft.reliefs)) {
            outline = shape.outer;
        }
    }

    let mut holes: Vec<Hole> = Vec::new();
    for (k, (mate, points)) in draft.slots.into_iter().enumerate() {
        holes.push(Hole {
            id: HoleId::Slot(k),
            mate: Some(mate),
            points: ensure_cw(&points),
        });
    }
    for (side, i, points) in draft.extension_slots {
        holes.push(Hole {
            id: HoleId::ExtensionSlot(side, i),
            mate: draft.edges[side.index()].mate,
            points: ensure_cw(&points),
        });
    }
    let mut has_curves = false;
    for cutout in &edits.cutouts {
        match cutout.shape.to_polygon() {
            Ok(points) => {
                has_curves |= cutout.shape.is_curved();
                holes.push(Hole {
                    id: HoleId::Cutout(cutout.id.clone()),
                    mate: None,
                    points: ensure_cw(&points),
                });
            }
            Err(err) => warn!(panel = %draft.id, cutout = %cutout.id, %err, "cutout skipped"),
        }
    }

    let mut panel = Panel {
        id: draft.id,
        kind: draft.kind,
        owner: draft.owner,
        width: draft.width,
        height: draft.height,
        thickness: draft.thickness,
        transform: draft.transform,
        edges: draft.edges,
        outline,
        holes,
        has_curves,
        fillets: Vec::new(),
        corners: Vec::new(),
    };
    apply_panel_fillets(&mut panel, edits, config);
    panel
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::bounds::Bounds2;
    use crate::math::polygon_2d::has_consecutive_duplicates;
    use crate::tree::{Axis, FaceId, MaterialConfig, Split};

    fn box_scene() -> (Scene, AssemblyId) {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        (s, id)
    }

    #[test]
    fn closed_box_projects_six_clean_faces() {
        let (s, _) = box_scene();
        let panels = project(&s, &KernelConfig::default()).unwrap();
        assert_eq!(panels.len(), 6);
        for p in &panels {
            assert!(p.outline.len() >= 4);
            assert!(is_rectilinear(&p.outline));
            assert!(!has_consecutive_duplicates(&p.outline, 1e-9));
            assert!(p.holes.is_empty());
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let (mut s, id) = box_scene();
        let root = s.assembly(id).unwrap().root_void;
        s.add_subdivision(
            root,
            vec![
                Split {
                    axis: Axis::X,
                    positions: vec![70.0, 130.0],
                },
                Split {
                    axis: Axis::Z,
                    positions: vec![50.0],
                },
            ],
        )
        .unwrap();
        let cfg = KernelConfig::default();
        assert_eq!(project(&s, &cfg).unwrap(), project(&s, &cfg).unwrap());
    }

    #[test]
    fn extended_open_edge_is_straight() {
        let (mut s, id) = box_scene();
        s.toggle_face(id, FaceId::Top).unwrap();
        let front = PanelId::Face { assembly: id, face: FaceId::Front };
        s.edits_mut(front).extensions.insert(EdgeSide::Top, 12.0);
        let panels = project(&s, &KernelConfig::default()).unwrap();
        let p = panels.iter().find(|p| p.id == front).unwrap();
        assert_eq!(p.edge(EdgeSide::Top).status, EdgeStatus::Unlocked);
        let b = Bounds2::of(&p.outline).unwrap();
        assert!((b.max_y - 87.0).abs() < 1e-6);
    }
}
