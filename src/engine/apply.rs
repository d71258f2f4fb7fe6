//! Applying one action to a tree.
//!
//! Every function here mutates a scratch copy of the target tree; the engine
//! only keeps the copy when the whole action succeeded.

use tracing::debug;

use super::action::{Action, AllCornerFilletEdit, CornerFilletEdit, EdgeOperationMode, ExtensionEdit};
use super::Snapshot;
use crate::error::{invalid, ActionError, GeometryError, Result, TreeError};
use crate::geometry::edge_path::EdgePath;
use crate::geometry::panel::{EdgeStatus, Panel};
use crate::math::polygon_2d::ensure_ccw;
use crate::math::Point2;
use crate::operations::boolean::{
    classify_polygon, difference_polygons, extract_affected_edges, merge_edge_paths, union_polygons,
    PolygonClassification,
};
use crate::operations::fillet::fixed_corner;
use crate::operations::projection::min_extension;
use crate::tree::{check_user_polygon, Cutout, CutoutShape, EdgeSide, PanelId, Scene, Split};

/// Applies `action` to `scene`.
///
/// `snapshot` is the projection of `scene` before the action and must be
/// given when [`Action::needs_snapshot`] is true.
///
/// # Errors
///
/// Returns the reason the action was rejected; `scene` may then hold a
/// partial edit and must be discarded.
pub(crate) fn apply(scene: &mut Scene, action: &Action, snapshot: Option<&Snapshot>) -> Result<()> {
    match action {
        Action::CreateAssembly {
            width,
            height,
            depth,
            material,
        } => scene.create_assembly(*width, *height, *depth, *material).map(|_| ()),
        Action::ResizeAssembly {
            assembly,
            width,
            height,
            depth,
        } => scene.resize_assembly(*assembly, *width, *height, *depth),
        Action::ToggleFace { assembly, face } => scene.toggle_face(*assembly, *face),
        Action::AddSubdivision { void, axis, positions } => scene
            .add_subdivision(
                *void,
                vec![Split {
                    axis: *axis,
                    positions: positions.clone(),
                }],
            )
            .map(|_| ()),
        Action::AddSubdivisions { void, splits } => scene.add_subdivision(*void, splits.clone()).map(|_| ()),
        Action::RemoveSubdivision { void } => scene.remove_subdivision(*void),
        Action::CreateSubAssembly { void, clearance } => scene.create_sub_assembly(*void, *clearance).map(|_| ()),
        Action::RemoveSubAssembly { assembly } => scene.remove_sub_assembly(*assembly),
        Action::SetMaterial { assembly, material } => scene.set_material(*assembly, *material),
        Action::SetAxis { assembly, axis } => scene.set_axis(*assembly, *axis),
        Action::SetLid { assembly, side, config } => scene.set_lid(*assembly, *side, *config),
        Action::SetFeet { assembly, feet } => scene.set_feet(*assembly, *feet),
        Action::SetExtension { panel, side, value } => set_extension(
            scene,
            snapshot,
            &ExtensionEdit {
                panel: *panel,
                side: *side,
                value: *value,
            },
        ),
        Action::SetExtensions { edits } => {
            if edits.is_empty() {
                return Err(invalid("no extensions given"));
            }
            edits.iter().try_for_each(|e| set_extension(scene, snapshot, e))
        }
        Action::SetCornerFillet { panel, corner, radius } => set_corner_fillet(
            scene,
            require(snapshot)?,
            &CornerFilletEdit {
                panel: *panel,
                corner: *corner,
                radius: *radius,
            },
        ),
        Action::SetCornerFillets { edits } => {
            let snap = require(snapshot)?;
            any_applied(edits, |e| set_corner_fillet(scene, snap, e))
        }
        Action::SetAllCornerFillet { panel, corner, radius } => set_all_corner_fillet(
            scene,
            require(snapshot)?,
            &AllCornerFilletEdit {
                panel: *panel,
                corner: *corner,
                radius: *radius,
            },
        ),
        Action::SetAllCornerFillets { edits } => {
            let snap = require(snapshot)?;
            any_applied(edits, |e| set_all_corner_fillet(scene, snap, e))
        }
        Action::AddCutout { panel, cutout } => add_cutout(scene, *panel, cutout.clone()),
        Action::UpdateCutout { panel, cutout } => {
            ensure_panel(scene, panel)?;
            cutout.shape.to_polygon()?;
            let edits = scene.edits_mut(*panel);
            let slot = edits
                .cutouts
                .iter_mut()
                .find(|c| c.id == cutout.id)
                .ok_or_else(|| ActionError::CutoutNotFound(cutout.id.clone()))?;
            *slot = cutout.clone();
            Ok(())
        }
        Action::RemoveCutout { panel, id } => {
            ensure_panel(scene, panel)?;
            let edits = scene.edits_mut(*panel);
            let before = edits.cutouts.len();
            edits.cutouts.retain(|c| &c.id != id);
            if edits.cutouts.len() == before {
                return Err(ActionError::CutoutNotFound(id.clone()).into());
            }
            Ok(())
        }
        Action::SetEdgePath { panel, side, path } => {
            ensure_panel(scene, panel)?;
            path.validate()?;
            scene.edits_mut(*panel).edge_paths.insert(*side, path.clone());
            Ok(())
        }
        Action::ClearEdgePath { panel, side } => {
            ensure_panel(scene, panel)?;
            if scene.edits_mut(*panel).edge_paths.remove(side).is_none() {
                return Err(invalid(format!("no edge path on {side:?}")));
            }
            Ok(())
        }
        Action::ApplyEdgeOperation { panel, polygon, mode } => {
            apply_edge_operation(scene, require(snapshot)?, *panel, polygon, *mode)
        }
    }
}

fn require(snapshot: Option<&Snapshot>) -> Result<&Snapshot> {
    snapshot.ok_or_else(|| TreeError::Invalid("action needs a projected snapshot".into()).into())
}

fn ensure_panel(scene: &Scene, panel: &PanelId) -> Result<()> {
    if scene.panel_exists(panel) {
        Ok(())
    } else {
        Err(TreeError::PanelNotFound(panel.to_string()).into())
    }
}

fn projected<'a>(snapshot: &'a Snapshot, panel: &PanelId) -> Result<&'a Panel> {
    snapshot
        .panel(panel)
        .ok_or_else(|| TreeError::PanelNotFound(panel.to_string()).into())
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::ParameterOutOfRange {
            parameter: name,
            value,
            min: f64::MIN,
            max: f64::MAX,
        }
        .into())
    }
}

/// Runs `f` on every entry, keeping the successes; fails only when none succeeded.
fn any_applied<T>(entries: &[T], mut f: impl FnMut(&T) -> Result<()>) -> Result<()> {
    let mut applied = 0usize;
    for (i, entry) in entries.iter().enumerate() {
        match f(entry) {
            Ok(()) => applied += 1,
            Err(err) => debug!(entry = i, %err, "batch entry skipped"),
        }
    }
    if applied == 0 {
        return Err(invalid("no batch entry could be applied"));
    }
    Ok(())
}

/// Nominal size and thickness of a panel, whether or not it is cut.
fn panel_size(scene: &Scene, snapshot: Option<&Snapshot>, id: &PanelId) -> Result<(f64, f64, f64)> {
    if let Some(p) = snapshot.and_then(|s| s.panel(id)) {
        return Ok((p.width, p.height, p.thickness));
    }
    match id {
        PanelId::Face { assembly, face } => {
            let a = scene.assembly(*assembly)?;
            let (w, h) = a.face_dimensions(*face);
            Ok((w, h, a.material.thickness))
        }
        PanelId::Divider { .. } => Err(TreeError::PanelNotFound(id.to_string()).into()),
    }
}

fn set_extension(scene: &mut Scene, snapshot: Option<&Snapshot>, e: &ExtensionEdit) -> Result<()> {
    ensure_panel(scene, &e.panel)?;
    finite("extension", e.value)?;
    let (width, height, mt) = panel_size(scene, snapshot, &e.panel)?;
    let half = 0.5 * if e.side.is_horizontal() { height } else { width };
    let floor = min_extension(half, mt);
    if e.value < 0.0 && e.value <= floor {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "extension",
            value: e.value,
            min: floor,
            max: f64::MAX,
        }
        .into());
    }
    let edits = scene.edits_mut(e.panel);
    if e.value == 0.0 {
        edits.extensions.remove(&e.side);
    } else {
        edits.extensions.insert(e.side, e.value);
    }
    Ok(())
}

fn set_corner_fillet(scene: &mut Scene, snapshot: &Snapshot, e: &CornerFilletEdit) -> Result<()> {
    ensure_panel(scene, &e.panel)?;
    finite("radius", e.radius)?;
    if e.radius <= 0.0 {
        scene.edits_mut(e.panel).corner_fillets.remove(&e.corner);
        return Ok(());
    }
    let panel = projected(snapshot, &e.panel)?;
    let corner = fixed_corner(panel, e.corner)
        .ok_or_else(|| invalid(format!("{:?} is not a corner of {}", e.corner, e.panel)))?;
    if !corner.eligible {
        return Err(GeometryError::IneligibleCorner { index: corner.id.index }.into());
    }
    scene.edits_mut(e.panel).corner_fillets.insert(e.corner, e.radius);
    Ok(())
}

fn set_all_corner_fillet(scene: &mut Scene, snapshot: &Snapshot, e: &AllCornerFilletEdit) -> Result<()> {
    ensure_panel(scene, &e.panel)?;
    finite("radius", e.radius)?;
    if e.radius <= 0.0 {
        scene.edits_mut(e.panel).all_corner_fillets.remove(&e.corner);
        return Ok(());
    }
    let panel = projected(snapshot, &e.panel)?;
    let corner = panel
        .corners
        .iter()
        .find(|c| c.id == e.corner)
        .ok_or_else(|| invalid(format!("{:?} is not a corner of {}", e.corner, e.panel)))?;
    if !corner.eligible {
        return Err(GeometryError::IneligibleCorner { index: e.corner.index }.into());
    }
    scene.edits_mut(e.panel).all_corner_fillets.insert(e.corner, e.radius);
    Ok(())
}

fn add_cutout(scene: &mut Scene, panel: PanelId, cutout: Cutout) -> Result<()> {
    ensure_panel(scene, &panel)?;
    if cutout.id.is_empty() {
        return Err(invalid("cutout id must not be empty"));
    }
    cutout.shape.to_polygon()?;
    let edits = scene.edits_mut(panel);
    if edits.cutout(&cutout.id).is_some() {
        return Err(ActionError::DuplicateCutout(cutout.id).into());
    }
    edits.cutouts.push(cutout);
    Ok(())
}

/// Turns a user polygon into a cutout or an edge path change.
fn apply_edge_operation(
    scene: &mut Scene,
    snapshot: &Snapshot,
    id: PanelId,
    polygon: &[Point2],
    mode: EdgeOperationMode,
) -> Result<()> {
    let panel = projected(snapshot, &id)?;
    check_user_polygon(polygon)?;
    match (classify_polygon(polygon, &panel.outline), mode) {
        (PolygonClassification::Exterior, _) | (PolygonClassification::Interior, EdgeOperationMode::Union) => {
            debug!(panel = %id, ?mode, "edge operation changes nothing");
            Ok(())
        }
        (PolygonClassification::Interior, EdgeOperationMode::Difference) => {
            let cutout_id = scene.edits(&id).map_or_else(|| "op-1".to_string(), |e| e.next_operation_id());
            add_cutout(
                scene,
                id,
                Cutout {
                    id: cutout_id,
                    shape: CutoutShape::Polygon {
                        points: ensure_ccw(polygon),
                    },
                },
            )
        }
        (PolygonClassification::Boundary, _) => {
            let body = panel.body_rect();
            let result = match mode {
                EdgeOperationMode::Union => union_polygons(&body, polygon),
                EdgeOperationMode::Difference => difference_polygons(&body, polygon),
            }
            .ok_or_else(|| GeometryError::Degenerate("edge operation result".into()))?;
            let affected = extract_affected_edges(&result, panel.width, panel.height);
            if let Some(side) = affected
                .keys()
                .find(|s| panel.edge(**s).status != EdgeStatus::Unlocked)
            {
                return Err(ActionError::EdgeNotEditable(format!("{id} {side:?}")).into());
            }
            merge_paths(scene, id, affected);
            Ok(())
        }
    }
}

fn merge_paths(scene: &mut Scene, id: PanelId, affected: impl IntoIterator<Item = (EdgeSide, EdgePath)>) {
    let edits = scene.edits_mut(id);
    for (side, path) in affected {
        let merged = match edits.edge_paths.get(&side) {
            Some(existing) => merge_edge_paths(existing, &path),
            None => path,
        };
        edits.edge_paths.insert(side, merged);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::math::polygon_2d::centered_rectangle;
    use crate::tree::{AssemblyId, FaceId, MaterialConfig};

    fn scene() -> (Scene, AssemblyId) {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        (s, id)
    }

    fn front(id: AssemblyId) -> PanelId {
        PanelId::Face { assembly: id, face: FaceId::Front }
    }

    #[test]
    fn extension_set_replaces() {
        let (mut s, id) = scene();
        for value in [10.0, 20.0] {
            apply(
                &mut s,
                &Action::SetExtension {
                    panel: front(id),
                    side: EdgeSide::Bottom,
                    value,
                },
                None,
            )
            .unwrap();
        }
        assert!((s.edits(&front(id)).unwrap().extension(EdgeSide::Bottom) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn extension_cannot_collapse_the_body() {
        let (mut s, id) = scene();
        for face in [FaceId::Left, FaceId::Right, FaceId::Top] {
            s.toggle_face(id, face).unwrap();
        }
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        let set = |side, value| Action::SetExtension {
            panel: front(id),
            side,
            value,
        };
        // Half of the 200 mm front is 100; the edge may move in to 2 MT from the centre.
        assert!(apply(&mut s, &set(EdgeSide::Left, -110.0), Some(&snap)).is_err());
        assert!(apply(&mut s, &set(EdgeSide::Left, -94.0), Some(&snap)).is_err());
        apply(&mut s, &set(EdgeSide::Left, -90.0), Some(&snap)).unwrap();
        apply(&mut s, &set(EdgeSide::Right, -90.0), Some(&snap)).unwrap();
        // Open faces are not projected; their size comes from the assembly.
        let top = PanelId::Face { assembly: id, face: FaceId::Top };
        let bad = Action::SetExtension {
            panel: top,
            side: EdgeSide::Left,
            value: -200.0,
        };
        assert!(apply(&mut s, &bad, None).is_err());
    }

    #[test]
    fn interior_difference_becomes_cutout() {
        let (mut s, id) = scene();
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        let action = Action::ApplyEdgeOperation {
            panel: front(id),
            polygon: centered_rectangle(0.0, 0.0, 20.0, 10.0),
            mode: EdgeOperationMode::Difference,
        };
        apply(&mut s, &action, Some(&snap)).unwrap();
        let edits = s.edits(&front(id)).unwrap();
        assert_eq!(edits.cutouts.len(), 1);
        assert_eq!(edits.cutouts[0].id, "op-1");
    }

    #[test]
    fn boundary_operation_on_jointed_edge_is_rejected() {
        let (mut s, id) = scene();
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        let action = Action::ApplyEdgeOperation {
            panel: front(id),
            polygon: centered_rectangle(0.0, 75.0, 20.0, 10.0),
            mode: EdgeOperationMode::Difference,
        };
        assert!(apply(&mut s, &action, Some(&snap)).is_err());
    }

    #[test]
    fn boundary_notch_on_open_edge_becomes_path() {
        let (mut s, id) = scene();
        s.toggle_face(id, FaceId::Top).unwrap();
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        let action = Action::ApplyEdgeOperation {
            panel: front(id),
            polygon: centered_rectangle(0.0, 75.0, 20.0, 10.0),
            mode: EdgeOperationMode::Difference,
        };
        apply(&mut s, &action, Some(&snap)).unwrap();
        let path = &s.edits(&front(id)).unwrap().edge_paths[&EdgeSide::Top];
        assert!((path.offset_at(0.5) + 5.0).abs() < 1e-6);
    }

    #[test]
    fn fillet_needs_an_eligible_corner() {
        let (mut s, id) = scene();
        let snap = Snapshot::build(&s, &KernelConfig::default()).unwrap();
        // Every corner of a closed box sits in a joint margin.
        let action = Action::SetCornerFillet {
            panel: front(id),
            corner: crate::tree::PanelCorner::TopLeft,
            radius: 5.0,
        };
        assert!(apply(&mut s, &action, Some(&snap)).is_err());
        assert!(apply(&mut s, &action, None).is_err());
    }
}
