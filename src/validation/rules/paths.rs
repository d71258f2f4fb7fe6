use super::PATHS_VALIDITY;
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::geometry::panel::Panel;
use crate::math::polygon_2d::has_consecutive_duplicates;
use crate::math::TOLERANCE;
use crate::operations::projection::is_rectilinear;
use crate::tree::PanelEdits;
use crate::validation::Violation;

/// `true` when a custom path legitimately bends the outline off-axis.
fn has_free_form_path(panel: &Panel, edits: Option<&PanelEdits>) -> bool {
    edits.is_some_and(|e| {
        e.edge_paths
            .iter()
            .any(|(side, path)| panel.edge(*side).is_straight() && !path.is_axis_aligned(1e-6))
    })
}

/// Outlines stay axis aligned unless shaped on purpose, slots always do,
/// and stored edge paths are well-formed.
pub fn validity(snap: &Snapshot, _config: &KernelConfig) -> Vec<Violation> {
    let rule = PATHS_VALIDITY;
    let mut out = Vec::new();
    for p in &snap.panels {
        let edits = snap.scene.edits(&p.id);
        let shaped = !p.fillets.is_empty() || has_free_form_path(p, edits);
        if !shaped && !is_rectilinear(&p.outline) {
            out.push(Violation::error(rule, "outline has a diagonal segment").on(p.id));
        }
        for hole in p.holes.iter().filter(|h| h.is_slot()) {
            if !is_rectilinear(&hole.points) {
                out.push(Violation::error(rule, format!("slot {:?} is not axis aligned", hole.id)).on(p.id));
            }
            if has_consecutive_duplicates(&hole.points, TOLERANCE) {
                out.push(Violation::error(rule, format!("slot {:?} repeats a point", hole.id)).on(p.id));
            }
        }
        let Some(edits) = edits else {
            continue;
        };
        for (side, path) in &edits.edge_paths {
            if let Err(err) = path.validate() {
                out.push(Violation::error(rule, format!("{side:?} edge path: {err}")).on(p.id));
            } else if !p.edge(*side).is_straight() {
                out.push(Violation::warning(rule, format!("{side:?} edge path ignored on a jointed edge")).on(p.id));
            }
        }
    }
    out
}
