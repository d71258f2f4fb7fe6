use super::{GEOMETRY_CONFLICTING_EXTENSIONS, GEOMETRY_CONSISTENCY, GEOMETRY_OVERLAP};
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::math::polygon_2d::{has_consecutive_duplicates, is_simple, signed_area};
use crate::math::TOLERANCE;
use crate::operations::boolean::{classify_polygon, PolygonClassification};
use crate::operations::collision::{conflicting_extensions as find_conflicts, detect_overlaps};
use crate::validation::Violation;

/// Outline winding, simplicity, hole placement and panel ownership.
pub fn consistency(snap: &Snapshot, _config: &KernelConfig) -> Vec<Violation> {
    let rule = GEOMETRY_CONSISTENCY;
    let mut out = Vec::new();
    for p in &snap.panels {
        let n = p.outline.len();
        if n < 4 {
            out.push(Violation::error(rule, format!("outline has only {n} points")).on(p.id));
            continue;
        }
        if signed_area(&p.outline) <= 0.0 {
            out.push(Violation::error(rule, "outline is not counter-clockwise").on(p.id));
        }
        if has_consecutive_duplicates(&p.outline, TOLERANCE) {
            out.push(Violation::error(rule, "outline repeats a point").on(p.id));
        }
        if !is_simple(&p.outline) {
            out.push(Violation::error(rule, "outline intersects itself").on(p.id));
        }
        for hole in &p.holes {
            if signed_area(&hole.points) >= 0.0 {
                out.push(Violation::error(rule, format!("hole {:?} is not clockwise", hole.id)).on(p.id));
            }
            if classify_polygon(&hole.points, &p.outline) != PolygonClassification::Interior {
                out.push(Violation::error(rule, format!("hole {:?} leaves the outline", hole.id)).on(p.id));
            }
        }
        if snap.scene.assembly(p.owner).is_err() || snap.owner(&p.id) != Some(p.owner) {
            out.push(Violation::error(rule, "panel owner is unknown").on(p.id));
        }
    }
    out
}

/// Interpenetration deeper than a joint.
pub fn overlap(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    detect_overlaps(&snap.panels, config.epsilon)
        .violations
        .into_iter()
        .map(|o| {
            Violation::error(
                GEOMETRY_OVERLAP,
                format!("{:?} and {:?} interpenetrate", o.kind_a, o.kind_b),
            )
            .on(o.a)
            .with(o.b)
            .measured(o.depth, o.tolerance)
        })
        .collect()
}

/// Adjacent faces extended into the same corner.
pub fn conflicting_extensions(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    find_conflicts(&snap.panels, config.epsilon)
        .into_iter()
        .map(|c| {
            Violation::warning(
                GEOMETRY_CONFLICTING_EXTENSIONS,
                format!("both panels extend towards {:?}", c.toward),
            )
            .on(c.a)
            .with(c.b)
            .measured(c.extension_a.min(c.extension_b), config.epsilon)
        })
        .collect()
}
