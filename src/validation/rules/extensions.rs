use super::{
    EXTENSIONS_CORNER_OWNERSHIP, EXTENSIONS_ELIGIBILITY, EXTENSIONS_FAR_EDGE_OPEN, EXTENSIONS_FULL_WIDTH,
    EXTENSIONS_LONG_FINGERS,
};
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::geometry::panel::{EdgeInfo, EdgeStatus, Panel, PanelKind};
use crate::math::bounds::Aabb;
use crate::math::Point3;
use crate::operations::collision::side_facing;
use crate::operations::projection::{base_level, edge_rect};
use crate::tree::{EdgeSide, FaceId};
use crate::validation::Violation;

fn half_across(panel: &Panel, side: EdgeSide) -> f64 {
    if side.is_horizontal() {
        panel.half_height()
    } else {
        panel.half_width()
    }
}

/// Base level of a neighbouring edge, ignoring feet which are cut back by reliefs.
fn neighbour_level(panel: &Panel, side: EdgeSide) -> f64 {
    let edge = panel.edge(side);
    let half = half_across(panel, side);
    if edge.feet {
        half
    } else {
        base_level(edge, half, panel.thickness)
    }
}

/// Along range `[lo, hi]` an extension of `side` should span.
fn extension_span(panel: &Panel, side: EdgeSide) -> (f64, f64) {
    let [a, b] = side.neighbours();
    (-neighbour_level(panel, a), neighbour_level(panel, b))
}

/// Outline vertices as `(along, across)` in the frame of `side`.
fn edge_coords(panel: &Panel, side: EdgeSide) -> impl Iterator<Item = (f64, f64)> + '_ {
    panel.outline.iter().map(move |p| match side {
        EdgeSide::Top => (p.x, p.y),
        EdgeSide::Bottom => (p.x, -p.y),
        EdgeSide::Right => (p.y, p.x),
        EdgeSide::Left => (p.y, -p.x),
    })
}

fn max_fillet(panel: &Panel) -> f64 {
    panel.fillets.iter().map(|(_, r)| *r).fold(0.0, f64::max)
}

/// Extended edges whose cap can be measured: not feet, not reshaped by a path.
fn plain_extensions<'a>(
    snap: &'a Snapshot,
    panel: &'a Panel,
    epsilon: f64,
) -> impl Iterator<Item = &'a EdgeInfo> + 'a {
    let edits = snap.scene.edits(&panel.id);
    panel.edges.iter().filter(move |e| {
        e.extension > epsilon && !e.feet && !edits.is_some_and(|ed| ed.edge_paths.contains_key(&e.side))
    })
}

/// Extensions only go where the joint allows them.
pub fn eligibility(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = EXTENSIONS_ELIGIBILITY;
    let eps = config.epsilon;
    let mut out = Vec::new();
    for p in &snap.panels {
        for e in &p.edges {
            let req = e.requested_extension;
            let bad = match e.status {
                EdgeStatus::Locked => req.abs() > eps,
                EdgeStatus::OutwardOnly => req < -eps,
                EdgeStatus::Unlocked => false,
            };
            if bad {
                out.push(
                    Violation::error(rule, format!("{:?} edge is {:?}", e.side, e.status))
                        .on(p.id)
                        .measured(req, 0.0),
                );
            }
        }
    }
    out
}

/// The cap of an extension runs the whole width of the edge.
pub fn full_width(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = EXTENSIONS_FULL_WIDTH;
    let mut out = Vec::new();
    for p in &snap.panels {
        let tol = max_fillet(p) + 1e-6;
        for e in plain_extensions(snap, p, config.epsilon) {
            let cap = half_across(p, e.side) + e.extension;
            let (lo, hi) = extension_span(p, e.side);
            let (min, max) = edge_coords(p, e.side)
                .filter(|(_, across)| (across - cap).abs() < 1e-6)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), (along, _)| {
                    (mn.min(along), mx.max(along))
                });
            let covered = max - min;
            if min > lo + tol || max < hi - tol {
                out.push(
                    Violation::error(rule, format!("{:?} extension does not span its edge", e.side))
                        .on(p.id)
                        .measured(covered.max(0.0), hi - lo),
                );
            }
        }
    }
    out
}

/// No outline vertex sits between the body and the cap of an extension.
pub fn far_edge_open(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = EXTENSIONS_FAR_EDGE_OPEN;
    let mut out = Vec::new();
    for p in &snap.panels {
        let tol = max_fillet(p) + 1e-6;
        for e in plain_extensions(snap, p, config.epsilon) {
            let half = half_across(p, e.side);
            let (lo, hi) = extension_span(p, e.side);
            let blocked = edge_coords(p, e.side).find(|&(along, across)| {
                across > half + 1e-6
                    && across < half + e.extension - 1e-6
                    && along > lo + tol
                    && along < hi - tol
            });
            if let Some((_, across)) = blocked {
                out.push(
                    Violation::error(rule, format!("{:?} extension has geometry inside its span", e.side))
                        .on(p.id)
                        .measured(across - half, e.extension),
                );
            }
        }
    }
    out
}

/// World box of the strip an extension adds beyond the body.
fn extension_strip(panel: &Panel, side: EdgeSide) -> Option<Aabb> {
    let e = panel.edge(side);
    let half = half_across(panel, side);
    let (lo, hi) = extension_span(panel, side);
    let t = panel.thickness * 0.5;
    let corners: Vec<Point3> = edge_rect(side, lo, hi, half, half + e.extension)
        .iter()
        .flat_map(|q| [-t, t].map(|z| panel.to_world(q.x, q.y, z)))
        .collect();
    Aabb::of(&corners)
}

/// Where two faces extend into one corner, exactly one of them owns it.
pub fn corner_ownership(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = EXTENSIONS_CORNER_OWNERSHIP;
    let eps = config.epsilon;
    let faces: Vec<(&Panel, FaceId)> = snap
        .panels
        .iter()
        .filter_map(|p| match p.kind {
            PanelKind::Face(f) => Some((p, f)),
            PanelKind::Divider(_) => None,
        })
        .collect();
    let mut out = Vec::new();
    for (i, &(pa, fa)) in faces.iter().enumerate() {
        for &(pb, fb) in &faces[i + 1..] {
            if pa.owner != pb.owner || fa.axis() == fb.axis() {
                continue;
            }
            let (Some(ab), Some(ba)) = (side_facing(fa, fb), side_facing(fb, fa)) else {
                continue;
            };
            for toward in FaceId::ALL {
                if toward.axis() == fa.axis() || toward.axis() == fb.axis() {
                    continue;
                }
                let (Some(sa), Some(sb)) = (side_facing(fa, toward), side_facing(fb, toward)) else {
                    continue;
                };
                if pa.edge(sa).extension <= eps || pb.edge(sb).extension <= eps {
                    continue;
                }
                let owners = [pa.edge(ab).status, pb.edge(ba).status]
                    .into_iter()
                    .filter(|s| *s != EdgeStatus::Locked)
                    .count();
                if owners != 1 {
                    #[allow(clippy::cast_precision_loss)]
                    out.push(
                        Violation::error(rule, format!("corner towards {toward:?} has {owners} owners"))
                            .on(pa.id)
                            .with(pb.id)
                            .measured(owners as f64, 1.0),
                    );
                    continue;
                }
                if let (Some(a), Some(b)) = (extension_strip(pa, sa), extension_strip(pb, sb)) {
                    if a.overlaps(&b, eps) {
                        out.push(
                            Violation::error(rule, format!("extensions towards {toward:?} overlap at the corner"))
                                .on(pa.id)
                                .with(pb.id),
                        );
                    }
                }
            }
        }
    }
    out
}

/// Extensions longer than a couple of finger pitches.
pub fn long_fingers(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = EXTENSIONS_LONG_FINGERS;
    let mut out = Vec::new();
    for p in &snap.panels {
        let Ok(assembly) = snap.scene.assembly(p.owner) else {
            continue;
        };
        let m = assembly.material;
        let limit = config.long_extension_factor * (m.finger_width + m.corner_clearance());
        let feet = assembly.feet.map_or(0.0, |f| f.height);
        for e in &p.edges {
            let user = if e.feet { e.extension - feet } else { e.extension };
            if user > limit {
                out.push(
                    Violation::warning(rule, format!("{:?} extension may need its own joint", e.side))
                        .on(p.id)
                        .measured(user, limit),
                );
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::{MaterialConfig, PanelId, Scene};

    fn open_top(ext: f64) -> Snapshot {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        s.toggle_face(id, FaceId::Top).unwrap();
        s.edits_mut(PanelId::Face { assembly: id, face: FaceId::Front })
            .extensions
            .insert(EdgeSide::Top, ext);
        Snapshot::build(&s, &KernelConfig::default()).unwrap()
    }

    #[test]
    fn plain_extension_passes_cap_checks() {
        let cfg = KernelConfig::default();
        let snap = open_top(12.0);
        assert!(eligibility(&snap, &cfg).is_empty());
        assert!(full_width(&snap, &cfg).is_empty());
        assert!(far_edge_open(&snap, &cfg).is_empty());
        assert!(long_fingers(&snap, &cfg).is_empty());
    }

    #[test]
    fn long_extension_warns() {
        let cfg = KernelConfig::default();
        // Limit is 2 * (10 + 15) = 50 mm.
        let v = long_fingers(&open_top(60.0), &cfg);
        assert_eq!(v.len(), 1);
        assert!((v[0].value.unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn locked_extension_is_ineligible() {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        s.edits_mut(PanelId::Face { assembly: id, face: FaceId::Front })
            .extensions
            .insert(EdgeSide::Left, 5.0);
        let cfg = KernelConfig::default();
        let v = eligibility(&Snapshot::build(&s, &cfg).unwrap(), &cfg);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn female_and_male_corner_has_one_owner() {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        s.toggle_face(id, FaceId::Top).unwrap();
        for face in [FaceId::Front, FaceId::Left] {
            s.edits_mut(PanelId::Face { assembly: id, face })
                .extensions
                .insert(EdgeSide::Top, 10.0);
        }
        let cfg = KernelConfig::default();
        let snap = Snapshot::build(&s, &cfg).unwrap();
        assert!(corner_ownership(&snap, &cfg).is_empty());
    }
}
