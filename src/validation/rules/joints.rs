use super::{JOINTS_FINGER_MATCH, JOINTS_GENDER};
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::geometry::panel::{EdgeInfo, HoleId, Panel};
use crate::operations::joint::Gender;
use crate::operations::projection::base_level;
use crate::tree::{EdgeSide, PanelId};
use crate::validation::Violation;

fn slots_for(mate: &Panel, divider: PanelId) -> usize {
    mate.holes
        .iter()
        .filter(|h| matches!(h.id, HoleId::Slot(_)) && h.mate == Some(divider))
        .count()
}

fn edge_towards(panel: &Panel, other: PanelId) -> Option<&EdgeInfo> {
    panel.edges.iter().find(|e| e.mate == Some(other))
}

/// Finger intervals of an edge along the dominant world axis, ascending.
fn world_fingers(panel: &Panel, edge: &EdgeInfo) -> Vec<(f64, f64)> {
    let Some(pattern) = &edge.pattern else {
        return Vec::new();
    };
    let half = if edge.side.is_horizontal() {
        panel.half_height()
    } else {
        panel.half_width()
    };
    let at = |t: f64| {
        if edge.side.is_horizontal() {
            panel.to_world(t, half, 0.0)
        } else {
            panel.to_world(half, t, 0.0)
        }
    };
    let dir = at(1.0) - at(0.0);
    let axis = dir.iamax();
    let mut out: Vec<(f64, f64)> = pattern
        .fingers
        .iter()
        .map(|&(a, b)| {
            let (wa, wb) = (at(a)[axis], at(b)[axis]);
            (wa.min(wb), wa.max(wb))
        })
        .collect();
    out.sort_by(|x, y| x.0.total_cmp(&y.0));
    out
}

/// Span `[from, to]` the outline of `edge` actually covers, along the edge.
fn emitted_span(panel: &Panel, edge: &EdgeInfo) -> (f64, f64) {
    let mt = panel.thickness;
    let level = |side: EdgeSide| {
        let half = if side.is_horizontal() {
            panel.half_height()
        } else {
            panel.half_width()
        };
        base_level(panel.edge(side), half, mt)
    };
    if edge.side.is_horizontal() {
        (-level(EdgeSide::Left), level(EdgeSide::Right))
    } else {
        (-level(EdgeSide::Bottom), level(EdgeSide::Top))
    }
}

/// Fingers of `edge` that stick out past the panel's own outline.
fn cut_off_fingers(panel: &Panel, edge: &EdgeInfo) -> usize {
    let Some(pattern) = &edge.pattern else {
        return 0;
    };
    let (from, to) = emitted_span(panel, edge);
    pattern
        .fingers
        .iter()
        .filter(|&&(a, b)| a < from - 1e-6 || b > to + 1e-6)
        .count()
}

/// Every joint pairs a male edge with a female edge or a slot.
pub fn gender(snap: &Snapshot, _config: &KernelConfig) -> Vec<Violation> {
    let rule = JOINTS_GENDER;
    let mut out = Vec::new();
    for p in &snap.panels {
        for edge in &p.edges {
            let Some(mate_id) = edge.mate else {
                continue;
            };
            let Some(mate) = snap.panel(&mate_id) else {
                out.push(Violation::error(rule, format!("{:?} edge mates a missing panel", edge.side)).on(p.id));
                continue;
            };
            if p.is_divider() {
                if edge.gender != Some(Gender::Male) {
                    out.push(Violation::error(rule, format!("divider {:?} edge is not male", edge.side)).on(p.id));
                }
                if slots_for(mate, p.id) == 0 {
                    out.push(Violation::error(rule, "mate has no slot for this divider").on(p.id).with(mate_id));
                }
                continue;
            }
            if p.id > mate_id {
                continue;
            }
            match edge_towards(mate, p.id) {
                None => out.push(Violation::error(rule, "mate does not joint back").on(p.id).with(mate_id)),
                Some(back) => {
                    if edge.gender.is_none() || back.gender != edge.gender.map(Gender::opposite) {
                        out.push(
                            Violation::error(
                                rule,
                                format!("{:?} meets {:?}", edge.gender, back.gender),
                            )
                            .on(p.id)
                            .with(mate_id),
                        );
                    }
                }
            }
        }
    }
    out
}

/// Fingers of mating edges line up.
pub fn finger_match(snap: &Snapshot, _config: &KernelConfig) -> Vec<Violation> {
    let rule = JOINTS_FINGER_MATCH;
    let mut out = Vec::new();
    for p in &snap.panels {
        for edge in &p.edges {
            let (Some(mate_id), Some(pattern)) = (edge.mate, &edge.pattern) else {
                continue;
            };
            let Some(mate) = snap.panel(&mate_id) else {
                continue;
            };
            let lost = cut_off_fingers(p, edge);
            if lost > 0 {
                #[allow(clippy::cast_precision_loss)]
                out.push(
                    Violation::error(rule, format!("{lost} finger(s) of the {:?} edge fall outside the outline", edge.side))
                        .on(p.id)
                        .with(mate_id)
                        .measured(lost as f64, 0.0),
                );
            }
            if p.is_divider() {
                let fingers = pattern.fingers.len();
                let slots = slots_for(mate, p.id);
                if fingers != slots {
                    #[allow(clippy::cast_precision_loss)]
                    out.push(
                        Violation::error(rule, format!("{fingers} tab(s) but {slots} slot(s)"))
                            .on(p.id)
                            .with(mate_id)
                            .measured(slots as f64, fingers as f64),
                    );
                }
                continue;
            }
            if p.id > mate_id {
                continue;
            }
            let Some(back) = edge_towards(mate, p.id) else {
                continue;
            };
            let (mine, theirs) = (world_fingers(p, edge), world_fingers(mate, back));
            let matched = mine.len() == theirs.len()
                && mine
                    .iter()
                    .zip(&theirs)
                    .all(|(a, b)| (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6);
            if !matched {
                out.push(
                    Violation::error(rule, format!("{:?} fingers do not line up with the mate", edge.side))
                        .on(p.id)
                        .with(mate_id),
                );
            }
        }
    }
    out
}
