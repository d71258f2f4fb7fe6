//! 3D interpenetration checks between derived panels.

mod obb;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use obb::{penetration_depth, Obb};

use crate::geometry::panel::{Panel, PanelKind};
use crate::math::bounds::Aabb;
use crate::operations::projection::mate_face;
use crate::tree::{EdgeSide, FaceId, PanelId};

/// One measured overlap between two panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelOverlap {
    pub a: PanelId,
    pub b: PanelId,
    pub kind_a: PanelKind,
    pub kind_b: PanelKind,
    /// Minimum penetration depth in mm.
    pub depth: f64,
    /// Depth that is expected at a joint.
    pub tolerance: f64,
}

/// Result of an overlap sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapReport {
    pub panels: usize,
    pub pairs: usize,
    /// Pairs that reached the separating axis test.
    pub narrow_phase: usize,
    /// Overlaps deeper than their tolerance.
    pub violations: Vec<PanelOverlap>,
    /// Overlaps within tolerance (joints and corners).
    pub tolerated: Vec<PanelOverlap>,
}

/// Two dividers of one grid, split along different axes, interlock on purpose.
#[must_use]
pub fn is_cross_lap(a: &Panel, b: &Panel) -> bool {
    matches!(
        (a.id, b.id),
        (
            PanelId::Divider { void: va, axis: xa, .. },
            PanelId::Divider { void: vb, axis: xb, .. },
        ) if va == vb && xa != xb
    )
}

/// Finds every pair of panels whose volumes intersect.
///
/// Pairs whose world AABBs are apart by more than `epsilon` are skipped;
/// the rest go through the separating axis test. Cross-lap dividers are
/// exempt, and depths up to the material thickness plus `epsilon` are
/// tolerated.
#[instrument(skip_all, fields(panels = panels.len()))]
#[must_use]
pub fn detect_overlaps(panels: &[Panel], epsilon: f64) -> OverlapReport {
    let boxes: Vec<(Obb, Aabb)> = panels
        .iter()
        .map(|p| {
            let obb = Obb::from_panel(p);
            let aabb = obb.aabb();
            (obb, aabb)
        })
        .collect();
    let mut report = OverlapReport {
        panels: panels.len(),
        ..OverlapReport::default()
    };
    for i in 0..panels.len() {
        for j in i + 1..panels.len() {
            report.pairs += 1;
            let (a, b) = (&panels[i], &panels[j]);
            if is_cross_lap(a, b) || !boxes[i].1.overlaps(&boxes[j].1, epsilon) {
                continue;
            }
            report.narrow_phase += 1;
            let Some(depth) = penetration_depth(&boxes[i].0, &boxes[j].0) else {
                continue;
            };
            let overlap = PanelOverlap {
                a: a.id,
                b: b.id,
                kind_a: a.kind,
                kind_b: b.kind,
                depth,
                tolerance: a.thickness.max(b.thickness) + epsilon,
            };
            if depth > overlap.tolerance {
                report.violations.push(overlap);
            } else {
                report.tolerated.push(overlap);
            }
        }
    }
    debug!(
        pairs = report.pairs,
        narrow = report.narrow_phase,
        violations = report.violations.len(),
        "overlap sweep finished"
    );
    report
}

/// Two adjacent faces both extended towards the same third face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConflict {
    pub a: PanelId,
    pub b: PanelId,
    /// Face both extensions point at.
    pub toward: FaceId,
    pub extension_a: f64,
    pub extension_b: f64,
}

/// Side of a face panel that faces `other`.
#[must_use]
pub fn side_facing(face: FaceId, other: FaceId) -> Option<EdgeSide> {
    EdgeSide::ALL.into_iter().find(|s| mate_face(face, *s) == Some(other))
}

/// Pairs of adjacent face panels of one assembly whose extensions meet at a
/// shared corner.
#[must_use]
pub fn conflicting_extensions(panels: &[Panel], epsilon: f64) -> Vec<ExtensionConflict> {
    let faces: Vec<(&Panel, FaceId)> = panels
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
            for toward in FaceId::ALL {
                if toward.axis() == fa.axis() || toward.axis() == fb.axis() {
                    continue;
                }
                let (Some(sa), Some(sb)) = (side_facing(fa, toward), side_facing(fb, toward)) else {
                    continue;
                };
                let (ea, eb) = (pa.edge(sa).extension, pb.edge(sb).extension);
                if ea > epsilon && eb > epsilon {
                    out.push(ExtensionConflict {
                        a: pa.id,
                        b: pb.id,
                        toward,
                        extension_a: ea,
                        extension_b: eb,
                    });
                }
            }
        }
    }
    out
}
