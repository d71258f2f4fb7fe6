//! Corner detection and tangent-arc fillets.

mod apply;
mod detect;
mod radius;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use apply::{apply_fillet_to_corner, corner_max_radius, fillet_corner};
pub use detect::{detect_corners, Corner};
pub use radius::calculate_max_fillet_radius;

use crate::config::KernelConfig;
use crate::geometry::panel::Panel;
use crate::math::Point2;
use crate::operations::safe_space::{reserved_regions, ReservedReason};
use crate::tree::{ContourRef, CornerId, PanelCorner, PanelEdits};

/// Outcome of filleting one panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilletReport {
    pub requested: usize,
    pub applied: usize,
    /// Requests on missing or ineligible corners.
    pub skipped: usize,
    /// Requests reduced to the corner's maximum radius.
    pub clamped: usize,
}

/// Joint and slot margins of a panel, where corners may not be rounded.
#[must_use]
pub fn forbidden_areas(panel: &Panel) -> Vec<Vec<Point2>> {
    reserved_regions(panel)
        .into_iter()
        .filter(|r| !matches!(r.reason, ReservedReason::Cutout(_)))
        .map(|r| r.points)
        .collect()
}

/// Corners of a panel as projected, before any fillet is applied.
#[must_use]
pub fn panel_corners(panel: &Panel, config: &KernelConfig) -> Vec<Corner> {
    let holes: Vec<Vec<Point2>> = panel.holes.iter().map(|h| h.points.clone()).collect();
    detect_corners(
        &panel.outline,
        &holes,
        &forbidden_areas(panel),
        panel.thickness,
        config,
    )
}

/// Detected corner standing for a fixed panel corner.
#[must_use]
pub fn fixed_corner(panel: &Panel, corner: PanelCorner) -> Option<&Corner> {
    panel.corners.iter().find(|c| c.fixed == Some(corner))
}

/// Outline vertex closest to the `corner` of the outline's bounding box.
#[must_use]
pub fn fixed_corner_index(outline: &[Point2], corner: PanelCorner) -> Option<usize> {
    let b = crate::math::bounds::Bounds2::of(outline)?;
    let (sx, sy) = corner.signs();
    let target = Point2::new(
        if sx < 0.0 { b.min_x } else { b.max_x },
        if sy < 0.0 { b.min_y } else { b.max_y },
    );
    outline
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - target)
                .norm()
                .total_cmp(&(*b - target).norm())
        })
        .map(|(i, _)| i)
}

/// Applies the fillets stored in `edits` to a freshly projected panel.
///
/// Corner ids refer to the unfilleted contours. Vertices are replaced from
/// the highest index down so earlier ids stay valid. Requests on missing or
/// ineligible corners are skipped.
pub fn apply_panel_fillets(panel: &mut Panel, edits: &PanelEdits, config: &KernelConfig) -> FilletReport {
    let mut report = FilletReport::default();
    panel.corners = panel_corners(panel, config);
    for fixed in PanelCorner::ALL {
        let Some(index) = fixed_corner_index(&panel.outline, fixed) else {
            continue;
        };
        let id = CornerId {
            contour: ContourRef::Outline,
            index,
        };
        if let Some(c) = panel.corners.iter_mut().find(|c| c.id == id) {
            c.fixed = Some(fixed);
        }
    }
    let lookup: BTreeMap<CornerId, Corner> =
        panel.corners.iter().map(|c| (c.id, c.clone())).collect();

    let mut requests: BTreeMap<ContourRef, BTreeMap<usize, f64>> = BTreeMap::new();
    for (&corner, &r) in &edits.corner_fillets {
        report.requested += 1;
        match fixed_corner_index(&panel.outline, corner) {
            Some(index) => {
                requests.entry(ContourRef::Outline).or_default().insert(index, r);
            }
            None => report.skipped += 1,
        }
    }
    for (&id, &r) in &edits.all_corner_fillets {
        report.requested += 1;
        requests.entry(id.contour).or_default().insert(id.index, r);
    }

    for (contour, by_index) in requests {
        for (&index, &radius) in by_index.iter().rev() {
            let Some(corner) = lookup.get(&CornerId { contour, index }).filter(|c| c.eligible) else {
                debug!(panel = %panel.id, ?contour, index, "fillet skipped on ineligible corner");
                report.skipped += 1;
                continue;
            };
            let points = match contour {
                ContourRef::Outline => &mut panel.outline,
                ContourRef::Hole(h) => match panel.holes.get_mut(h) {
                    Some(hole) => &mut hole.points,
                    None => {
                        report.skipped += 1;
                        continue;
                    }
                },
            };
            match fillet_corner(points, index, radius, config.fillet_segments, config) {
                Ok((filleted, applied)) => {
                    *points = filleted;
                    if applied < radius {
                        report.clamped += 1;
                    }
                    panel.fillets.push((corner.position, applied));
                    report.applied += 1;
                }
                Err(err) => {
                    warn!(panel = %panel.id, index, %err, "fillet failed");
                    report.skipped += 1;
                }
            }
        }
    }
    if report.applied > 0 {
        panel.has_curves = true;
    }
    report
}
