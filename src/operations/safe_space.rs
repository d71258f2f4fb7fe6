use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::geometry::panel::{HoleId, Panel};
use crate::math::bounds::Bounds2;
use crate::math::polygon_2d::rectangle;
use crate::math::Point2;
use crate::operations::boolean::{subtract_all, union_all, Shape};
use crate::operations::projection::edge_rect;
use crate::tree::EdgeSide;

/// Why a region of a panel is off limits for user geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReservedReason {
    /// Margin strip along a jointed edge.
    Joint(EdgeSide),
    /// Margin ring around a slot.
    Slot(HoleId),
    /// Area taken by a user cutout.
    Cutout(String),
}

/// One reserved polygon with its reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservedRegion {
    pub reason: ReservedReason,
    pub points: Vec<Point2>,
}

/// The area of a panel where user geometry cannot weaken a joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeSpaceRegion {
    pub outline: Vec<Point2>,
    /// Union of all reserved areas.
    pub exclusions: Vec<Shape>,
    pub reserved: Vec<ReservedRegion>,
    /// `outline - exclusions`; empty when the margins cover the whole panel.
    pub result_paths: Vec<Shape>,
}

impl SafeSpaceRegion {
    /// `true` when `point` lies inside one of the safe polygons.
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        use crate::math::polygon_2d::point_in_polygon;
        self.result_paths.iter().any(|s| {
            point_in_polygon(point, &s.outer) && !s.holes.iter().any(|h| point_in_polygon(point, h))
        })
    }
}

/// Reserved regions of a panel.
///
/// Jointed, un-extended edges reserve a strip `2 x MT` deep over the body
/// extent of the edge; slots reserve their bounds grown by MT; cutouts
/// reserve themselves. Open and extended edges reserve nothing.
#[must_use]
pub fn reserved_regions(panel: &Panel) -> Vec<ReservedRegion> {
    let mt = panel.thickness;
    let (hw, hh) = (panel.half_width(), panel.half_height());
    let mut out = Vec::new();
    for edge in &panel.edges {
        if !edge.is_jointed() || edge.extension > 0.0 {
            continue;
        }
        let (half, half_along) = if edge.side.is_horizontal() { (hh, hw) } else { (hw, hh) };
        out.push(ReservedRegion {
            reason: ReservedReason::Joint(edge.side),
            points: edge_rect(edge.side, -half_along, half_along, half - 2.0 * mt, half + mt),
        });
    }
    for hole in &panel.holes {
        match &hole.id {
            HoleId::Cutout(id) => out.push(ReservedRegion {
                reason: ReservedReason::Cutout(id.clone()),
                points: hole.points.clone(),
            }),
            id => {
                if let Some(b) = Bounds2::of(&hole.points).map(|b| b.expanded(mt)) {
                    out.push(ReservedRegion {
                        reason: ReservedReason::Slot(id.clone()),
                        points: rectangle(b.min_x, b.min_y, b.max_x, b.max_y),
                    });
                }
            }
        }
    }
    out
}

/// Computes the safe region of a panel.
#[instrument(skip_all, fields(panel = %panel.id))]
#[must_use]
pub fn calculate_safe_space(panel: &Panel) -> SafeSpaceRegion {
    let reserved = reserved_regions(panel);
    let polygons: Vec<Vec<Point2>> = reserved.iter().map(|r| r.points.clone()).collect();
    let result_paths = subtract_all(&panel.outline, &[], &polygons);
    debug!(
        reserved = reserved.len(),
        regions = result_paths.len(),
        "safe space computed"
    );
    SafeSpaceRegion {
        outline: panel.outline.clone(),
        exclusions: union_all(&polygons),
        reserved,
        result_paths,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::operations::projection::project;
    use crate::tree::{Axis, FaceId, MaterialConfig, PanelId, Scene, Split};

    fn front_of(scene: &Scene) -> Panel {
        let id = scene.root().unwrap();
        let front = PanelId::Face {
            assembly: id,
            face: FaceId::Front,
        };
        project(scene, &KernelConfig::default())
            .unwrap()
            .into_iter()
            .find(|p| p.id == front)
            .unwrap()
    }

    #[test]
    fn closed_face_keeps_its_centre() {
        let mut s = Scene::new();
        s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        let safe = calculate_safe_space(&front_of(&s));
        assert_eq!(safe.reserved.len(), 4);
        assert_eq!(safe.result_paths.len(), 1);
        assert!(safe.contains(&Point2::new(0.0, 0.0)));
        // Inside the 2 x MT joint margin of the top edge.
        assert!(!safe.contains(&Point2::new(0.0, 71.0)));
        let b = Bounds2::of(&safe.result_paths[0].outer).unwrap();
        assert!((b.max_x - 94.0).abs() < 1e-6);
        assert!((b.min_y + 69.0).abs() < 1e-6);
    }

    #[test]
    fn divider_slots_reserve_a_margin() {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        let root = s.assembly(id).unwrap().root_void;
        s.add_subdivision(
            root,
            vec![Split {
                axis: Axis::X,
                positions: vec![100.0],
            }],
        )
        .unwrap();
        let front = front_of(&s);
        let reserved = reserved_regions(&front);
        let slot = reserved
            .iter()
            .find(|r| matches!(r.reason, ReservedReason::Slot(_)))
            .unwrap();
        let hole = front.holes.iter().find(|h| h.is_slot()).unwrap();
        let (hb, rb) = (Bounds2::of(&hole.points).unwrap(), Bounds2::of(&slot.points).unwrap());
        assert!((rb.width() - hb.width() - 2.0 * front.thickness).abs() < 1e-9);
        assert!(!calculate_safe_space(&front).contains(&hb.center()));
    }
}
