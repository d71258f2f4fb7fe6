use std::collections::BTreeMap;

use crate::geometry::edge_path::EdgePath;
use crate::geometry::panel::{EdgeInfo, EdgeStatus};
use crate::math::polygon_2d::{ensure_ccw, rectangle, simplify};
use crate::math::{Point2, TOLERANCE};
use crate::operations::joint::{push_unique_point, Gender};
use crate::tree::EdgeSide;

/// Distance from the panel centre to the straight base line of an edge.
#[must_use]
pub fn base_level(edge: &EdgeInfo, half: f64, mt: f64) -> f64 {
    match edge.status {
        EdgeStatus::Locked => half - mt,
        EdgeStatus::OutwardOnly | EdgeStatus::Unlocked => half + edge.extension,
    }
}

/// Most negative extension an edge at `half` from the centre can take: its
/// base line stays at least 2 MT out from the centre.
#[must_use]
pub fn min_extension(half: f64, mt: f64) -> f64 {
    (2.0 * mt - half).min(0.0)
}

/// Builds a counter-clockwise panel outline from its four edges.
///
/// Corners sit where adjacent base lines meet. Male edges get teeth out to
/// the nominal boundary, un-extended female edges get notches of depth MT,
/// straight edges follow their custom edge path when one is given.
#[must_use]
pub fn build_outline(
    width: f64,
    height: f64,
    mt: f64,
    edges: &[EdgeInfo; 4],
    paths: Option<&BTreeMap<EdgeSide, EdgePath>>,
) -> Vec<Point2> {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let level = |side: EdgeSide| {
        let half = if side.is_horizontal() { hh } else { hw };
        base_level(&edges[side.index()], half, mt)
    };
    let (top, right, bottom, left) = (
        level(EdgeSide::Top),
        level(EdgeSide::Right),
        level(EdgeSide::Bottom),
        level(EdgeSide::Left),
    );

    let mut outline: Vec<Point2> = Vec::new();
    // Counter-clockwise: bottom and right run forward, top and left backward.
    let walk = [
        (EdgeSide::Bottom, -left, right, false),
        (EdgeSide::Right, -bottom, top, false),
        (EdgeSide::Top, -left, right, true),
        (EdgeSide::Left, -bottom, top, true),
    ];
    for (side, from, to, reverse) in walk {
        let edge = &edges[side.index()];
        let half_along = if side.is_horizontal() { hw } else { hh };
        let path = paths.and_then(|p| p.get(&side)).filter(|_| edge.is_straight());
        let mut pts = edge_polyline(edge, from, to, half_along, mt, path);
        if reverse {
            pts.reverse();
        }
        let base = level(side);
        for (along, offset) in pts {
            let p = match side {
                EdgeSide::Top => Point2::new(along, base + offset),
                EdgeSide::Bottom => Point2::new(along, -base - offset),
                EdgeSide::Right => Point2::new(base + offset, along),
                EdgeSide::Left => Point2::new(-base - offset, along),
            };
            push_unique_point(&mut outline, p);
        }
    }
    ensure_ccw(&simplify(&outline, TOLERANCE))
}

/// Edge points as `(along, offset)` pairs from `from` to `to`.
fn edge_polyline(
    edge: &EdgeInfo,
    from: f64,
    to: f64,
    half_along: f64,
    mt: f64,
    path: Option<&EdgePath>,
) -> Vec<(f64, f64)> {
    let (from, to) = (from.min(to), from.max(to));
    if let Some(path) = path {
        let mut pts: Vec<(f64, f64)> = path
            .resolved()
            .iter()
            .map(|p| ((-half_along + 2.0 * half_along * p.t).clamp(from, to), p.offset))
            .collect();
        pts.insert(0, (from, 0.0));
        pts.push((to, 0.0));
        return pts;
    }
    let depth = match (edge.status, edge.gender) {
        (EdgeStatus::Locked, Some(Gender::Male)) => mt,
        (EdgeStatus::OutwardOnly, Some(Gender::Female)) if edge.extension <= 0.0 => -mt,
        _ => 0.0,
    };
    match &edge.pattern {
        Some(pattern) if depth != 0.0 && !pattern.is_straight() => pattern
            .polyline(from, to, depth)
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect(),
        _ => vec![(from, 0.0), (to, 0.0)],
    }
}

/// Closed slot holes left in an extended female edge, one per mate finger.
#[must_use]
pub fn extension_slots(edge: &EdgeInfo, width: f64, height: f64, mt: f64) -> Vec<Vec<Point2>> {
    let Some(pattern) = &edge.pattern else {
        return Vec::new();
    };
    if edge.status != EdgeStatus::OutwardOnly || edge.extension <= 0.0 {
        return Vec::new();
    }
    let half = if edge.side.is_horizontal() { height * 0.5 } else { width * 0.5 };
    pattern
        .fingers
        .iter()
        .map(|&(a, b)| edge_rect(edge.side, a, b, half - mt, half))
        .collect()
}

/// Rectangle spanning `[a, b]` along `side` and `[near, far]` outwards from the centre.
#[must_use]
pub fn edge_rect(side: EdgeSide, a: f64, b: f64, near: f64, far: f64) -> Vec<Point2> {
    match side {
        EdgeSide::Top => rectangle(a, near, b, far),
        EdgeSide::Bottom => rectangle(a, -far, b, -near),
        EdgeSide::Right => rectangle(near, a, far, b),
        EdgeSide::Left => rectangle(-far, a, -near, b),
    }
}

/// `true` when every outline segment is horizontal or vertical.
#[must_use]
pub fn is_rectilinear(points: &[Point2]) -> bool {
    crate::math::polygon_2d::is_axis_aligned(points, 1e-6)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::edge_path::EdgePathPoint;
    use crate::math::bounds::Bounds2;
    use crate::math::polygon_2d::{has_consecutive_duplicates, signed_area};
    use crate::operations::joint::FingerJoint;
    use crate::tree::MaterialConfig;

    fn edge(side: EdgeSide, status: EdgeStatus, len: f64, ext: f64) -> EdgeInfo {
        let gender = match status {
            EdgeStatus::Locked => Some(Gender::Male),
            EdgeStatus::OutwardOnly => Some(Gender::Female),
            EdgeStatus::Unlocked => None,
        };
        EdgeInfo {
            side,
            status,
            gender,
            mate: None,
            requested_extension: ext,
            extension: ext,
            pattern: gender.map(|_| {
                FingerJoint::new(len, MaterialConfig::default())
                    .locked(true, true)
                    .execute()
            }),
            feet: false,
        }
    }

    fn edges(status: EdgeStatus, ext: f64) -> [EdgeInfo; 4] {
        [
            edge(EdgeSide::Top, status, 100.0, ext),
            edge(EdgeSide::Right, status, 80.0, ext),
            edge(EdgeSide::Bottom, status, 100.0, ext),
            edge(EdgeSide::Left, status, 80.0, ext),
        ]
    }

    #[test]
    fn crossed_levels_with_a_path_do_not_panic() {
        let mut e = edges(EdgeStatus::Unlocked, 0.0);
        e[EdgeSide::Left.index()].extension = -60.0;
        e[EdgeSide::Right.index()].extension = -60.0;
        let path = EdgePath::new(vec![EdgePathPoint::new(0.4, -5.0), EdgePathPoint::new(0.6, -5.0)]);
        let paths = BTreeMap::from([(EdgeSide::Top, path)]);
        let outline = build_outline(100.0, 80.0, 3.0, &e, Some(&paths));
        assert!(Bounds2::of(&outline).is_some());
    }

    #[test]
    fn min_extension_keeps_two_thicknesses() {
        assert!((min_extension(100.0, 3.0) + 94.0).abs() < 1e-12);
        assert!(min_extension(4.0, 3.0).abs() < 1e-12);
    }

    #[test]
    fn male_outline_reaches_nominal_bounds() {
        let outline = build_outline(100.0, 80.0, 3.0, &edges(EdgeStatus::Locked, 0.0), None);
        let b = Bounds2::of(&outline).unwrap();
        assert!((b.max_x - 50.0).abs() < 1e-9 && (b.min_y + 40.0).abs() < 1e-9);
        assert!(signed_area(&outline) > 0.0);
        assert!(is_rectilinear(&outline));
        assert!(!has_consecutive_duplicates(&outline, 1e-9));
    }

    #[test]
    fn female_extended_outline_is_a_clean_rectangle() {
        let outline = build_outline(100.0, 80.0, 3.0, &edges(EdgeStatus::OutwardOnly, 15.0), None);
        assert_eq!(outline.len(), 4);
        let b = Bounds2::of(&outline).unwrap();
        assert!((b.max_x - 65.0).abs() < 1e-9 && (b.max_y - 55.0).abs() < 1e-9);
        let slots = extension_slots(&edges(EdgeStatus::OutwardOnly, 15.0)[0], 100.0, 80.0, 3.0);
        assert!(!slots.is_empty());
    }

    #[test]
    fn custom_path_shapes_open_edge() {
        let mut paths = BTreeMap::new();
        paths.insert(
            EdgeSide::Top,
            EdgePath::new(vec![
                EdgePathPoint::new(0.4, 0.0),
                EdgePathPoint::new(0.4, -10.0),
                EdgePathPoint::new(0.6, -10.0),
                EdgePathPoint::new(0.6, 0.0),
            ]),
        );
        let outline = build_outline(100.0, 80.0, 3.0, &edges(EdgeStatus::Unlocked, 0.0), Some(&paths));
        assert_eq!(outline.len(), 8);
        assert!(outline.iter().any(|p| (p.x + 10.0).abs() < 1e-9 && (p.y - 30.0).abs() < 1e-9));
    }
}
