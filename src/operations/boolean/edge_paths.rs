use std::collections::BTreeMap;

use crate::geometry::edge_path::{dedup_path, interpolate, EdgePath, EdgePathPoint};
use crate::math::polygon_2d::{distance_to_segment, ensure_ccw};
use crate::math::Point2;
use crate::tree::EdgeSide;

const CORNER_TOL: f64 = 1e-6;
const OFFSET_TOL: f64 = 1e-6;

/// Turns a modified body polygon into per-edge paths.
///
/// `result` is the body rectangle (`width x height`, centred) after a union
/// or difference. Every vertex is assigned to its nearest body edge; vertices
/// on the body corners are skipped. Edges left straight are omitted.
#[must_use]
pub fn extract_affected_edges(result: &[Point2], width: f64, height: f64) -> BTreeMap<EdgeSide, EdgePath> {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let pts = ensure_ccw(result);
    let assigned: Vec<Option<EdgeSide>> = pts.iter().map(|p| nearest_edge(p, hw, hh)).collect();

    // Start right after a change of edge so runs do not wrap around.
    let n = pts.len();
    let start = (0..n)
        .find(|&i| assigned[i] != assigned[(i + n - 1) % n])
        .unwrap_or(0);

    let mut runs: BTreeMap<EdgeSide, Vec<Vec<EdgePathPoint>>> = BTreeMap::new();
    let mut current: Option<(EdgeSide, Vec<EdgePathPoint>)> = None;
    for k in 0..n {
        let i = (start + k) % n;
        let Some(side) = assigned[i] else {
            if let Some((s, run)) = current.take() {
                runs.entry(s).or_default().push(run);
            }
            continue;
        };
        let point = to_edge_point(&pts[i], side, hw, hh);
        match &mut current {
            Some((s, run)) if *s == side => run.push(point),
            _ => {
                if let Some((s, run)) = current.take() {
                    runs.entry(s).or_default().push(run);
                }
                current = Some((side, vec![point]));
            }
        }
    }
    if let Some((s, run)) = current.take() {
        runs.entry(s).or_default().push(run);
    }

    let mut out = BTreeMap::new();
    for (side, mut side_runs) in runs {
        for run in &mut side_runs {
            if run.first().map(|p| p.t) > run.last().map(|p| p.t) {
                run.reverse();
            }
        }
        side_runs.sort_by(|a, b| a[0].t.total_cmp(&b[0].t));
        let mut points: Vec<EdgePathPoint> = side_runs.into_iter().flatten().collect();
        if points.iter().all(|p| p.offset.abs() < OFFSET_TOL) {
            continue;
        }
        if points.first().is_none_or(|p| p.t > OFFSET_TOL || p.offset.abs() > OFFSET_TOL) {
            points.insert(0, EdgePathPoint::new(0.0, 0.0));
        }
        if points
            .last()
            .is_none_or(|p| p.t < 1.0 - OFFSET_TOL || p.offset.abs() > OFFSET_TOL)
        {
            points.push(EdgePathPoint::new(1.0, 0.0));
        }
        out.insert(side, EdgePath::new(dedup_path(&points)));
    }
    out
}

/// Combines an existing edge path with a newer one.
///
/// Wherever the newer path deviates from the straight edge it wins;
/// everywhere else the existing path survives, cut at the range boundaries.
#[must_use]
pub fn merge_edge_paths(existing: &EdgePath, newer: &EdgePath) -> EdgePath {
    let old = existing.resolved();
    let new = newer.resolved();
    let ranges = modified_ranges(&new);
    if ranges.is_empty() {
        return EdgePath::new(old);
    }

    let mut out: Vec<EdgePathPoint> = Vec::with_capacity(old.len() + new.len());
    let mut old_iter = old.iter().peekable();
    for &(a, b) in &ranges {
        while let Some(p) = old_iter.next_if(|p| p.t < a - OFFSET_TOL) {
            out.push(*p);
        }
        out.push(EdgePathPoint::new(a, interpolate_before(&old, a)));
        out.extend(
            new.iter()
                .filter(|p| p.t >= a - OFFSET_TOL && p.t <= b + OFFSET_TOL)
                .copied(),
        );
        out.push(EdgePathPoint::new(b, interpolate_after(&old, b)));
        while old_iter.next_if(|p| p.t <= b + OFFSET_TOL).is_some() {}
    }
    out.extend(old_iter.copied());
    EdgePath::new(collapse_steps(&dedup_path(&out)))
}

/// Keeps only the first and last point of every run sharing one `t`, so a
/// step never doubles back on itself.
fn collapse_steps(points: &[EdgePathPoint]) -> Vec<EdgePathPoint> {
    let mut out: Vec<EdgePathPoint> = Vec::with_capacity(points.len());
    for &p in points {
        let n = out.len();
        if n >= 2 && (out[n - 1].t - p.t).abs() < OFFSET_TOL && (out[n - 2].t - p.t).abs() < OFFSET_TOL {
            out[n - 1] = p;
        } else {
            out.push(p);
        }
    }
    dedup_path(&out)
}

/// Parameter ranges where a path leaves the straight edge.
fn modified_ranges(points: &[EdgePathPoint]) -> Vec<(f64, f64)> {
    let mut ranges: Vec<(f64, f64)> = Vec::new();
    for w in points.windows(2) {
        if w[0].offset.abs() < OFFSET_TOL && w[1].offset.abs() < OFFSET_TOL {
            continue;
        }
        match ranges.last_mut() {
            Some(last) if w[0].t <= last.1 + OFFSET_TOL => last.1 = last.1.max(w[1].t),
            _ => ranges.push((w[0].t, w[1].t)),
        }
    }
    ranges
}

/// Offset approaching `t` from below (the last value of a vertical step).
fn interpolate_before(points: &[EdgePathPoint], t: f64) -> f64 {
    let before: Vec<EdgePathPoint> = points.iter().copied().filter(|p| p.t <= t + OFFSET_TOL).collect();
    match before.last() {
        Some(p) if (p.t - t).abs() <= OFFSET_TOL => p.offset,
        _ => interpolate(points, t),
    }
}

/// Offset leaving `t` upwards (the first value after a vertical step).
fn interpolate_after(points: &[EdgePathPoint], t: f64) -> f64 {
    match points.iter().find(|p| p.t >= t - OFFSET_TOL) {
        Some(p) if (p.t - t).abs() <= OFFSET_TOL => p.offset,
        _ => interpolate(points, t),
    }
}

fn nearest_edge(p: &Point2, hw: f64, hh: f64) -> Option<EdgeSide> {
    let on_corner = ((p.x.abs() - hw).abs() < CORNER_TOL) && ((p.y.abs() - hh).abs() < CORNER_TOL);
    if on_corner {
        return None;
    }
    EdgeSide::ALL
        .into_iter()
        .map(|side| {
            let (a, b) = side.endpoints(hw, hh);
            (side, distance_to_segment(p, &a, &b))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(side, _)| side)
}

fn to_edge_point(p: &Point2, side: EdgeSide, hw: f64, hh: f64) -> EdgePathPoint {
    let (t, offset) = match side {
        EdgeSide::Top => ((p.x + hw) / (2.0 * hw), p.y - hh),
        EdgeSide::Bottom => ((p.x + hw) / (2.0 * hw), -(p.y + hh)),
        EdgeSide::Right => ((p.y + hh) / (2.0 * hh), p.x - hw),
        EdgeSide::Left => ((p.y + hh) / (2.0 * hh), -(p.x + hw)),
    };
    EdgePathPoint::new(t.clamp(0.0, 1.0), offset)
}
