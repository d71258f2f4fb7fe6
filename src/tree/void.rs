use serde::{Deserialize, Serialize};

use super::assembly::AssemblyId;
use super::types::{Axis, VoidBounds};
use crate::error::{invalid, Result};

slotmap::new_key_type! {
    /// Unique identifier for a void in the node tree.
    pub struct VoidId;
}

/// A set of parallel dividers splitting a void along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub axis: Axis,
    /// Absolute coordinates of the divider centre planes, ascending.
    pub positions: Vec<f64>,
}

/// How a parent void is divided.
///
/// One split makes parallel compartments, two splits on different axes make
/// a grid of cross-lapped dividers. Children are stored row-major over the
/// splits (the last split varies fastest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    pub splits: Vec<Split>,
    pub children: Vec<VoidId>,
}

/// The single role a void plays in the tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum VoidContent {
    #[default]
    Leaf,
    Subdivided(Subdivision),
    SubAssembly(AssemblyId),
}

/// Data associated with a void.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidData {
    pub bounds: VoidBounds,
    /// Assembly whose interior contains this void.
    pub assembly: AssemblyId,
    pub parent: Option<VoidId>,
    pub content: VoidContent,
}

impl VoidData {
    #[must_use]
    pub fn new(bounds: VoidBounds, assembly: AssemblyId, parent: Option<VoidId>) -> Self {
        Self {
            bounds,
            assembly,
            parent,
            content: VoidContent::Leaf,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.content, VoidContent::Leaf)
    }

    #[must_use]
    pub fn subdivision(&self) -> Option<&Subdivision> {
        match &self.content {
            VoidContent::Subdivided(sub) => Some(sub),
            _ => None,
        }
    }
}

/// Compartment ranges `(min, extent)` left between dividers of thickness `mt`.
///
/// `positions` must be ascending and every compartment must be wider than
/// `min_gap`.
///
/// # Errors
///
/// Returns an error when a position lies outside the range or two dividers
/// leave no room between them.
pub fn partition(min: f64, extent: f64, positions: &[f64], mt: f64, min_gap: f64) -> Result<Vec<(f64, f64)>> {
    let max = min + extent;
    let mut ranges = Vec::with_capacity(positions.len() + 1);
    let mut start = min;
    for &p in positions {
        if !p.is_finite() {
            return Err(invalid("split position is not finite"));
        }
        let end = p - mt * 0.5;
        if end - start < min_gap {
            return Err(invalid(format!(
                "split at {p} leaves no room in [{min}, {max}]"
            )));
        }
        ranges.push((start, end - start));
        start = p + mt * 0.5;
    }
    if max - start < min_gap {
        return Err(invalid(format!(
            "last split leaves no room before {max}"
        )));
    }
    ranges.push((start, max - start));
    Ok(ranges)
}

/// Bounds of every child of `bounds` under `splits`, row-major.
///
/// # Errors
///
/// Propagates [`partition`] failures.
pub fn child_bounds(bounds: &VoidBounds, splits: &[Split], mt: f64, min_gap: f64) -> Result<Vec<VoidBounds>> {
    let mut cells = vec![*bounds];
    for split in splits {
        let ranges = partition(
            bounds.min(split.axis),
            bounds.extent(split.axis),
            &split.positions,
            mt,
            min_gap,
        )?;
        cells = cells
            .iter()
            .flat_map(|cell| {
                ranges
                    .iter()
                    .map(move |&(lo, ext)| cell.with_range(split.axis, lo, ext))
            })
            .collect();
    }
    Ok(cells)
}

/// Rescales positions from the range `(old_min, old_extent)` to `(new_min, new_extent)`.
#[must_use]
pub fn rescale_positions(positions: &[f64], old_min: f64, old_extent: f64, new_min: f64, new_extent: f64) -> Vec<f64> {
    if old_extent.abs() < f64::EPSILON {
        return positions.to_vec();
    }
    let scale = new_extent / old_extent;
    positions
        .iter()
        .map(|p| new_min + (p - old_min) * scale)
        .collect()
}
