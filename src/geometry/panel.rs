use serde::{Deserialize, Serialize};

use crate::math::bounds::Bounds2;
use crate::math::polygon_2d::centered_rectangle;
use crate::math::transform::{rigid_inverse, transform_point};
use crate::math::{Matrix4, Point2, Point3};
use crate::operations::fillet::Corner;
use crate::operations::joint::{FingerPattern, Gender};
use crate::tree::{AssemblyId, Axis, EdgeSide, FaceId, PanelId};

/// What a panel is cut for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelKind {
    Face(FaceId),
    Divider(Axis),
}

/// How far an edge may be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeStatus {
    /// Male joint: fingers fixed, no extension.
    Locked,
    /// Female joint: may only grow outwards.
    OutwardOnly,
    /// No joint: free.
    Unlocked,
}

/// Derived state of one panel edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub side: EdgeSide,
    pub status: EdgeStatus,
    pub gender: Option<Gender>,
    /// Panel across the joint.
    pub mate: Option<PanelId>,
    /// Extension the user asked for.
    pub requested_extension: f64,
    /// Extension actually applied to the outline (includes feet).
    pub extension: f64,
    pub pattern: Option<FingerPattern>,
    /// Edge carries feet.
    pub feet: bool,
}

impl EdgeInfo {
    #[must_use]
    pub fn is_jointed(&self) -> bool {
        self.gender.is_some()
    }

    /// `true` when the edge outline is a plain line (possibly shaped by an edge path).
    #[must_use]
    pub fn is_straight(&self) -> bool {
        match self.status {
            EdgeStatus::Unlocked => true,
            EdgeStatus::OutwardOnly => self.extension > 0.0,
            EdgeStatus::Locked => false,
        }
    }
}

/// Identifies a hole within a panel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HoleId {
    /// Slot receiving a divider tab, numbered per panel.
    Slot(usize),
    /// Slot left where an extended female edge used to have notches.
    ExtensionSlot(EdgeSide, usize),
    Cutout(String),
}

/// A closed hole contour, clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub id: HoleId,
    /// Panel whose tab passes through the hole, for divider slots.
    pub mate: Option<PanelId>,
    pub points: Vec<Point2>,
}

impl Hole {
    #[must_use]
    pub fn is_slot(&self) -> bool {
        !matches!(self.id, HoleId::Cutout(_))
    }
}

/// A derived, cuttable panel.
///
/// Local coordinates are centred on the panel; `transform` maps local
/// `(x, y, z)` to world space with `z` along the panel normal and the sheet
/// occupying `z` in `[-thickness / 2, thickness / 2]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub kind: PanelKind,
    pub owner: AssemblyId,
    /// Nominal width along local x.
    pub width: f64,
    /// Nominal height along local y.
    pub height: f64,
    pub thickness: f64,
    pub transform: Matrix4,
    /// Edges indexed by [`EdgeSide::index`].
    pub edges: [EdgeInfo; 4],
    /// Counter-clockwise outline.
    pub outline: Vec<Point2>,
    pub holes: Vec<Hole>,
    /// Whether outline or holes contain arc approximations.
    pub has_curves: bool,
    /// Radii of the fillets that were applied, by position of the filleted corner.
    pub fillets: Vec<(Point2, f64)>,
    /// Corners detected before fillets were applied; fillet requests index these.
    pub corners: Vec<Corner>,
}

impl Panel {
    #[must_use]
    pub fn edge(&self, side: EdgeSide) -> &EdgeInfo {
        &self.edges[side.index()]
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    #[must_use]
    pub fn half_height(&self) -> f64 {
        self.height * 0.5
    }

    /// Nominal body rectangle, counter-clockwise.
    #[must_use]
    pub fn body_rect(&self) -> Vec<Point2> {
        centered_rectangle(0.0, 0.0, self.width, self.height)
    }

    /// Bounds of the actual outline.
    #[must_use]
    pub fn outline_bounds(&self) -> Bounds2 {
        Bounds2::of(&self.outline).unwrap_or(Bounds2 {
            min_x: -self.half_width(),
            min_y: -self.half_height(),
            max_x: self.half_width(),
            max_y: self.half_height(),
        })
    }

    /// Maps a local point (`z` along the normal) to world space.
    #[must_use]
    pub fn to_world(&self, x: f64, y: f64, z: f64) -> Point3 {
        transform_point(&self.transform, &Point3::new(x, y, z))
    }

    /// Maps a world point into the panel's local frame.
    #[must_use]
    pub fn to_local(&self, p: &Point3) -> Point3 {
        transform_point(&rigid_inverse(&self.transform), p)
    }

    #[must_use]
    pub fn hole(&self, id: &HoleId) -> Option<&Hole> {
        self.holes.iter().find(|h| &h.id == id)
    }

    /// `true` for dividers.
    #[must_use]
    pub fn is_divider(&self) -> bool {
        matches!(self.kind, PanelKind::Divider(_))
    }
}
