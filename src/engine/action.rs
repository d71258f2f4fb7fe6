use serde::{Deserialize, Serialize};

use crate::geometry::edge_path::EdgePath;
use crate::math::Point2;
use crate::tree::{
    AssemblyId, Axis, CornerId, Cutout, EdgeSide, FaceId, FeetConfig, LidConfig, LidSide, MaterialConfig,
    PanelCorner, PanelId, Split, VoidId,
};

/// Boolean performed by [`Action::ApplyEdgeOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOperationMode {
    /// Adds the polygon to the panel.
    Union,
    /// Cuts the polygon out of the panel.
    Difference,
}

/// One entry of [`Action::SetExtensions`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtensionEdit {
    pub panel: PanelId,
    pub side: EdgeSide,
    pub value: f64,
}

/// One entry of [`Action::SetCornerFillets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerFilletEdit {
    pub panel: PanelId,
    pub corner: PanelCorner,
    pub radius: f64,
}

/// One entry of [`Action::SetAllCornerFillets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllCornerFilletEdit {
    pub panel: PanelId,
    pub corner: CornerId,
    pub radius: f64,
}

/// Everything that can change a design.
///
/// Actions are plain data: they can be serialized, stored and replayed
/// against an engine to rebuild the same tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Replaces the design with a single box.
    CreateAssembly {
        width: f64,
        height: f64,
        depth: f64,
        material: MaterialConfig,
    },
    ResizeAssembly {
        assembly: AssemblyId,
        width: f64,
        height: f64,
        depth: f64,
    },
    ToggleFace {
        assembly: AssemblyId,
        face: FaceId,
    },
    /// Parallel dividers along one axis.
    AddSubdivision {
        void: VoidId,
        axis: Axis,
        positions: Vec<f64>,
    },
    /// One or two splits at once; two splits make a cross-lapped grid.
    AddSubdivisions {
        void: VoidId,
        splits: Vec<Split>,
    },
    RemoveSubdivision {
        void: VoidId,
    },
    CreateSubAssembly {
        void: VoidId,
        clearance: f64,
    },
    RemoveSubAssembly {
        assembly: AssemblyId,
    },
    SetMaterial {
        assembly: AssemblyId,
        material: MaterialConfig,
    },
    SetAxis {
        assembly: AssemblyId,
        axis: Axis,
    },
    SetLid {
        assembly: AssemblyId,
        side: LidSide,
        config: LidConfig,
    },
    SetFeet {
        assembly: AssemblyId,
        feet: Option<FeetConfig>,
    },
    /// Sets (not adds to) the extension of one edge; 0 clears it.
    SetExtension {
        panel: PanelId,
        side: EdgeSide,
        value: f64,
    },
    /// Several extensions, applied all or nothing.
    SetExtensions {
        edits: Vec<ExtensionEdit>,
    },
    /// Rounds one of the four fixed corners; a radius of 0 clears it.
    SetCornerFillet {
        panel: PanelId,
        corner: PanelCorner,
        radius: f64,
    },
    /// Entries apply independently; succeeds when at least one applies.
    SetCornerFillets {
        edits: Vec<CornerFilletEdit>,
    },
    /// Rounds any detected corner, including hole corners.
    SetAllCornerFillet {
        panel: PanelId,
        corner: CornerId,
        radius: f64,
    },
    SetAllCornerFillets {
        edits: Vec<AllCornerFilletEdit>,
    },
    AddCutout {
        panel: PanelId,
        cutout: Cutout,
    },
    /// Replaces the shape of the cutout with the same id.
    UpdateCutout {
        panel: PanelId,
        cutout: Cutout,
    },
    RemoveCutout {
        panel: PanelId,
        id: String,
    },
    SetEdgePath {
        panel: PanelId,
        side: EdgeSide,
        path: EdgePath,
    },
    ClearEdgePath {
        panel: PanelId,
        side: EdgeSide,
    },
    /// Adds or cuts an arbitrary panel-local polygon.
    ApplyEdgeOperation {
        panel: PanelId,
        polygon: Vec<Point2>,
        mode: EdgeOperationMode,
    },
}

impl Action {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::CreateAssembly { .. } => "create_assembly",
            Action::ResizeAssembly { .. } => "resize_assembly",
            Action::ToggleFace { .. } => "toggle_face",
            Action::AddSubdivision { .. } => "add_subdivision",
            Action::AddSubdivisions { .. } => "add_subdivisions",
            Action::RemoveSubdivision { .. } => "remove_subdivision",
            Action::CreateSubAssembly { .. } => "create_sub_assembly",
            Action::RemoveSubAssembly { .. } => "remove_sub_assembly",
            Action::SetMaterial { .. } => "set_material",
            Action::SetAxis { .. } => "set_axis",
            Action::SetLid { .. } => "set_lid",
            Action::SetFeet { .. } => "set_feet",
            Action::SetExtension { .. } => "set_extension",
            Action::SetExtensions { .. } => "set_extensions",
            Action::SetCornerFillet { .. } => "set_corner_fillet",
            Action::SetCornerFillets { .. } => "set_corner_fillets",
            Action::SetAllCornerFillet { .. } => "set_all_corner_fillet",
            Action::SetAllCornerFillets { .. } => "set_all_corner_fillets",
            Action::AddCutout { .. } => "add_cutout",
            Action::UpdateCutout { .. } => "update_cutout",
            Action::RemoveCutout { .. } => "remove_cutout",
            Action::SetEdgePath { .. } => "set_edge_path",
            Action::ClearEdgePath { .. } => "clear_edge_path",
            Action::ApplyEdgeOperation { .. } => "apply_edge_operation",
        }
    }

    /// Whether applying the action needs the projected panels of the target tree.
    #[must_use]
    pub fn needs_snapshot(&self) -> bool {
        matches!(
            self,
            Action::SetExtension { .. }
                | Action::SetExtensions { .. }
                | Action::SetCornerFillet { .. }
                | Action::SetCornerFillets { .. }
                | Action::SetAllCornerFillet { .. }
                | Action::SetAllCornerFillets { .. }
                | Action::ApplyEdgeOperation { .. }
        )
    }
}
