pub mod edge_path;
pub mod panel;

pub use edge_path::{EdgePath, EdgePathPoint};
pub use panel::{EdgeInfo, EdgeStatus, Hole, HoleId, Panel, PanelKind};
