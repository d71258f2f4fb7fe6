mod classify;
mod edge_paths;
mod ops;

pub use classify::{classify_polygon, PolygonClassification};
pub use edge_paths::{extract_affected_edges, merge_edge_paths};
pub use ops::{
    difference_polygons, intersection_area, largest, overlay, subtract_all, union_all, union_polygons, BooleanOp,
    Shape, MIN_AREA,
};
