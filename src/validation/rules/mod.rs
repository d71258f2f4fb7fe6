//! The built-in rules and their stable ids.
//!
//! Ids are part of the public contract: tooling filters on them, so a rule
//! may gain checks but never change its id or meaning.

pub mod dimensions;
pub mod extensions;
pub mod geometry;
pub mod joints;
pub mod paths;
pub mod safe_space;

use super::Rule;

pub const GEOMETRY_CONSISTENCY: &str = "geometry.consistency";
pub const GEOMETRY_OVERLAP: &str = "geometry.overlap";
pub const GEOMETRY_CONFLICTING_EXTENSIONS: &str = "geometry.conflicting-extensions";
pub const DIMENSIONS_BOUNDS: &str = "dimensions.bounds";
pub const JOINTS_GENDER: &str = "joints.gender";
pub const JOINTS_FINGER_MATCH: &str = "joints.finger-match";
pub const PATHS_VALIDITY: &str = "paths.validity";
pub const EXTENSIONS_ELIGIBILITY: &str = "extensions.eligibility";
pub const EXTENSIONS_FULL_WIDTH: &str = "extensions.full-width";
pub const EXTENSIONS_FAR_EDGE_OPEN: &str = "extensions.far-edge-open";
pub const EXTENSIONS_CORNER_OWNERSHIP: &str = "extensions.corner-ownership";
pub const EXTENSIONS_LONG_FINGERS: &str = "extensions.long-fingers";
pub const SAFE_SPACE_VALIDITY: &str = "safe-space.validity";

/// Every built-in rule, in reporting order.
#[must_use]
pub fn builtin() -> Vec<Rule> {
    vec![
        Rule {
            id: GEOMETRY_CONSISTENCY,
            description: "outlines and holes are well-formed and owned",
            check: geometry::consistency,
        },
        Rule {
            id: GEOMETRY_OVERLAP,
            description: "panels do not interpenetrate beyond joint depth",
            check: geometry::overlap,
        },
        Rule {
            id: GEOMETRY_CONFLICTING_EXTENSIONS,
            description: "adjacent faces do not both extend into a shared corner",
            check: geometry::conflicting_extensions,
        },
        Rule {
            id: DIMENSIONS_BOUNDS,
            description: "assemblies, voids and panels have usable sizes",
            check: dimensions::bounds,
        },
        Rule {
            id: JOINTS_GENDER,
            description: "every joint pairs a male edge with a female edge or slot",
            check: joints::gender,
        },
        Rule {
            id: JOINTS_FINGER_MATCH,
            description: "mating edges agree on finger positions",
            check: joints::finger_match,
        },
        Rule {
            id: PATHS_VALIDITY,
            description: "contours and custom edge paths are well-formed",
            check: paths::validity,
        },
        Rule {
            id: EXTENSIONS_ELIGIBILITY,
            description: "only open or outward-only edges are extended",
            check: extensions::eligibility,
        },
        Rule {
            id: EXTENSIONS_FULL_WIDTH,
            description: "an extension spans its whole edge",
            check: extensions::full_width,
        },
        Rule {
            id: EXTENSIONS_FAR_EDGE_OPEN,
            description: "the cap of an extension is a plain line",
            check: extensions::far_edge_open,
        },
        Rule {
            id: EXTENSIONS_CORNER_OWNERSHIP,
            description: "one panel owns each extended corner",
            check: extensions::corner_ownership,
        },
        Rule {
            id: EXTENSIONS_LONG_FINGERS,
            description: "long extensions may need their own joints",
            check: extensions::long_fingers,
        },
        Rule {
            id: SAFE_SPACE_VALIDITY,
            description: "cutouts stay clear of joints and safe space is usable",
            check: safe_space::validity,
        },
    ]
}
