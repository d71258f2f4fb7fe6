use super::DIMENSIONS_BOUNDS;
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::tree::{Axis, VoidBounds, VoidContent, MIN_VOID_EXTENT};
use crate::validation::Violation;

fn inside(inner: &VoidBounds, outer: &VoidBounds, tol: f64) -> bool {
    Axis::ALL
        .into_iter()
        .all(|a| inner.min(a) >= outer.min(a) - tol && inner.max(a) <= outer.max(a) + tol)
}

/// Sizes of assemblies, voids and panels.
pub fn bounds(snap: &Snapshot, config: &KernelConfig) -> Vec<Violation> {
    let rule = DIMENSIONS_BOUNDS;
    let eps = config.epsilon;
    let mut out = Vec::new();

    for (_, a) in snap.scene.assemblies() {
        let mt = a.material.thickness;
        let min = 2.0 * mt + 1.0;
        for axis in Axis::ALL {
            let ext = a.extent(axis);
            if ext < min {
                out.push(Violation::error(rule, format!("assembly {axis:?} extent is too small")).measured(ext, min));
            }
        }
        if a.material.finger_width < mt {
            out.push(
                Violation::warning(rule, "fingers are narrower than the material")
                    .measured(a.material.finger_width, mt),
            );
        }
        if let Ok(root) = snap.scene.void(a.root_void) {
            let expected = a.interior_bounds();
            if Axis::ALL.into_iter().any(|ax| {
                (root.bounds.min(ax) - expected.min(ax)).abs() > eps
                    || (root.bounds.extent(ax) - expected.extent(ax)).abs() > eps
            }) {
                out.push(Violation::error(rule, "root void does not match the assembly interior"));
            }
        }
        if let Some(parent) = a.parent_void.and_then(|v| snap.scene.void(v).ok()) {
            if !inside(&a.outer_bounds(), &parent.bounds, eps) {
                out.push(Violation::error(rule, "sub-assembly does not fit its void"));
            }
        }
    }

    for (_, v) in snap.scene.voids() {
        for axis in Axis::ALL {
            let ext = v.bounds.extent(axis);
            if ext < MIN_VOID_EXTENT {
                out.push(Violation::error(rule, format!("void {axis:?} extent is too small")).measured(ext, MIN_VOID_EXTENT));
            }
        }
        if let VoidContent::Subdivided(sub) = &v.content {
            for child in &sub.children {
                if let Ok(c) = snap.scene.void(*child) {
                    if !inside(&c.bounds, &v.bounds, eps) {
                        out.push(Violation::error(rule, "child void escapes its parent"));
                    }
                }
            }
        }
    }

    for p in &snap.panels {
        let smallest = p.width.min(p.height);
        if smallest < config.min_panel_dimension {
            out.push(
                Violation::error(rule, "panel is smaller than the minimum dimension")
                    .on(p.id)
                    .measured(smallest, config.min_panel_dimension),
            );
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::{MaterialConfig, Scene};

    #[test]
    fn thin_fingers_warn() {
        let mut s = Scene::new();
        let material = MaterialConfig {
            thickness: 6.0,
            finger_width: 4.0,
            finger_gap: 1.5,
        };
        s.create_assembly(200.0, 150.0, 100.0, material).unwrap();
        let cfg = KernelConfig::default();
        let v = bounds(&Snapshot::build(&s, &cfg).unwrap(), &cfg);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].severity, crate::validation::Severity::Warning);
    }
}
