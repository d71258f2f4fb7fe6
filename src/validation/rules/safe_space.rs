use super::SAFE_SPACE_VALIDITY;
use crate::config::KernelConfig;
use crate::engine::Snapshot;
use crate::operations::boolean::{intersection_area, MIN_AREA};
use crate::operations::safe_space::{calculate_safe_space, ReservedReason};
use crate::validation::Violation;

/// Cutouts keep clear of joint and slot margins, and the safe area is usable.
pub fn validity(snap: &Snapshot, _config: &KernelConfig) -> Vec<Violation> {
    let rule = SAFE_SPACE_VALIDITY;
    let mut out = Vec::new();
    for p in &snap.panels {
        let safe = calculate_safe_space(p);
        let (cutouts, margins): (Vec<_>, Vec<_>) = safe
            .reserved
            .iter()
            .partition(|r| matches!(r.reason, ReservedReason::Cutout(_)));
        for c in &cutouts {
            let ReservedReason::Cutout(id) = &c.reason else {
                continue;
            };
            for m in &margins {
                let area = intersection_area(&c.points, &m.points);
                if area > MIN_AREA {
                    out.push(
                        Violation::error(rule, format!("cutout {id} intrudes on {:?}", m.reason))
                            .on(p.id)
                            .measured(area, MIN_AREA),
                    );
                }
            }
        }

        if safe.result_paths.is_empty() {
            out.push(Violation::warning(rule, "no safe space left on the panel").on(p.id));
            continue;
        }
        let free = p.edges.iter().filter(|e| !e.is_jointed() || e.extension > 0.0).count();
        if free == 1 && safe.result_paths.len() != 1 {
            #[allow(clippy::cast_precision_loss)]
            out.push(
                Violation::error(rule, "safe space is split into several regions")
                    .on(p.id)
                    .measured(safe.result_paths.len() as f64, 1.0),
            );
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::tree::{Cutout, CutoutShape, FaceId, MaterialConfig, PanelId, Scene};

    fn with_cutout(center: Point2, width: f64, height: f64) -> Vec<Violation> {
        let mut s = Scene::new();
        let id = s.create_assembly(200.0, 150.0, 100.0, MaterialConfig::default()).unwrap();
        s.edits_mut(PanelId::Face { assembly: id, face: FaceId::Front })
            .cutouts
            .push(Cutout {
                id: "c1".into(),
                shape: CutoutShape::Rect { center, width, height },
            });
        let cfg = KernelConfig::default();
        validity(&Snapshot::build(&s, &cfg).unwrap(), &cfg)
    }

    #[test]
    fn centred_cutout_is_fine() {
        assert!(with_cutout(Point2::new(0.0, 0.0), 40.0, 30.0).is_empty());
    }

    #[test]
    fn cutout_on_a_joint_is_rejected() {
        let v = with_cutout(Point2::new(0.0, 72.0), 40.0, 10.0);
        assert!(!v.is_empty());
        assert!(v.iter().all(|v| v.severity == crate::validation::Severity::Error));
    }
}
