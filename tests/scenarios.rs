//! End-to-end design scenarios driven through the engine.

#![allow(clippy::unwrap_used)]

use approx::assert_abs_diff_eq;
use tracing_subscriber::EnvFilter;

use boxcut::engine::ExtensionEdit;
use boxcut::geometry::{EdgeStatus, HoleId, PanelKind};
use boxcut::math::bounds::Bounds2;
use boxcut::math::Point2;
use boxcut::tree::{AssemblyId, Axis, Cutout, CutoutShape, EdgeSide, FaceId, MaterialConfig, PanelId};
use boxcut::{Action, DispatchOptions, Engine};

const TOL: f64 = 1e-9;

/// Routes kernel logs to the test output; `RUST_LOG=boxcut=debug` shows dispatches.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine_with_box(width: f64, height: f64, depth: f64) -> (Engine, AssemblyId) {
    init_tracing();
    let mut engine = Engine::new();
    let ok = engine.dispatch(
        Action::CreateAssembly {
            width,
            height,
            depth,
            material: MaterialConfig {
                thickness: 3.0,
                finger_width: 10.0,
                finger_gap: 1.5,
            },
        },
        DispatchOptions::default(),
    );
    assert!(ok, "box creation rejected");
    let id = engine.scene().root().unwrap();
    (engine, id)
}

fn face(assembly: AssemblyId, face: FaceId) -> PanelId {
    PanelId::Face { assembly, face }
}

#[test]
fn closed_box_has_six_faces_and_an_inset_void() {
    let (engine, id) = engine_with_box(200.0, 150.0, 100.0);
    let snap = engine.snapshot().unwrap();
    assert_eq!(snap.panels.len(), 6);
    assert!(snap.panels.iter().all(|p| matches!(p.kind, PanelKind::Face(_))));

    let root = engine.scene().assembly(id).unwrap().root_void;
    let b = engine.scene().void(root).unwrap().bounds;
    for (got, want) in [
        (b.x, 3.0),
        (b.y, 3.0),
        (b.z, 3.0),
        (b.w, 194.0),
        (b.h, 144.0),
        (b.d, 94.0),
    ] {
        assert_abs_diff_eq!(got, want, epsilon = TOL);
    }

    let report = engine.validate().unwrap();
    assert!(report.errors.is_empty(), "unexpected errors:\n{report}");
    assert!(report.valid);
}

#[test]
fn one_divider_slots_into_four_faces() {
    let (mut engine, id) = engine_with_box(200.0, 150.0, 100.0);
    let root = engine.scene().assembly(id).unwrap().root_void;
    assert!(engine.dispatch(
        Action::AddSubdivision {
            void: root,
            axis: Axis::X,
            positions: vec![100.0],
        },
        DispatchOptions::default(),
    ));

    let snap = engine.snapshot().unwrap();
    let dividers: Vec<_> = snap.panels.iter().filter(|p| p.is_divider()).collect();
    assert_eq!(dividers.len(), 1);
    let children = &engine.scene().void(root).unwrap().subdivision().unwrap().children;
    assert_eq!(children.len(), 2);

    for f in [FaceId::Front, FaceId::Back, FaceId::Top, FaceId::Bottom] {
        let panel = engine.panel(&face(id, f)).unwrap();
        let slots = panel
            .holes
            .iter()
            .filter(|h| matches!(h.id, HoleId::Slot(_)) && h.mate == Some(dividers[0].id))
            .count();
        assert!(slots >= 1, "{f:?} has no slot for the divider");
    }
    for f in [FaceId::Left, FaceId::Right] {
        assert!(engine.panel(&face(id, f)).unwrap().holes.is_empty());
    }

    let report = engine.validate().unwrap();
    assert!(report.errors.is_empty(), "unexpected errors:\n{report}");
}

#[test]
fn extension_is_set_not_accumulated() {
    let (mut engine, id) = engine_with_box(200.0, 150.0, 100.0);
    // With the bottom open the front's bottom edge is free to move.
    assert!(engine.dispatch(
        Action::ToggleFace {
            assembly: id,
            face: FaceId::Bottom,
        },
        DispatchOptions::default(),
    ));
    let front = face(id, FaceId::Front);
    for value in [10.0, 20.0] {
        assert!(engine.dispatch(
            Action::SetExtension {
                panel: front,
                side: EdgeSide::Bottom,
                value,
            },
            DispatchOptions::default(),
        ));
    }
    let stored = engine.scene().edits(&front).unwrap().extension(EdgeSide::Bottom);
    assert_abs_diff_eq!(stored, 20.0, epsilon = TOL);

    let panel = engine.panel(&front).unwrap();
    assert_eq!(panel.edge(EdgeSide::Bottom).status, EdgeStatus::Unlocked);
    let b = Bounds2::of(&panel.outline).unwrap();
    assert_abs_diff_eq!(b.min_y, -(panel.half_height() + 20.0), epsilon = TOL);

    let report = engine.validate().unwrap();
    assert!(report.errors.is_empty(), "unexpected errors:\n{report}");
    assert!(report.valid);
}

#[test]
fn fully_extended_female_panel_is_a_clean_rectangle() {
    let (mut engine, id) = engine_with_box(200.0, 150.0, 100.0);
    // The top lid joins every wall with tabs pointing in, so all four of its
    // edges are female.
    let top = face(id, FaceId::Top);
    let edits = EdgeSide::ALL
        .into_iter()
        .map(|side| ExtensionEdit {
            panel: top,
            side,
            value: 15.0,
        })
        .collect();
    assert!(engine.dispatch(Action::SetExtensions { edits }, DispatchOptions::default()));

    let panel = engine.panel(&top).unwrap();
    let (hw, hh) = (panel.half_width(), panel.half_height());
    let b = Bounds2::of(&panel.outline).unwrap();
    assert_abs_diff_eq!(b.min_x, -(hw + 15.0), epsilon = TOL);
    assert_abs_diff_eq!(b.max_x, hw + 15.0, epsilon = TOL);
    assert_abs_diff_eq!(b.min_y, -(hh + 15.0), epsilon = TOL);
    assert_abs_diff_eq!(b.max_y, hh + 15.0, epsilon = TOL);

    for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        let corner = Point2::new(sx * (hw + 15.0), sy * (hh + 15.0));
        let hits = panel.outline.iter().filter(|p| (*p - corner).norm() < 1e-6).count();
        assert_eq!(hits, 1, "corner {corner:?} appears {hits} times");
    }
    assert_eq!(panel.outline.len(), 4);
}

#[test]
fn cutout_adds_one_named_hole() {
    let (mut engine, id) = engine_with_box(100.0, 80.0, 60.0);
    let front = face(id, FaceId::Front);
    let before = engine.panel(&front).unwrap();
    assert!((before.width - 100.0).abs() < TOL);
    assert!((before.height - 80.0).abs() < TOL);

    // Local coordinates are centred: (50, 40) from the corner is the origin.
    assert!(engine.dispatch(
        Action::AddCutout {
            panel: front,
            cutout: Cutout {
                id: "c1".into(),
                shape: CutoutShape::Rect {
                    center: Point2::new(0.0, 0.0),
                    width: 20.0,
                    height: 10.0,
                },
            },
        },
        DispatchOptions::default(),
    ));
    let after = engine.panel(&front).unwrap();
    assert_eq!(after.holes.len(), before.holes.len() + 1);
    let hole = after.holes.last().unwrap();
    assert_eq!(hole.id, HoleId::Cutout("c1".into()));
}
