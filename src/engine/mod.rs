//! The mutation engine: dispatch, preview and cached projection.
//!
//! The engine owns the committed tree and an optional preview copy. Every
//! dispatch works on a clone of its target and swaps the clone in only when
//! the whole action succeeded, so a rejected action never leaves a trace.

pub mod action;
mod apply;
pub mod snapshot;

pub use action::{Action, AllCornerFilletEdit, CornerFilletEdit, EdgeOperationMode, ExtensionEdit};
pub use snapshot::Snapshot;

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::KernelConfig;
use crate::error::{ActionError, Result, TreeError};
use crate::geometry::panel::Panel;
use crate::operations::fillet::Corner;
use crate::operations::safe_space::{calculate_safe_space, SafeSpaceRegion};
use crate::tree::{PanelId, Scene};
use crate::validation::{RuleRegistry, ValidationReport};

/// Where a dispatch goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// `None` targets the preview when one exists, `Some(false)` always
    /// targets the committed tree, `Some(true)` requires a preview.
    pub preview: Option<bool>,
}

impl DispatchOptions {
    /// Forces the committed tree.
    #[must_use]
    pub fn main() -> Self {
        Self { preview: Some(false) }
    }

    /// Requires an active preview.
    #[must_use]
    pub fn preview() -> Self {
        Self { preview: Some(true) }
    }
}

/// Single-writer owner of the design state.
#[derive(Debug)]
pub struct Engine {
    main: Scene,
    preview: Option<Scene>,
    next_revision: u64,
    config: KernelConfig,
    cache: RefCell<Option<Rc<Snapshot>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with an empty design and default tunables.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(KernelConfig::default())
    }

    #[must_use]
    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            main: Scene::new(),
            preview: None,
            next_revision: 1,
            config,
            cache: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The tree reads go to: the preview if present, else the committed tree.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        self.preview.as_ref().unwrap_or(&self.main)
    }

    /// The committed tree, ignoring any preview.
    #[must_use]
    pub fn committed(&self) -> &Scene {
        &self.main
    }

    /// Applies `action` atomically.
    ///
    /// Returns `false` and leaves every tree untouched when the action is
    /// rejected. Rule violations do not reject an action; run
    /// [`Engine::validate`] for those.
    #[instrument(skip_all, fields(action = action.name()))]
    pub fn dispatch(&mut self, action: Action, options: DispatchOptions) -> bool {
        match self.try_dispatch(&action, options) {
            Ok(revision) => {
                debug!(revision, "action accepted");
                true
            }
            Err(err) => {
                debug!(%err, "action rejected");
                false
            }
        }
    }

    fn try_dispatch(&mut self, action: &Action, options: DispatchOptions) -> Result<u64> {
        let to_preview = match options.preview {
            None => self.preview.is_some(),
            Some(false) => false,
            Some(true) if self.preview.is_some() => true,
            Some(true) => return Err(ActionError::NoPreview.into()),
        };
        let target = if to_preview {
            self.preview.as_ref().ok_or(ActionError::NoPreview)?
        } else {
            &self.main
        };
        let snapshot = if action.needs_snapshot() {
            Some(self.snapshot_of(target)?)
        } else {
            None
        };
        let mut candidate = target.clone();
        apply::apply(&mut candidate, action, snapshot.as_deref())?;

        let revision = self.next_revision;
        self.next_revision += 1;
        candidate.revision = revision;
        if to_preview {
            self.preview = Some(candidate);
        } else {
            self.main = candidate;
        }
        Ok(revision)
    }

    /// Starts a preview as a copy of the committed tree, replacing any
    /// preview already running.
    pub fn start_preview(&mut self) {
        if self.preview.is_some() {
            debug!("preview restarted");
        }
        self.preview = Some(self.main.clone());
    }

    /// Makes the preview the committed tree. Returns `false` without a preview.
    pub fn commit_preview(&mut self) -> bool {
        match self.preview.take() {
            Some(preview) => {
                debug!(revision = preview.revision(), "preview committed");
                self.main = preview;
                true
            }
            None => false,
        }
    }

    /// Drops the preview, if any.
    pub fn discard_preview(&mut self) {
        if self.preview.take().is_some() {
            debug!("preview discarded");
        }
    }

    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// Projection of the tree reads go to, cached per revision.
    ///
    /// # Errors
    ///
    /// Fails only for a corrupted tree.
    pub fn snapshot(&self) -> Result<Rc<Snapshot>> {
        self.snapshot_of(self.scene())
    }

    fn snapshot_of(&self, scene: &Scene) -> Result<Rc<Snapshot>> {
        if let Some(snap) = self.cache.borrow().as_ref() {
            if snap.revision == scene.revision() {
                return Ok(Rc::clone(snap));
            }
        }
        let snap = Rc::new(Snapshot::build(scene, &self.config)?);
        *self.cache.borrow_mut() = Some(Rc::clone(&snap));
        Ok(snap)
    }

    /// One projected panel.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PanelNotFound`] for panels that are not cut
    /// (unknown, or an open face).
    pub fn panel(&self, id: &PanelId) -> Result<Panel> {
        self.snapshot()?
            .panel(id)
            .cloned()
            .ok_or_else(|| TreeError::PanelNotFound(id.to_string()).into())
    }

    /// Safe editing region of one panel.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PanelNotFound`] for unknown panels.
    pub fn safe_space(&self, id: &PanelId) -> Result<SafeSpaceRegion> {
        Ok(calculate_safe_space(&self.panel(id)?))
    }

    /// Detected corners of one panel, before fillets.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PanelNotFound`] for unknown panels.
    pub fn corners(&self, id: &PanelId) -> Result<Vec<Corner>> {
        Ok(self.panel(id)?.corners)
    }

    /// Runs every built-in rule against the current snapshot.
    ///
    /// # Errors
    ///
    /// Fails only for a corrupted tree.
    pub fn validate(&self) -> Result<ValidationReport> {
        self.validate_with(&RuleRegistry::default())
    }

    /// Runs the rules of `registry` against the current snapshot.
    ///
    /// # Errors
    ///
    /// Fails only for a corrupted tree.
    pub fn validate_with(&self, registry: &RuleRegistry) -> Result<ValidationReport> {
        let snap = self.snapshot()?;
        Ok(registry.check(&snap, &self.config))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tree::{EdgeSide, FaceId, MaterialConfig};

    fn create() -> Action {
        Action::CreateAssembly {
            width: 200.0,
            height: 150.0,
            depth: 100.0,
            material: MaterialConfig::default(),
        }
    }

    #[test]
    fn rejected_action_leaves_tree_alone() {
        let mut engine = Engine::new();
        assert!(engine.dispatch(create(), DispatchOptions::default()));
        let before = engine.committed().revision();
        let bad = Action::ResizeAssembly {
            assembly: engine.committed().root().unwrap(),
            width: 2.0,
            height: 150.0,
            depth: 100.0,
        };
        assert!(!engine.dispatch(bad, DispatchOptions::default()));
        assert_eq!(engine.committed().revision(), before);
        let width = engine.committed().assembly(engine.committed().root().unwrap()).unwrap().width;
        assert!((width - 200.0).abs() < 1e-12);
    }

    #[test]
    fn preview_is_isolated_until_commit() {
        let mut engine = Engine::new();
        engine.dispatch(create(), DispatchOptions::default());
        let id = engine.committed().root().unwrap();
        assert!(!engine.dispatch(
            Action::ToggleFace { assembly: id, face: FaceId::Top },
            DispatchOptions::preview()
        ));

        engine.start_preview();
        let front = PanelId::Face { assembly: id, face: FaceId::Front };
        assert!(engine.dispatch(
            Action::SetExtension {
                panel: front,
                side: EdgeSide::Bottom,
                value: 10.0
            },
            DispatchOptions::default()
        ));
        assert!(engine.committed().edits(&front).is_none());
        assert!(engine.scene().edits(&front).is_some());

        engine.discard_preview();
        assert!(engine.scene().edits(&front).is_none());
        assert!(!engine.commit_preview());
    }

    #[test]
    fn snapshot_is_cached_per_revision() {
        let mut engine = Engine::new();
        engine.dispatch(create(), DispatchOptions::default());
        let a = engine.snapshot().unwrap();
        let b = engine.snapshot().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.panels.len(), 6);
    }

    #[test]
    fn validate_runs_on_the_cached_snapshot() {
        let mut engine = Engine::new();
        engine.dispatch(create(), DispatchOptions::default());
        let report = engine.validate().unwrap();
        assert!(report.valid, "{report}");
        let registry = RuleRegistry::default();
        assert_eq!(engine.validate_with(&registry).unwrap().valid, report.valid);
    }
}
