use std::collections::BTreeMap;

use tracing::instrument;

use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::panel::Panel;
use crate::operations::projection::project;
use crate::tree::{AssemblyId, PanelId, Scene};

/// Read-only view of the design at one revision.
///
/// Holds a copy of the tree it was derived from so validators and callers
/// never observe a later mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub revision: u64,
    pub scene: Scene,
    pub panels: Vec<Panel>,
    /// Owning assembly of every panel.
    pub owners: BTreeMap<PanelId, AssemblyId>,
    index: BTreeMap<PanelId, usize>,
}

impl Snapshot {
    /// Projects `scene` into a snapshot.
    ///
    /// # Errors
    ///
    /// Propagates projection failures (corrupted tree only).
    #[instrument(skip_all, fields(revision = scene.revision()))]
    pub fn build(scene: &Scene, config: &KernelConfig) -> Result<Self> {
        let panels = project(scene, config)?;
        let index = panels.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let owners = panels.iter().map(|p| (p.id, p.owner)).collect();
        Ok(Self {
            revision: scene.revision(),
            scene: scene.clone(),
            panels,
            owners,
            index,
        })
    }

    #[must_use]
    pub fn panel(&self, id: &PanelId) -> Option<&Panel> {
        self.index.get(id).map(|&i| &self.panels[i])
    }

    #[must_use]
    pub fn owner(&self, id: &PanelId) -> Option<AssemblyId> {
        self.owners.get(id).copied()
    }

    /// Panels owned by `assembly`, in projection order.
    pub fn assembly_panels(&self, assembly: AssemblyId) -> impl Iterator<Item = &Panel> {
        self.panels.iter().filter(move |p| p.owner == assembly)
    }
}
