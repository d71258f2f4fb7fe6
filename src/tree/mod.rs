pub mod assembly;
pub mod edits;
pub mod types;
pub mod void;

pub use assembly::{AssemblyData, AssemblyId};
pub use edits::{
    check_user_polygon, ContourRef, CornerId, Cutout, CutoutShape, EdgeSide, PanelCorner, PanelEdits, PanelId,
    MAX_CIRCLE_SEGMENTS,
};
pub use types::{Axis, FaceId, FeetConfig, LidConfig, LidSide, MaterialConfig, TabDirection, VoidBounds};
pub use void::{Split, Subdivision, VoidContent, VoidData, VoidId};

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::error::{invalid, Result, TreeError};
use crate::math::Point3;

/// Smallest extent a void or compartment may have, in mm.
pub const MIN_VOID_EXTENT: f64 = 1.0;

/// Narrowest finger a material may ask for, in mm.
pub const MIN_FINGER_WIDTH: f64 = 1.0;

/// The authoritative design state.
///
/// Assemblies and voids live in arenas and reference each other through
/// typed keys. Panels are never stored; user edits to panels are kept in
/// `edits`, keyed by the panel they apply to.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    assemblies: SlotMap<AssemblyId, AssemblyData>,
    voids: SlotMap<VoidId, VoidData>,
    root: Option<AssemblyId>,
    edits: BTreeMap<PanelId, PanelEdits>,
    pub(crate) revision: u64,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(&self) -> Option<AssemblyId> {
        self.root
    }

    /// Revision stamp assigned by the engine on every accepted mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // --- Lookups ---

    /// Returns the assembly data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AssemblyNotFound`].
    pub fn assembly(&self, id: AssemblyId) -> Result<&AssemblyData> {
        Ok(self.assemblies.get(id).ok_or(TreeError::AssemblyNotFound)?)
    }

    fn assembly_mut(&mut self, id: AssemblyId) -> Result<&mut AssemblyData> {
        Ok(self.assemblies.get_mut(id).ok_or(TreeError::AssemblyNotFound)?)
    }

    /// Returns the void data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::VoidNotFound`].
    pub fn void(&self, id: VoidId) -> Result<&VoidData> {
        Ok(self.voids.get(id).ok_or(TreeError::VoidNotFound)?)
    }

    fn void_mut(&mut self, id: VoidId) -> Result<&mut VoidData> {
        Ok(self.voids.get_mut(id).ok_or(TreeError::VoidNotFound)?)
    }

    pub fn assemblies(&self) -> impl Iterator<Item = (AssemblyId, &AssemblyData)> {
        self.assemblies.iter()
    }

    pub fn voids(&self) -> impl Iterator<Item = (VoidId, &VoidData)> {
        self.voids.iter()
    }

    #[must_use]
    pub fn edits(&self, panel: &PanelId) -> Option<&PanelEdits> {
        self.edits.get(panel)
    }

    /// Edits of `panel`, created empty on first use.
    pub fn edits_mut(&mut self, panel: PanelId) -> &mut PanelEdits {
        self.edits.entry(panel).or_default()
    }

    /// Assemblies in depth-first order starting at the root.
    #[must_use]
    pub fn assembly_order(&self) -> Vec<AssemblyId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_assemblies(root, &mut out);
        }
        out
    }

    fn collect_assemblies(&self, id: AssemblyId, out: &mut Vec<AssemblyId>) {
        out.push(id);
        if let Some(a) = self.assemblies.get(id) {
            for void in self.void_order(a.root_void) {
                if let Some(VoidContent::SubAssembly(sub)) = self.voids.get(void).map(|v| &v.content) {
                    self.collect_assemblies(*sub, out);
                }
            }
        }
    }

    /// `void` and its descendants (not crossing into sub-assemblies), depth first.
    #[must_use]
    pub fn void_order(&self, void: VoidId) -> Vec<VoidId> {
        let mut out = Vec::new();
        let mut stack = vec![void];
        while let Some(v) = stack.pop() {
            let Some(data) = self.voids.get(v) else {
                continue;
            };
            out.push(v);
            if let VoidContent::Subdivided(sub) = &data.content {
                stack.extend(sub.children.iter().rev());
            }
        }
        out
    }

    /// Whether `panel` currently exists as a node-backed panel.
    #[must_use]
    pub fn panel_exists(&self, panel: &PanelId) -> bool {
        match panel {
            PanelId::Face { assembly, .. } => self.assemblies.contains_key(*assembly),
            PanelId::Divider { void, axis, index } => self
                .voids
                .get(*void)
                .and_then(VoidData::subdivision)
                .is_some_and(|sub| {
                    sub.splits
                        .iter()
                        .any(|s| s.axis == *axis && *index < s.positions.len())
                }),
        }
    }

    // --- Assemblies ---

    /// Replaces the whole scene with a single root assembly.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid material or a box too small to hold
    /// its own walls.
    pub fn create_assembly(&mut self, width: f64, height: f64, depth: f64, material: MaterialConfig) -> Result<AssemblyId> {
        validate_material(&material)?;
        let mut fresh = Scene {
            revision: self.revision,
            ..Scene::default()
        };
        let id = fresh.insert_assembly(Point3::origin(), [width, height, depth], material, None, 0.0)?;
        fresh.root = Some(id);
        *self = fresh;
        Ok(id)
    }

    fn insert_assembly(
        &mut self,
        origin: Point3,
        dims: [f64; 3],
        material: MaterialConfig,
        parent_void: Option<VoidId>,
        clearance: f64,
    ) -> Result<AssemblyId> {
        check_dimensions(dims, material.thickness)?;
        let placeholder = AssemblyData {
            width: dims[0],
            height: dims[1],
            depth: dims[2],
            origin,
            material,
            solid: [true; 6],
            axis: Axis::Y,
            lids: [LidConfig::default(); 2],
            feet: None,
            root_void: VoidId::default(),
            parent_void,
            clearance,
        };
        let bounds = placeholder.interior_bounds();
        let id = self.assemblies.insert(placeholder);
        let root_void = self.voids.insert(VoidData::new(bounds, id, None));
        self.assembly_mut(id)?.root_void = root_void;
        Ok(id)
    }

    /// Resizes the root assembly, rescaling subdivisions and refitting sub-assemblies.
    ///
    /// # Errors
    ///
    /// Fails for sub-assemblies (they follow their void) or when the new size
    /// leaves a compartment without room.
    pub fn resize_assembly(&mut self, id: AssemblyId, width: f64, height: f64, depth: f64) -> Result<()> {
        let a = self.assembly_mut(id)?;
        if a.parent_void.is_some() {
            return Err(invalid("sub-assemblies are sized by their void"));
        }
        a.width = width;
        a.height = height;
        a.depth = depth;
        self.refit_assembly(id)
    }

    /// Sets the material of an assembly and every nested sub-assembly.
    ///
    /// # Errors
    ///
    /// Rejects invalid materials and thicknesses the layout cannot hold.
    pub fn set_material(&mut self, id: AssemblyId, material: MaterialConfig) -> Result<()> {
        validate_material(&material)?;
        self.assembly(id)?;
        let nested: Vec<AssemblyId> = {
            let mut out = Vec::new();
            self.collect_assemblies(id, &mut out);
            out
        };
        for a in nested {
            self.assembly_mut(a)?.material = material;
        }
        self.refit_assembly(id)
    }

    /// Flips a face between solid and open.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::AssemblyNotFound`].
    pub fn toggle_face(&mut self, id: AssemblyId, face: FaceId) -> Result<()> {
        let a = self.assembly_mut(id)?;
        a.solid[face.index()] = !a.solid[face.index()];
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`TreeError::AssemblyNotFound`].
    pub fn set_axis(&mut self, id: AssemblyId, axis: Axis) -> Result<()> {
        self.assembly_mut(id)?.axis = axis;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`TreeError::AssemblyNotFound`].
    pub fn set_lid(&mut self, id: AssemblyId, side: LidSide, config: LidConfig) -> Result<()> {
        self.assembly_mut(id)?.lids[side.index()] = config;
        Ok(())
    }

    /// Sets or clears the feet of an assembly.
    ///
    /// # Errors
    ///
    /// Rejects non-positive height or width, a negative inset, or feet that
    /// do not fit on the shortest wall.
    pub fn set_feet(&mut self, id: AssemblyId, feet: Option<FeetConfig>) -> Result<()> {
        let a = self.assembly_mut(id)?;
        if let Some(f) = &feet {
            if !(f.height > 0.0 && f.width > 0.0 && f.inset >= 0.0) {
                return Err(invalid("feet need positive height and width"));
            }
            let shortest = [a.width, a.height, a.depth]
                .into_iter()
                .enumerate()
                .filter(|(i, _)| *i != a.axis.index())
                .map(|(_, v)| v)
                .fold(f64::INFINITY, f64::min);
            if 2.0 * (f.inset + f.width) > shortest {
                return Err(invalid("feet do not fit on the walls"));
            }
        }
        a.feet = feet;
        Ok(())
    }

    fn refit_assembly(&mut self, id: AssemblyId) -> Result<()> {
        let a = self.assembly(id)?;
        check_dimensions([a.width, a.height, a.depth], a.material.thickness)?;
        let (root_void, interior) = (a.root_void, a.interior_bounds());
        self.refit_void(root_void, interior)
    }

    fn refit_void(&mut self, id: VoidId, bounds: VoidBounds) -> Result<()> {
        let data = self.void(id)?;
        let old = data.bounds;
        let content = data.content.clone();
        let mt = self.assembly(data.assembly)?.material.thickness;
        self.void_mut(id)?.bounds = bounds;
        match content {
            VoidContent::Leaf => Ok(()),
            VoidContent::Subdivided(mut sub) => {
                for split in &mut sub.splits {
                    split.positions = void::rescale_positions(
                        &split.positions,
                        old.min(split.axis),
                        old.extent(split.axis),
                        bounds.min(split.axis),
                        bounds.extent(split.axis),
                    );
                }
                let cells = void::child_bounds(&bounds, &sub.splits, mt, MIN_VOID_EXTENT)?;
                for (child, cell) in sub.children.iter().zip(cells) {
                    self.refit_void(*child, cell)?;
                }
                self.void_mut(id)?.content = VoidContent::Subdivided(sub);
                Ok(())
            }
            VoidContent::SubAssembly(sub) => self.fit_sub_assembly(sub, &bounds),
        }
    }

    fn fit_sub_assembly(&mut self, id: AssemblyId, bounds: &VoidBounds) -> Result<()> {
        let a = self.assembly_mut(id)?;
        let c = a.clearance;
        a.origin = Point3::new(bounds.x + c, bounds.y + c, bounds.z + c);
        a.width = bounds.w - 2.0 * c;
        a.height = bounds.h - 2.0 * c;
        a.depth = bounds.d - 2.0 * c;
        self.refit_assembly(id)
    }

    // --- Subdivisions ---

    /// Splits a leaf void with one split (parallel dividers) or two splits on
    /// different axes (grid).
    ///
    /// # Errors
    ///
    /// Fails when the void is not a leaf, the split set is malformed, or a
    /// compartment would have no room.
    pub fn add_subdivision(&mut self, id: VoidId, mut splits: Vec<Split>) -> Result<Vec<VoidId>> {
        let data = self.void(id)?;
        if !data.is_leaf() {
            return Err(TreeError::NotALeaf.into());
        }
        if splits.is_empty() || splits.len() > 2 {
            return Err(invalid("a subdivision needs one or two splits"));
        }
        if splits.len() == 2 && splits[0].axis == splits[1].axis {
            return Err(invalid("grid splits must use different axes"));
        }
        for split in &mut splits {
            if split.positions.is_empty() {
                return Err(invalid("a split needs at least one position"));
            }
            split.positions.sort_by(f64::total_cmp);
        }
        let (bounds, assembly) = (data.bounds, data.assembly);
        let mt = self.assembly(assembly)?.material.thickness;
        let cells = void::child_bounds(&bounds, &splits, mt, MIN_VOID_EXTENT)?;
        let children: Vec<VoidId> = cells
            .into_iter()
            .map(|cell| self.voids.insert(VoidData::new(cell, assembly, Some(id))))
            .collect();
        self.void_mut(id)?.content = VoidContent::Subdivided(Subdivision {
            splits,
            children: children.clone(),
        });
        Ok(children)
    }

    /// Merges the children of a subdivided void back into a leaf.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotSubdivided`] when the void has no subdivision.
    pub fn remove_subdivision(&mut self, id: VoidId) -> Result<()> {
        let Some(sub) = self.void(id)?.subdivision().cloned() else {
            return Err(TreeError::NotSubdivided.into());
        };
        for child in sub.children {
            self.remove_void_tree(child);
        }
        self.void_mut(id)?.content = VoidContent::Leaf;
        self.purge_edits();
        Ok(())
    }

    fn remove_void_tree(&mut self, id: VoidId) {
        let Some(data) = self.voids.remove(id) else {
            return;
        };
        match data.content {
            VoidContent::Leaf => {}
            VoidContent::Subdivided(sub) => {
                for child in sub.children {
                    self.remove_void_tree(child);
                }
            }
            VoidContent::SubAssembly(a) => self.remove_assembly_tree(a),
        }
    }

    fn remove_assembly_tree(&mut self, id: AssemblyId) {
        if let Some(a) = self.assemblies.remove(id) {
            self.remove_void_tree(a.root_void);
        }
    }

    // --- Sub-assemblies ---

    /// Places a nested assembly in a leaf void, `clearance` mm from each side.
    ///
    /// # Errors
    ///
    /// Fails when the void is not a leaf or too small for the clearance and walls.
    pub fn create_sub_assembly(&mut self, void: VoidId, clearance: f64) -> Result<AssemblyId> {
        let data = self.void(void)?;
        if !data.is_leaf() {
            return Err(TreeError::NotALeaf.into());
        }
        if !(clearance >= 0.0) {
            return Err(invalid("clearance must be non-negative"));
        }
        let b = data.bounds;
        let parent = self.assembly(data.assembly)?;
        let (material, axis) = (parent.material, parent.axis);
        let id = self.insert_assembly(
            Point3::new(b.x + clearance, b.y + clearance, b.z + clearance),
            [b.w - 2.0 * clearance, b.h - 2.0 * clearance, b.d - 2.0 * clearance],
            material,
            Some(void),
            clearance,
        )?;
        self.assembly_mut(id)?.axis = axis;
        self.void_mut(void)?.content = VoidContent::SubAssembly(id);
        Ok(id)
    }

    /// Removes a sub-assembly, leaving its void a leaf again.
    ///
    /// # Errors
    ///
    /// Fails for the root assembly.
    pub fn remove_sub_assembly(&mut self, id: AssemblyId) -> Result<()> {
        let Some(parent) = self.assembly(id)?.parent_void else {
            return Err(invalid("the root assembly cannot be removed"));
        };
        self.remove_assembly_tree(id);
        self.void_mut(parent)?.content = VoidContent::Leaf;
        self.purge_edits();
        Ok(())
    }

    /// Drops edits whose panel no longer exists.
    fn purge_edits(&mut self) {
        let live: Vec<PanelId> = self
            .edits
            .keys()
            .filter(|p| self.panel_exists(p))
            .copied()
            .collect();
        self.edits.retain(|p, _| live.contains(p));
    }
}

fn validate_material(m: &MaterialConfig) -> Result<()> {
    let finite = m.thickness.is_finite() && m.finger_width.is_finite() && m.finger_gap.is_finite();
    if !(finite && m.thickness > 0.0 && m.finger_width >= MIN_FINGER_WIDTH && m.finger_gap >= 0.0) {
        return Err(invalid(format!(
            "material needs positive thickness and fingers of at least {MIN_FINGER_WIDTH} mm, got {m:?}"
        )));
    }
    Ok(())
}

fn check_dimensions(dims: [f64; 3], mt: f64) -> Result<()> {
    if dims.iter().any(|d| !d.is_finite() || *d < 2.0 * mt + MIN_VOID_EXTENT) {
        return Err(invalid(format!(
            "dimensions {dims:?} cannot hold {mt} mm walls"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scene() -> (Scene, AssemblyId) {
        let mut s = Scene::new();
        let id = s
            .create_assembly(200.0, 150.0, 100.0, MaterialConfig::default())
            .unwrap();
        (s, id)
    }

    fn root_void(s: &Scene, id: AssemblyId) -> VoidId {
        s.assembly(id).unwrap().root_void
    }

    #[test]
    fn root_void_is_inset_by_thickness() {
        let (s, id) = scene();
        let b = s.void(root_void(&s, id)).unwrap().bounds;
        assert_eq!(
            b,
            VoidBounds {
                x: 3.0,
                y: 3.0,
                z: 3.0,
                w: 194.0,
                h: 144.0,
                d: 94.0
            }
        );
    }

    #[test]
    fn subdividing_twice_fails() {
        let (mut s, id) = scene();
        let rv = root_void(&s, id);
        let split = Split {
            axis: Axis::X,
            positions: vec![100.0],
        };
        let children = s.add_subdivision(rv, vec![split.clone()]).unwrap();
        assert_eq!(children.len(), 2);
        assert!(s.add_subdivision(rv, vec![split]).is_err());
    }

    #[test]
    fn remove_subdivision_drops_children_and_edits() {
        let (mut s, id) = scene();
        let rv = root_void(&s, id);
        let children = s
            .add_subdivision(
                rv,
                vec![Split {
                    axis: Axis::X,
                    positions: vec![100.0],
                }],
            )
            .unwrap();
        let divider = PanelId::Divider {
            void: rv,
            axis: Axis::X,
            index: 0,
        };
        s.edits_mut(divider).extensions.insert(EdgeSide::Top, 5.0);
        s.remove_subdivision(rv).unwrap();
        assert!(s.void(children[0]).is_err());
        assert!(s.edits(&divider).is_none());
        assert!(s.void(rv).unwrap().is_leaf());
    }

    #[test]
    fn resize_rescales_positions() {
        let (mut s, id) = scene();
        let rv = root_void(&s, id);
        s.add_subdivision(
            rv,
            vec![Split {
                axis: Axis::X,
                positions: vec![100.0],
            }],
        )
        .unwrap();
        s.resize_assembly(id, 400.0, 150.0, 100.0).unwrap();
        let sub = s.void(rv).unwrap().subdivision().unwrap().clone();
        // 97 mm into a 194 mm void becomes 197 mm into a 394 mm void.
        assert!((sub.splits[0].positions[0] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn sub_assembly_follows_its_void() {
        let (mut s, id) = scene();
        let rv = root_void(&s, id);
        let sub = s.create_sub_assembly(rv, 2.0).unwrap();
        let a = s.assembly(sub).unwrap();
        assert!((a.width - 190.0).abs() < 1e-9);
        assert!((a.origin.x - 5.0).abs() < 1e-9);
        s.resize_assembly(id, 300.0, 150.0, 100.0).unwrap();
        assert!((s.assembly(sub).unwrap().width - 290.0).abs() < 1e-9);
        assert!(s.resize_assembly(sub, 10.0, 10.0, 10.0).is_err());
        assert_eq!(s.assembly_order().len(), 2);
        s.remove_sub_assembly(sub).unwrap();
        assert!(s.void(rv).unwrap().is_leaf());
    }

    #[test]
    fn too_thick_material_is_rejected() {
        let (mut s, id) = scene();
        let m = MaterialConfig {
            thickness: 80.0,
            ..MaterialConfig::default()
        };
        assert!(s.set_material(id, m).is_err());
    }

    #[test]
    fn hairline_fingers_are_rejected() {
        let (mut s, id) = scene();
        for finger_width in [1e-4, 0.5, f64::NAN, f64::INFINITY] {
            let m = MaterialConfig {
                finger_width,
                ..MaterialConfig::default()
            };
            assert!(s.set_material(id, m).is_err(), "accepted finger width {finger_width}");
            assert!(Scene::new().create_assembly(200.0, 150.0, 100.0, m).is_err());
        }
        let gap = MaterialConfig {
            finger_gap: f64::NAN,
            ..MaterialConfig::default()
        };
        assert!(s.set_material(id, gap).is_err());
    }
}
