use std::collections::{BTreeMap, HashSet};

use tracing::debug_span;

use crate::config::AssemblyOptions;
use crate::error::{Result, TopologyError};
use crate::math::{BoundingBox3, Rotation, Vector2, Vector3};

use super::document::PatternDocument;
use super::interface::Interface;
use super::stitch::Stitches;
use super::{PanelId, PatternStore};

/// A direct child of a [`Component`].
#[derive(Debug, Clone)]
pub enum SubElement {
    Panel(PanelId),
    Component(Component),
}

/// A named group of panels and nested components, with the stitches that
/// join them and the interfaces it exposes to its parent.
#[derive(Debug, Clone, Default)]
pub struct Component {
    name: String,
    subs: Vec<SubElement>,
    interfaces: BTreeMap<String, Interface>,
    stitches: Stitches,
}

impl Component {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_panel(&mut self, panel: PanelId) -> &mut Self {
        self.subs.push(SubElement::Panel(panel));
        self
    }

    pub fn add_component(&mut self, component: Component) -> &mut Self {
        self.subs.push(SubElement::Component(component));
        self
    }

    #[must_use]
    pub fn subs(&self) -> &[SubElement] {
        &self.subs
    }

    /// All panels of the subtree in declaration order.
    #[must_use]
    pub fn panel_ids(&self) -> Vec<PanelId> {
        let mut ids = Vec::new();
        self.collect_panels(&mut ids);
        ids
    }

    fn collect_panels(&self, ids: &mut Vec<PanelId>) {
        for sub in &self.subs {
            match sub {
                SubElement::Panel(id) => ids.push(*id),
                SubElement::Component(c) => c.collect_panels(ids),
            }
        }
    }

    // --- Interfaces & stitches ---

    /// Exposes an interface under `name`.
    pub fn set_interface(&mut self, name: impl Into<String>, interface: Interface) -> &mut Self {
        self.interfaces.insert(name.into(), interface);
        self
    }

    /// # Errors
    ///
    /// Returns an error if no interface is exposed under `name`.
    pub fn interface(&self, name: &str) -> Result<&Interface> {
        self.interfaces
            .get(name)
            .ok_or_else(|| TopologyError::InterfaceNotFound(format!("{}.{name}", self.name)).into())
    }

    #[must_use]
    pub fn interfaces(&self) -> &BTreeMap<String, Interface> {
        &self.interfaces
    }

    /// Sews `left` to `right` when the component is assembled.
    pub fn connect(&mut self, left: Interface, right: Interface) -> &mut Self {
        self.stitches.connect(left, right);
        self
    }

    /// Sews `left` to `right`, splitting a lone edge on one side to match a
    /// multi-edge side.
    ///
    /// # Errors
    ///
    /// Returns an error if an interface cannot be resolved or the split fails.
    pub fn connect_matching(
        &mut self,
        store: &mut PatternStore,
        left: Interface,
        right: Interface,
    ) -> Result<&mut Self> {
        self.stitches.connect_matching(store, left, right)?;
        Ok(self)
    }

    #[must_use]
    pub fn stitches(&self) -> &Stitches {
        &self.stitches
    }

    pub fn stitches_mut(&mut self) -> &mut Stitches {
        &mut self.stitches
    }

    // --- Placement ---

    /// Translates every panel of the subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store.
    pub fn translate_by(&self, store: &mut PatternStore, delta: &Vector3) -> Result<()> {
        for id in self.panel_ids() {
            store.panel_mut(id)?.translate_by(delta);
        }
        Ok(())
    }

    /// Rotates every panel of the subtree by `delta`.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store.
    pub fn rotate_by(&self, store: &mut PatternStore, delta: &Rotation) -> Result<()> {
        for id in self.panel_ids() {
            store.panel_mut(id)?.rotate_by(delta);
        }
        Ok(())
    }

    /// Mirrors every panel of the subtree. Interfaces and stitches declared
    /// on the way keep their traversal direction on the mirrored loops.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store.
    pub fn mirror(&mut self, store: &mut PatternStore, axis: &Vector2) -> Result<()> {
        for sub in &mut self.subs {
            match sub {
                SubElement::Panel(id) => {
                    store.panel_mut(*id)?.mirror(axis);
                }
                SubElement::Component(c) => c.mirror(store, axis)?,
            }
        }
        let owned: HashSet<PanelId> = self.panel_ids().into_iter().collect();
        let filter = |id: PanelId| owned.contains(&id);
        for interface in self.interfaces.values_mut() {
            interface.flip_where(filter);
        }
        self.stitches.flip_where(filter);
        Ok(())
    }

    /// 3D bounding box of all panels, `None` for a component without geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store.
    pub fn bbox3d(&self, store: &PatternStore) -> Result<Option<BoundingBox3>> {
        let mut bbox: Option<BoundingBox3> = None;
        for id in self.panel_ids() {
            if let Some(b) = store.panel(id)?.bbox3d() {
                bbox = Some(bbox.map_or(b, |acc| acc.union(&b)));
            }
        }
        Ok(bbox)
    }

    /// Moves the component down so that its top lies `gap` below `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store.
    pub fn place_below(&self, store: &mut PatternStore, other: &BoundingBox3, gap: f64) -> Result<()> {
        if let Some(current) = self.bbox3d(store)? {
            let shift = other.min.y - current.max.y - gap;
            self.translate_by(store, &Vector3::new(0.0, shift, 0.0))?;
        }
        Ok(())
    }

    // --- Assembly ---

    /// Assembles with default options.
    ///
    /// # Errors
    ///
    /// See [`assembly_with`](Self::assembly_with).
    pub fn assembly(&self, store: &PatternStore) -> Result<PatternDocument> {
        self.assembly_with(store, &AssemblyOptions::default())
    }

    /// Merges the subtree into one pattern document.
    ///
    /// Sub-elements are assembled in declaration order, then the component's
    /// own stitches are resolved and appended.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel fails validation, two panels share a name,
    /// or a stitch cannot be resolved. An empty component assembles into an
    /// empty document.
    pub fn assembly_with(&self, store: &PatternStore, options: &AssemblyOptions) -> Result<PatternDocument> {
        let span = debug_span!("assembly", component = %self.name);
        let _enter = span.enter();

        let mut doc = PatternDocument::new(self.name.clone());
        for sub in &self.subs {
            let sub_doc = match sub {
                SubElement::Panel(id) => store.panel(*id)?.assembly_with(store, options)?,
                SubElement::Component(c) => c.assembly_with(store, options)?,
            };
            doc.merge(sub_doc)?;
        }
        doc.stitches.extend(self.stitches.resolve(store, options)?);
        doc.check_stitches()?;
        Ok(doc)
    }
}
