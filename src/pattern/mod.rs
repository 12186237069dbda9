pub mod component;
pub mod document;
pub mod interface;
pub mod panel;
pub mod stitch;

pub use component::{Component, SubElement};
pub use document::{CurvatureRecord, EdgeRecord, PanelRecord, PatternDocument, StitchEnd};
pub use interface::{Interface, InterfaceInstance, ResolvedEdge};
pub use panel::Panel;
pub use stitch::{Stitches, StitchingRule};

use crate::error::TopologyError;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Unique identifier for a panel in the pattern store.
    pub struct PanelId;
}

/// Stable handle of one edge in the loop of a panel.
///
/// Keys are local to a panel and its duplicates. The loop index an edge
/// ends up at in the pattern document is its geometric id, which
/// [`Panel::geometric_ids`] derives from the key at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(u32);

/// Arena that owns every panel of a garment.
///
/// Components, interfaces and stitches refer to panels through [`PanelId`]
/// handles, so panels can be re-posed or duplicated without invalidating them.
#[derive(Debug, Default)]
pub struct PatternStore {
    panels: SlotMap<PanelId, Panel>,
}

impl PatternStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a panel and returns its ID.
    pub fn add_panel(&mut self, panel: Panel) -> PanelId {
        self.panels.insert(panel)
    }

    /// Returns a reference to the panel, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel is not in the store.
    pub fn panel(&self, id: PanelId) -> Result<&Panel, TopologyError> {
        self.panels.get(id).ok_or(TopologyError::PanelNotFound)
    }

    /// Returns a mutable reference to the panel, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel is not in the store.
    pub fn panel_mut(&mut self, id: PanelId) -> Result<&mut Panel, TopologyError> {
        self.panels.get_mut(id).ok_or(TopologyError::PanelNotFound)
    }

    /// Removes a panel from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel is not in the store.
    pub fn remove_panel(&mut self, id: PanelId) -> Result<Panel, TopologyError> {
        self.panels.remove(id).ok_or(TopologyError::PanelNotFound)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelId, &Panel)> {
        self.panels.iter()
    }

    /// Copy of a named interface of a panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or the interface does not exist.
    pub fn interface(&self, id: PanelId, name: &str) -> crate::error::Result<Interface> {
        Ok(self.panel(id)?.interface(name)?.clone())
    }

    /// Inserts a deep copy of a panel under a new name.
    ///
    /// Interfaces and internal stitches of the copy refer to the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel is not in the store.
    pub fn duplicate_panel(&mut self, id: PanelId, name: impl Into<String>) -> crate::error::Result<PanelId> {
        let mut copy = self.panel(id)?.clone();
        copy.rename(name);
        let new_id = self.panels.insert_with_key(|key| {
            copy.rebind(id, key);
            copy
        });
        Ok(new_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::EdgeSequence;
    use crate::math::{Point2, Vector3};

    fn square() -> Panel {
        let edges = EdgeSequence::from_verts(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ])
        .closed();
        Panel::new("square", edges)
    }

    #[test]
    fn missing_panel_is_an_error() {
        let mut store = PatternStore::new();
        let id = store.add_panel(square());
        store.remove_panel(id).unwrap();
        assert!(matches!(store.panel(id), Err(TopologyError::PanelNotFound)));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_is_independent_and_rebound() {
        let mut store = PatternStore::new();
        let id = store.add_panel(square());
        let top = store.panel(id).unwrap().key_at(1).unwrap();
        store
            .panel_mut(id)
            .unwrap()
            .set_interface("top", Interface::from_edge(id, top));

        let copy = store.duplicate_panel(id, "square_1").unwrap();
        store.panel_mut(copy).unwrap().translate_by(&Vector3::new(5.0, 0.0, 0.0));

        assert_eq!(store.len(), 2);
        assert_eq!(store.panel(copy).unwrap().name(), "square_1");
        assert_eq!(store.panel(id).unwrap().translation(), &Vector3::zeros());
        assert_eq!(store.interface(copy, "top").unwrap().instances()[0].panel, copy);
        assert_eq!(store.interface(id, "top").unwrap().instances()[0].panel, id);
        assert!(store.interface(id, "bottom").is_err());
    }
}
