use crate::error::{GeometryError, Result, StitchError};

use super::{EdgeKey, PanelId, PatternStore};

/// One panel edge taking part in an interface.
///
/// The edge is referenced by its key, so the instance stays valid while the
/// panel is moved, mirrored or has the edge split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceInstance {
    pub panel: PanelId,
    pub edge: EdgeKey,
    /// Traversed against the direction of the panel loop.
    pub reversed: bool,
    /// Gathering ratio; `1.0` means the edge is sewn flat.
    pub ruffle: f64,
}

/// A loop edge an interface instance resolves to at assembly time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEdge {
    pub panel: PanelId,
    pub panel_name: String,
    /// Index of the edge in the panel loop.
    pub edge_id: usize,
    pub length: f64,
    pub ruffle: f64,
    /// Traversed against the direction of the panel loop.
    pub reversed: bool,
}

/// A named connection surface made of one or more panel edges in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    instances: Vec<InterfaceInstance>,
}

impl Interface {
    /// Interface over the given edges of one panel, without gathering.
    #[must_use]
    pub fn new(panel: PanelId, edges: impl IntoIterator<Item = EdgeKey>) -> Self {
        Self {
            instances: edges
                .into_iter()
                .map(|edge| InterfaceInstance {
                    panel,
                    edge,
                    reversed: false,
                    ruffle: 1.0,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn from_edge(panel: PanelId, edge: EdgeKey) -> Self {
        Self::new(panel, [edge])
    }

    /// Concatenates interfaces into one multi-edge interface.
    #[must_use]
    pub fn from_multiple(interfaces: impl IntoIterator<Item = Interface>) -> Self {
        Self {
            instances: interfaces.into_iter().flat_map(|i| i.instances).collect(),
        }
    }

    /// Sets the ruffle ratio of every instance.
    ///
    /// # Errors
    ///
    /// Returns an error if `ruffle` is not a positive finite number.
    pub fn with_ruffle(mut self, ruffle: f64) -> Result<Self> {
        if !(ruffle.is_finite() && ruffle > 0.0) {
            return Err(GeometryError::InvalidRuffle(ruffle).into());
        }
        for inst in &mut self.instances {
            inst.ruffle = ruffle;
        }
        Ok(self)
    }

    #[must_use]
    pub fn instances(&self) -> &[InterfaceInstance] {
        &self.instances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The same edges traversed in the opposite order and direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            instances: self
                .instances
                .iter()
                .rev()
                .map(|inst| InterfaceInstance {
                    reversed: !inst.reversed,
                    ..*inst
                })
                .collect(),
        }
    }

    /// Looks the edges up in their panels, in traversal order.
    ///
    /// An instance whose edge has been split expands to the parts.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel is missing from the store or an edge key
    /// does not belong to its panel.
    pub fn resolve(&self, store: &PatternStore) -> Result<Vec<ResolvedEdge>> {
        let mut resolved = Vec::with_capacity(self.instances.len());
        for inst in &self.instances {
            let panel = store.panel(inst.panel)?;
            let mut ids = panel.geometric_ids(inst.edge);
            if ids.is_empty() {
                return Err(StitchError::EdgeNotInPanel(panel.name().to_owned()).into());
            }
            if inst.reversed {
                ids.reverse();
            }
            resolved.extend(ids.into_iter().map(|edge_id| ResolvedEdge {
                panel: inst.panel,
                panel_name: panel.name().to_owned(),
                edge_id,
                length: panel.edges()[edge_id].length(),
                ruffle: inst.ruffle,
                reversed: inst.reversed,
            }));
        }
        Ok(resolved)
    }

    /// Total geometric length of the edges.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn length(&self, store: &PatternStore) -> Result<f64> {
        Ok(self.resolve(store)?.iter().map(|e| e.length).sum())
    }

    /// Length after gathering: `sum(length / ruffle)`.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn ruffled_length(&self, store: &PatternStore) -> Result<f64> {
        Ok(self.resolve(store)?.iter().map(|e| e.length / e.ruffle).sum())
    }

    /// Distinct panels referenced, in first-appearance order.
    #[must_use]
    pub fn panels(&self) -> Vec<PanelId> {
        let mut panels: Vec<PanelId> = Vec::new();
        for inst in &self.instances {
            if !panels.contains(&inst.panel) {
                panels.push(inst.panel);
            }
        }
        panels
    }

    /// Flips the traversal direction of instances on panels accepted by
    /// `filter`, whose loops were reversed by a mirror.
    pub(crate) fn flip_where(&mut self, filter: impl Fn(PanelId) -> bool) {
        for inst in &mut self.instances {
            if filter(inst.panel) {
                inst.reversed = !inst.reversed;
            }
        }
    }

    /// Re-targets instances of panel `from` to panel `to`.
    pub fn rebind(&mut self, from: PanelId, to: PanelId) {
        for inst in &mut self.instances {
            if inst.panel == from {
                inst.panel = to;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use crate::geometry::EdgeSequence;
    use crate::math::{Point2, Vector2};
    use crate::pattern::Panel;
    use approx::assert_relative_eq;

    fn strip(store: &mut PatternStore, name: &str, w: f64) -> PanelId {
        let edges = EdgeSequence::from_verts(&[
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 5.0),
            Point2::new(w, 5.0),
            Point2::new(w, 0.0),
        ])
        .closed();
        store.add_panel(Panel::new(name, edges))
    }

    fn key(store: &PatternStore, id: PanelId, index: usize) -> EdgeKey {
        store.panel(id).unwrap().key_at(index).unwrap()
    }

    #[test]
    fn ruffled_length_divides_by_ratio() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 30.0);
        let iface = Interface::from_edge(a, key(&store, a, 1)).with_ruffle(1.5).unwrap();
        assert_relative_eq!(iface.length(&store).unwrap(), 30.0, epsilon = 1e-12);
        assert_relative_eq!(iface.ruffled_length(&store).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_ruffle_is_rejected() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 1.0);
        for bad in [0.0, -1.0, f64::NAN] {
            let err = Interface::from_edge(a, key(&store, a, 0)).with_ruffle(bad).unwrap_err();
            assert!(matches!(err, PatternError::Geometry(GeometryError::InvalidRuffle(_))));
        }
    }

    #[test]
    fn from_multiple_keeps_order() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 10.0);
        let b = strip(&mut store, "b", 20.0);
        let joined = Interface::from_multiple([
            Interface::from_edge(a, key(&store, a, 1)),
            Interface::from_edge(b, key(&store, b, 1)),
        ]);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.panels(), vec![a, b]);
        assert_relative_eq!(joined.length(&store).unwrap(), 30.0, epsilon = 1e-12);

        let rev = joined.reversed();
        assert_eq!(rev.instances()[0].panel, b);
        assert!(rev.instances()[0].reversed);
        let names: Vec<String> = rev.resolve(&store).unwrap().into_iter().map(|e| e.panel_name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn split_edge_expands_in_traversal_order() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 20.0);
        let top = Interface::from_edge(a, key(&store, a, 1));
        store.panel_mut(a).unwrap().split_edge(1, &[0.25, 0.75]).unwrap();

        let forward = top.resolve(&store).unwrap();
        assert_eq!(forward.iter().map(|e| e.edge_id).collect::<Vec<_>>(), [1, 2]);
        assert_relative_eq!(forward[0].length, 5.0, epsilon = 1e-9);
        let backward = top.reversed().resolve(&store).unwrap();
        assert_eq!(backward.iter().map(|e| e.edge_id).collect::<Vec<_>>(), [2, 1]);
        assert_relative_eq!(top.length(&store).unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn handles_survive_mirroring_and_rebinding() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 10.0);
        let b = strip(&mut store, "b", 10.0);
        let top = Interface::from_edge(a, key(&store, a, 1));
        store.panel_mut(a).unwrap().mirror(&Vector2::y());
        assert_eq!(top.resolve(&store).unwrap()[0].edge_id, 2);

        let mut moved = top.clone();
        moved.rebind(a, b);
        assert_eq!(moved.resolve(&store).unwrap()[0].panel_name, "b");
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut store = PatternStore::new();
        let a = strip(&mut store, "a", 10.0);
        let b = store.add_panel(Panel::new("tiny", EdgeSequence::new()));
        let stray = Interface::from_edge(b, key(&store, a, 3));
        assert!(matches!(
            stray.resolve(&store).unwrap_err(),
            PatternError::Stitch(StitchError::EdgeNotInPanel(name)) if name == "tiny"
        ));
    }
}
