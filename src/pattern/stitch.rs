use tracing::debug;

use crate::config::AssemblyOptions;
use crate::error::{GeometryError, Result, StitchError};
use crate::math::{relative_eq, TOLERANCE};

use super::document::StitchEnd;
use super::interface::{Interface, ResolvedEdge};
use super::{PanelId, PatternStore};

/// A seam between two interfaces, paired edge by edge in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct StitchingRule {
    pub left: Interface,
    pub right: Interface,
}

impl StitchingRule {
    #[must_use]
    pub fn new(left: Interface, right: Interface) -> Self {
        Self { left, right }
    }

    /// Creates a rule, splitting a lone edge on one side so that it pairs
    /// with every edge of a multi-edge side.
    ///
    /// The split follows the ruffle-adjusted length fractions of the other
    /// side and is applied to the panel owning the lone edge. Interfaces
    /// declared on that edge expand to its parts from then on.
    ///
    /// # Errors
    ///
    /// Returns an error if an interface cannot be resolved or the other
    /// side has no length.
    pub fn matching(store: &mut PatternStore, left: Interface, right: Interface) -> Result<Self> {
        let rule = Self::new(left, right);
        let left_edges = rule.left.resolve(store)?;
        let right_edges = rule.right.resolve(store)?;
        if let ([lone], others) | (others, [lone]) = (left_edges.as_slice(), right_edges.as_slice()) {
            if others.len() > 1 {
                split_to_match(store, lone, others)?;
            }
        }
        Ok(rule)
    }

    /// Resolves the rule into one stitch record per edge pair.
    ///
    /// # Errors
    ///
    /// Returns an error if a side is empty, the edge counts differ, the
    /// ruffle-adjusted lengths differ beyond `options.length_tolerance`, or
    /// an edge cannot be found in its panel.
    pub fn resolve(&self, store: &PatternStore, options: &AssemblyOptions) -> Result<Vec<[StitchEnd; 2]>> {
        if self.left.is_empty() || self.right.is_empty() {
            return Err(StitchError::EmptyInterface.into());
        }
        let left = self.left.resolve(store)?;
        let right = self.right.resolve(store)?;
        let left_name = side_name(&left);
        let right_name = side_name(&right);

        if left.len() != right.len() {
            return Err(StitchError::CountMismatch {
                left: left_name,
                right: right_name,
                left_count: left.len(),
                right_count: right.len(),
            }
            .into());
        }

        let left_length = ruffled_length(&left);
        let right_length = ruffled_length(&right);
        if !relative_eq(left_length, right_length, options.length_tolerance) {
            return Err(StitchError::LengthMismatch {
                left: left_name,
                right: right_name,
                left_length,
                right_length,
            }
            .into());
        }
        debug!(
            left = %left_name,
            right = %right_name,
            difference = left_length - right_length,
            "stitch lengths accepted"
        );

        Ok(left
            .into_iter()
            .zip(right)
            .map(|(l, r)| [stitch_end(l), stitch_end(r)])
            .collect())
    }

    pub(crate) fn flip_where(&mut self, filter: impl Fn(PanelId) -> bool + Copy) {
        self.left.flip_where(filter);
        self.right.flip_where(filter);
    }

    pub fn rebind(&mut self, from: PanelId, to: PanelId) {
        self.left.rebind(from, to);
        self.right.rebind(from, to);
    }
}

fn split_to_match(store: &mut PatternStore, lone: &ResolvedEdge, others: &[ResolvedEdge]) -> Result<()> {
    let total = ruffled_length(others);
    if total < TOLERANCE {
        return Err(GeometryError::Degenerate(format!(
            "cannot split an edge of '{}' to match a zero-length side",
            lone.panel_name
        ))
        .into());
    }
    let mut fractions: Vec<f64> = others.iter().map(|e| e.length / e.ruffle / total).collect();
    if lone.reversed {
        fractions.reverse();
    }
    debug!(
        panel = %lone.panel_name,
        edge = lone.edge_id,
        parts = fractions.len(),
        "splitting edge to match stitch"
    );
    store.panel_mut(lone.panel)?.split_edge(lone.edge_id, &fractions)?;
    Ok(())
}

fn ruffled_length(edges: &[ResolvedEdge]) -> f64 {
    edges.iter().map(|e| e.length / e.ruffle).sum()
}

fn stitch_end(edge: ResolvedEdge) -> StitchEnd {
    StitchEnd {
        panel: edge.panel_name,
        edge_id: edge.edge_id,
    }
}

/// Names of the panels on one side of a rule, for error messages.
fn side_name(edges: &[ResolvedEdge]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for edge in edges {
        if !names.contains(&edge.panel_name.as_str()) {
            names.push(&edge.panel_name);
        }
    }
    names.join("+")
}

/// Ordered list of stitching rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stitches {
    rules: Vec<StitchingRule>,
}

impl Stitches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule sewing `left` to `right`.
    pub fn connect(&mut self, left: Interface, right: Interface) -> &mut Self {
        self.rules.push(StitchingRule::new(left, right));
        self
    }

    /// Adds a rule sewing `left` to `right`, splitting a lone edge to match
    /// a multi-edge side. See [`StitchingRule::matching`].
    ///
    /// # Errors
    ///
    /// Returns an error if the split fails.
    pub fn connect_matching(
        &mut self,
        store: &mut PatternStore,
        left: Interface,
        right: Interface,
    ) -> Result<&mut Self> {
        self.rules.push(StitchingRule::matching(store, left, right)?);
        Ok(self)
    }

    pub fn push(&mut self, rule: StitchingRule) {
        self.rules.push(rule);
    }

    #[must_use]
    pub fn rules(&self) -> &[StitchingRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolves every rule in order.
    ///
    /// # Errors
    ///
    /// Returns the first rule resolution error.
    pub fn resolve(&self, store: &PatternStore, options: &AssemblyOptions) -> Result<Vec<[StitchEnd; 2]>> {
        let mut records = Vec::new();
        for rule in &self.rules {
            records.extend(rule.resolve(store, options)?);
        }
        Ok(records)
    }

    pub(crate) fn flip_where(&mut self, filter: impl Fn(PanelId) -> bool + Copy) {
        for rule in &mut self.rules {
            rule.flip_where(filter);
        }
    }

    pub fn rebind(&mut self, from: PanelId, to: PanelId) {
        for rule in &mut self.rules {
            rule.rebind(from, to);
        }
    }
}
