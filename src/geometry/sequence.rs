use std::ops::{Index, Range};

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{BoundingBox2, Point2, Vector2, POINT_TOLERANCE, TOLERANCE};

use super::edge::Edge;

/// Tolerance used when flattening curves for bounding boxes.
pub(crate) const FLATTEN_TOLERANCE: f64 = 1e-3;

/// An ordered chain of edges where each edge starts where the previous one ends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSequence {
    edges: Vec<Edge>,
}

impl EdgeSequence {
    /// Creates an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence from chained edges.
    ///
    /// # Errors
    ///
    /// Returns a continuity error if consecutive edges do not meet.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Result<Self> {
        let mut seq = Self::new();
        for edge in edges {
            seq.push(edge)?;
        }
        Ok(seq)
    }

    /// Creates straight edges chaining the given vertices in order.
    ///
    /// The sequence is not closed; fewer than two vertices give an empty sequence.
    #[must_use]
    pub fn from_verts(verts: &[Point2]) -> Self {
        Self {
            edges: verts.windows(2).map(|w| Edge::line(w[0], w[1])).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Edge> {
        self.edges.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Edge> {
        self.edges.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Appends an edge, snapping its start onto the current end.
    ///
    /// # Errors
    ///
    /// Returns a continuity error if the edge does not start where the sequence ends.
    pub fn push(&mut self, mut edge: Edge) -> Result<()> {
        if let Some(last) = self.edges.last() {
            check_continuity(&last.end, &edge.start)?;
            edge.start = last.end;
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Appends every edge of another sequence.
    ///
    /// # Errors
    ///
    /// Returns a continuity error if `other` does not start where this sequence ends.
    pub fn append(&mut self, other: EdgeSequence) -> Result<()> {
        for edge in other.edges {
            self.push(edge)?;
        }
        Ok(())
    }

    /// Position of the edge structurally equal to `edge` (same orientation).
    #[must_use]
    pub fn index_of(&self, edge: &Edge) -> Option<usize> {
        self.edges.iter().position(|e| e.is_close(edge, POINT_TOLERANCE))
    }

    /// Replaces `target` with `replacement`.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not in the sequence, or if the
    /// replacement does not start at `target.start` and end at `target.end`.
    pub fn substitute(&mut self, target: &Edge, replacement: EdgeSequence) -> Result<()> {
        let index = self.index_of(target).ok_or(TopologyError::EdgeNotFound)?;
        self.substitute_at(index, replacement)
    }

    /// Replaces the edge at `index` with `replacement`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds, `replacement` is empty,
    /// or its endpoints do not match those of the replaced edge.
    pub fn substitute_at(&mut self, index: usize, mut replacement: EdgeSequence) -> Result<()> {
        let target = self.edges.get(index).ok_or(TopologyError::IndexOutOfBounds {
            index,
            len: self.edges.len(),
        })?;
        let (Some(first), Some(last)) = (replacement.edges.first(), replacement.edges.last()) else {
            return Err(TopologyError::EmptySequence.into());
        };
        check_continuity(&target.start, &first.start)?;
        check_continuity(&last.end, &target.end)?;

        let (start, end) = (target.start, target.end);
        if let Some(first) = replacement.edges.first_mut() {
            first.start = start;
        }
        if let Some(last) = replacement.edges.last_mut() {
            last.end = end;
        }
        self.edges.splice(index..=index, replacement.edges);
        Ok(())
    }

    /// Returns the sequence traversed backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            edges: self.edges.iter().rev().map(Edge::reversed).collect(),
        }
    }

    /// Reverses the sequence in place.
    pub fn reverse(&mut self) -> &mut Self {
        *self = self.reversed();
        self
    }

    /// Appends an edge from the last end back to the first start, unless
    /// the sequence is already closed.
    pub fn close_loop(&mut self) -> &mut Self {
        if let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) {
            if (last.end - first.start).norm() > POINT_TOLERANCE {
                let closing = Edge::line(last.end, first.start);
                self.edges.push(closing);
            }
        }
        self
    }

    /// Consuming variant of [`close_loop`](Self::close_loop).
    #[must_use]
    pub fn closed(mut self) -> Self {
        self.close_loop();
        self
    }

    /// Whether the last edge ends where the first edge starts.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => (last.end - first.start).norm() <= POINT_TOLERANCE,
            _ => false,
        }
    }

    /// Whether every pair of consecutive edges meets.
    #[must_use]
    pub fn is_chained(&self) -> bool {
        self.edges
            .windows(2)
            .all(|w| (w[0].end - w[1].start).norm() <= POINT_TOLERANCE)
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// Vertex list: start of every edge, plus the final end for open sequences.
    #[must_use]
    pub fn verts(&self) -> Vec<Point2> {
        let mut verts: Vec<Point2> = self.edges.iter().map(|e| e.start).collect();
        if !self.is_closed() {
            if let Some(last) = self.edges.last() {
                verts.push(last.end);
            }
        }
        verts
    }

    /// Flattened polyline of the sequence without repeated shared vertices.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let mut points = Vec::new();
        for edge in &self.edges {
            let flat = edge.to_points(tolerance);
            points.extend_from_slice(&flat[..flat.len() - 1]);
        }
        if !self.is_closed() {
            if let Some(last) = self.edges.last() {
                points.push(last.end);
            }
        }
        points
    }

    /// 2D bounding box including curve bulges.
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox2> {
        let points = self.to_points(FLATTEN_TOLERANCE);
        BoundingBox2::from_points(&points)
    }

    /// Signed area enclosed by the flattened loop, positive for
    /// counter-clockwise traversal.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.to_points(FLATTEN_TOLERANCE))
    }

    /// Sub-sequence of the edges in `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            edges: self.edges[range].to_vec(),
        }
    }

    /// Translates every edge.
    pub fn translate_by(&mut self, delta: &Vector2) -> &mut Self {
        for edge in &mut self.edges {
            edge.translate_by(delta);
        }
        self
    }

    /// Rotates the sequence counter-clockwise by `angle` radians about its first vertex.
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        if let Some(pivot) = self.edges.first().map(|e| e.start) {
            for edge in &mut self.edges {
                edge.rotate_about(&pivot, angle);
            }
        }
        self
    }

    /// Translates the sequence so that its first vertex lands on `point`.
    pub fn snap_to(&mut self, point: &Point2) -> &mut Self {
        if let Some(start) = self.edges.first().map(|e| e.start) {
            let delta = point - start;
            self.translate_by(&delta);
        }
        self
    }

    /// Stretches the sequence by `factor` along the line from its first
    /// vertex to its last vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty or its endpoints coincide.
    pub fn extend(&mut self, factor: f64) -> Result<&mut Self> {
        let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) else {
            return Err(TopologyError::EmptySequence.into());
        };
        let origin = first.start;
        let line = last.end - origin;
        let line_len = line.norm();
        if line_len < TOLERANCE {
            return Err(GeometryError::Degenerate("cannot extend a sequence with coincident endpoints".into()).into());
        }
        let dir = line / line_len;
        let stretch = |p: &Point2| p + dir * ((p - origin).dot(&dir) * (factor - 1.0));

        for edge in &mut self.edges {
            let (start, end) = (stretch(&edge.start), stretch(&edge.end));
            edge.set_endpoints(start, end);
        }
        Ok(self)
    }

    /// Reflection of the sequence across the line through the origin with
    /// direction `axis`, traversed backwards to keep its winding.
    #[must_use]
    pub fn mirrored(&self, axis: &Vector2) -> Self {
        Self {
            edges: self.edges.iter().rev().map(|e| e.mirrored(axis).reversed()).collect(),
        }
    }
}

fn check_continuity(end: &Point2, start: &Point2) -> Result<()> {
    if (end - start).norm() > POINT_TOLERANCE {
        return Err(TopologyError::Discontinuous {
            x0: end.x,
            y0: end.y,
            x1: start.x,
            y1: start.y,
        }
        .into());
    }
    Ok(())
}

impl Index<usize> for EdgeSequence {
    type Output = Edge;

    fn index(&self, index: usize) -> &Edge {
        &self.edges[index]
    }
}

impl<'a> IntoIterator for &'a EdgeSequence {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl From<Edge> for EdgeSequence {
    fn from(edge: Edge) -> Self {
        Self { edges: vec![edge] }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rectangle() -> EdgeSequence {
        EdgeSequence::from_verts(&[p(0.0, 0.0), p(0.0, 10.0), p(35.0, 10.0), p(35.0, 0.0)]).closed()
    }

    #[test]
    fn rectangle_perimeter_and_bbox() {
        let rect = rectangle();
        assert_eq!(rect.len(), 4);
        assert!(rect.is_closed());
        assert_relative_eq!(rect.length(), 90.0, epsilon = 1e-12);
        let bbox = rect.bbox().unwrap();
        assert_eq!(bbox.min, p(0.0, 0.0));
        assert_eq!(bbox.max, p(35.0, 10.0));
    }

    #[test]
    fn close_loop_is_idempotent() {
        let mut seq = EdgeSequence::from_verts(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]);
        assert!(!seq.is_closed());
        seq.close_loop();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.first().unwrap().start, seq.last().unwrap().end);
        seq.close_loop();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn push_rejects_gap() {
        let mut seq = EdgeSequence::from_verts(&[p(0.0, 0.0), p(1.0, 0.0)]);
        let err = seq.push(Edge::line(p(2.0, 0.0), p(3.0, 0.0))).unwrap_err();
        assert!(matches!(err, PatternError::Topology(TopologyError::Discontinuous { .. })));
    }

    #[test]
    fn reverse_is_an_involution() {
        let mut seq = EdgeSequence::from_verts(&[p(0.0, 0.0), p(4.0, 0.0)]);
        seq.push(Edge::quadratic(p(4.0, 0.0), p(4.0, 5.0), Vector2::new(0.5, 0.3)))
            .unwrap();
        seq.push(Edge::circle(p(4.0, 5.0), p(0.0, 5.0), 3.0, false, true)).unwrap();

        let rev = seq.reversed();
        assert_eq!(rev.first().unwrap().start, p(0.0, 5.0));
        assert!(rev.is_chained());
        let back = rev.reversed();
        for (a, b) in back.iter().zip(seq.iter()) {
            assert!(a.is_close(b, 1e-12));
        }
        assert_relative_eq!(rev.length(), seq.length(), epsilon = 1e-9);
    }

    #[test]
    fn substitute_keeps_continuity() {
        let mut rect = rectangle();
        let top = rect[1].clone();
        let equivalent = top.subdivide(&[0.5, 0.5]).unwrap();
        rect.substitute(&top, equivalent).unwrap();
        assert_eq!(rect.len(), 5);
        assert!(rect.is_chained() && rect.is_closed());
        assert_relative_eq!(rect.length(), 90.0, epsilon = 1e-9);

        // A bump on the bottom edge makes the loop longer but keeps it connected.
        let bottom = rect.last().unwrap().clone();
        let bump = EdgeSequence::from_verts(&[bottom.start, p(17.5, -5.0), bottom.end]);
        rect.substitute(&bottom, bump).unwrap();
        assert!(rect.is_chained() && rect.is_closed());
        assert!(rect.length() > 90.0);
    }

    #[test]
    fn substitute_rejects_mismatched_endpoints() {
        let mut rect = rectangle();
        let top = rect[1].clone();
        let wrong = EdgeSequence::from_verts(&[top.start, p(20.0, 12.0)]);
        let err = rect.substitute(&top, wrong).unwrap_err();
        assert!(matches!(err, PatternError::Topology(TopologyError::Discontinuous { .. })));

        let missing = Edge::line(p(100.0, 0.0), p(101.0, 0.0));
        assert!(rect.substitute(&missing, EdgeSequence::from(missing.clone())).is_err());
        assert!(rect.substitute_at(10, EdgeSequence::new()).is_err());
    }

    #[test]
    fn rotate_and_snap() {
        let mut seq = EdgeSequence::from_verts(&[p(1.0, 1.0), p(3.0, 1.0), p(3.0, 2.0)]);
        seq.rotate(FRAC_PI_2);
        assert_relative_eq!(seq[0].end.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(seq[0].end.y, 3.0, epsilon = 1e-12);
        seq.snap_to(&p(0.0, 0.0));
        assert_eq!(seq[0].start, p(0.0, 0.0));
        assert!(seq.is_chained());
    }

    #[test]
    fn extend_stretches_along_chord() {
        let mut seq = EdgeSequence::from_verts(&[p(0.0, 0.0), p(2.0, 1.0), p(4.0, 0.0)]);
        seq.extend(1.5).unwrap();
        assert_relative_eq!(seq.last().unwrap().end.x, 6.0, epsilon = 1e-12);
        assert_relative_eq!(seq[0].end.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(seq[0].end.y, 1.0, epsilon = 1e-12);

        let mut closed = rectangle();
        assert!(closed.extend(2.0).is_err());
    }

    #[test]
    fn verts_of_open_and_closed() {
        let open = EdgeSequence::from_verts(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]);
        assert_eq!(open.verts().len(), 3);
        assert_eq!(rectangle().verts().len(), 4);
        assert_eq!(open.slice(1..2).len(), 1);
    }

    #[test]
    fn mirrored_keeps_chain() {
        let rect = rectangle();
        let mirrored = rect.mirrored(&Vector2::new(0.0, 1.0));
        assert!(mirrored.is_chained() && mirrored.is_closed());
        assert_relative_eq!(mirrored.length(), 90.0, epsilon = 1e-12);
        let bbox = mirrored.bbox().unwrap();
        assert_eq!(bbox.min, p(-35.0, 0.0));
        // Reflection plus reversal keeps the winding.
        assert_relative_eq!(rect.signed_area(), -350.0, epsilon = 1e-9);
        assert_relative_eq!(mirrored.signed_area(), -350.0, epsilon = 1e-9);
    }
}
