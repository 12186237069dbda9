use std::collections::BTreeMap;
use std::f64::consts::PI;

use nalgebra::Quaternion;

use crate::config::AssemblyOptions;
use crate::error::{Result, TopologyError};
use crate::geometry::sequence::FLATTEN_TOLERANCE;
use crate::geometry::{Edge, EdgeSequence};
use crate::math::polygon_2d::closed_polyline_self_intersects;
use crate::math::{
    reflect_2d, rotation_from_euler_deg, rotation_to_euler_deg, BoundingBox2, BoundingBox3, Point2, Point3,
    Rotation, Vector2, Vector3, TOLERANCE,
};

use super::document::{EdgeRecord, PanelRecord, PatternDocument};
use super::interface::Interface;
use super::stitch::Stitches;
use super::{EdgeKey, PanelId, PatternStore};

/// A flat pattern piece: a closed edge loop with a 3D pose.
///
/// A 2D point `p` of the loop is placed at `rotation * (p - pivot, 0) + translation`.
///
/// Every loop edge carries an [`EdgeKey`] that survives mirroring and
/// duplication. When an edge is split, its key forwards to the keys of the
/// parts, so interfaces declared on the whole edge expand to the parts.
#[derive(Debug, Clone)]
pub struct Panel {
    name: String,
    edges: EdgeSequence,
    keys: Vec<EdgeKey>,
    next_key: u32,
    splits: BTreeMap<EdgeKey, Vec<EdgeKey>>,
    pivot: Point2,
    rotation: Rotation,
    translation: Vector3,
    interfaces: BTreeMap<String, Interface>,
    stitches: Stitches,
}

impl Panel {
    /// Creates an unplaced panel: pivot at the origin, identity rotation, no translation.
    #[must_use]
    pub fn new(name: impl Into<String>, edges: EdgeSequence) -> Self {
        let count = u32::try_from(edges.len()).unwrap_or(u32::MAX);
        Self {
            name: name.into(),
            edges,
            keys: (0..count).map(EdgeKey).collect(),
            next_key: count,
            splits: BTreeMap::new(),
            pivot: Point2::origin(),
            rotation: Rotation::identity(),
            translation: Vector3::zeros(),
            interfaces: BTreeMap::new(),
            stitches: Stitches::new(),
        }
    }

    /// Rebuilds a panel from its serialized record. The pivot is the origin
    /// since record vertices are pivot-relative.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge references a missing vertex or the edges
    /// are not chained.
    pub fn from_record(name: impl Into<String>, record: &PanelRecord) -> Result<Self> {
        let vertex = |i: usize| {
            record
                .vertices
                .get(i)
                .map(|v| Point2::new(v[0], v[1]))
                .ok_or(TopologyError::IndexOutOfBounds {
                    index: i,
                    len: record.vertices.len(),
                })
        };
        let mut edges = EdgeSequence::new();
        for EdgeRecord { endpoints, curvature } in &record.edges {
            let edge = Edge::new(vertex(endpoints[0])?, vertex(endpoints[1])?, curvature.map(Into::into));
            edges.push(edge)?;
        }
        let [rx, ry, rz] = record.rotation;
        let mut panel = Self::new(name, edges);
        panel.rotation = rotation_from_euler_deg(rx, ry, rz);
        panel.translation = Vector3::from(record.translation);
        Ok(panel)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn edges(&self) -> &EdgeSequence {
        &self.edges
    }

    /// Keys of the loop edges, in loop order.
    #[must_use]
    pub fn keys(&self) -> &[EdgeKey] {
        &self.keys
    }

    /// Key of the loop edge at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is past the end of the loop.
    pub fn key_at(&self, index: usize) -> Result<EdgeKey> {
        self.keys.get(index).copied().ok_or_else(|| {
            TopologyError::IndexOutOfBounds {
                index,
                len: self.keys.len(),
            }
            .into()
        })
    }

    /// Key of the loop edge structurally equal to `edge`, in either direction.
    #[must_use]
    pub fn key_of(&self, edge: &Edge) -> Option<EdgeKey> {
        self.edge_index(edge).map(|i| self.keys[i])
    }

    /// Keys of several loop edges found by shape.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the edges is not part of the loop.
    pub fn keys_of<'a>(&self, edges: impl IntoIterator<Item = &'a Edge>) -> Result<Vec<EdgeKey>> {
        edges
            .into_iter()
            .map(|edge| self.key_of(edge).ok_or_else(|| TopologyError::EdgeNotFound.into()))
            .collect()
    }

    /// Geometric ids (loop indices) currently covered by `key`, in loop order.
    ///
    /// A split key covers the edges it was split into. The list is empty when
    /// the key never belonged to this panel.
    #[must_use]
    pub fn geometric_ids(&self, key: EdgeKey) -> Vec<usize> {
        let mut ids = Vec::new();
        let mut pending = vec![key];
        while let Some(k) = pending.pop() {
            if let Some(parts) = self.splits.get(&k) {
                pending.extend(parts.iter().copied());
            } else if let Some(index) = self.keys.iter().position(|&own| own == k) {
                ids.push(index);
            }
        }
        ids.sort_unstable();
        ids
    }

    /// Replaces the loop edge at `index` with `replacement`.
    ///
    /// The replaced key forwards to the keys of the new edges, which are
    /// returned in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or `replacement` does not
    /// span the replaced edge.
    pub fn substitute_edge(&mut self, index: usize, replacement: EdgeSequence) -> Result<Vec<EdgeKey>> {
        let old = self.key_at(index)?;
        let count = replacement.len();
        self.edges.substitute_at(index, replacement)?;
        let fresh: Vec<EdgeKey> = (0..count).map(|_| self.allocate_key()).collect();
        self.keys.splice(index..=index, fresh.iter().copied());
        self.splits.insert(old, fresh.clone());
        Ok(fresh)
    }

    /// Splits the loop edge at `index` by arc-length `fractions`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of bounds or the fractions are
    /// invalid.
    pub fn split_edge(&mut self, index: usize, fractions: &[f64]) -> Result<Vec<EdgeKey>> {
        let parts = self
            .edges
            .get(index)
            .ok_or(TopologyError::IndexOutOfBounds {
                index,
                len: self.edges.len(),
            })?
            .subdivide(fractions)?;
        self.substitute_edge(index, parts)
    }

    fn allocate_key(&mut self) -> EdgeKey {
        let key = EdgeKey(self.next_key);
        self.next_key += 1;
        key
    }

    #[must_use]
    pub fn pivot(&self) -> Point2 {
        self.pivot
    }

    #[must_use]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    #[must_use]
    pub fn translation(&self) -> &Vector3 {
        &self.translation
    }

    // --- Pose ---

    pub fn translate_by(&mut self, delta: &Vector3) -> &mut Self {
        self.translation += delta;
        self
    }

    pub fn translate_to(&mut self, translation: Vector3) -> &mut Self {
        self.translation = translation;
        self
    }

    /// Applies `delta` after the current rotation.
    pub fn rotate_by(&mut self, delta: &Rotation) -> &mut Self {
        self.rotation = delta * self.rotation;
        self
    }

    pub fn rotate_to(&mut self, rotation: Rotation) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Moves the pivot. With `replicate_placement` the translation is
    /// adjusted so that the panel stays where it is in 3D.
    pub fn set_pivot(&mut self, pivot: Point2, replicate_placement: bool) -> &mut Self {
        if replicate_placement {
            let shift = pivot - self.pivot;
            self.translation += self.rotation * Vector3::new(shift.x, shift.y, 0.0);
        }
        self.pivot = pivot;
        self
    }

    /// Moves the pivot to the middle of the top of the bounding box, keeping
    /// the 3D placement.
    pub fn top_center_pivot(&mut self) -> &mut Self {
        if let Some(bbox) = self.bbox() {
            self.set_pivot(Point2::new(bbox.center().x, bbox.max.y), true);
        }
        self
    }

    /// Places a point of the panel plane in 3D.
    #[must_use]
    pub fn point_to_3d(&self, p: &Point2) -> Point3 {
        let local = Vector3::new(p.x - self.pivot.x, p.y - self.pivot.y, 0.0);
        Point3::from(self.rotation * local + self.translation)
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox2> {
        self.edges.bbox()
    }

    /// Bounding box of the placed panel, curves included.
    #[must_use]
    pub fn bbox3d(&self) -> Option<BoundingBox3> {
        let points: Vec<Point3> = self
            .edges
            .to_points(FLATTEN_TOLERANCE)
            .iter()
            .map(|p| self.point_to_3d(p))
            .collect();
        BoundingBox3::from_points(&points)
    }

    // --- Mirroring ---

    /// Replaces the panel with its mirror image across the 2D line through
    /// the origin with direction `axis`.
    ///
    /// The loop is reversed to keep its winding. Mirroring across the local
    /// Y axis also mirrors the 3D placement across the world YZ plane, so a
    /// mirrored copy of a right-side panel lands on the left side.
    pub fn mirror(&mut self, axis: &Vector2) -> &mut Self {
        self.mirror_2d(axis);
        if axis.x.abs() < TOLERANCE {
            self.translation.x = -self.translation.x;
            let q = self.rotation.quaternion();
            self.rotation = Rotation::new_normalize(Quaternion::new(q.w, q.i, -q.j, -q.k));
        }
        self
    }

    /// Swaps the right and wrong sides of the fabric: the 3D footprint stays
    /// the same while the panel normal flips.
    pub fn swap_right_wrong(&mut self) -> &mut Self {
        self.mirror_2d(&Vector2::y());
        self.rotation *= Rotation::from_axis_angle(&Vector3::y_axis(), PI);
        self
    }

    fn mirror_2d(&mut self, axis: &Vector2) {
        self.edges = self.edges.mirrored(axis);
        self.keys.reverse();
        self.pivot = Point2::from(reflect_2d(&self.pivot.coords, axis));
        for interface in self.interfaces.values_mut() {
            interface.flip_where(|_| true);
        }
        self.stitches.flip_where(|_| true);
    }

    // --- Interfaces & stitches ---

    /// Declares (or replaces) a named interface.
    pub fn set_interface(&mut self, name: impl Into<String>, interface: Interface) -> &mut Self {
        self.interfaces.insert(name.into(), interface);
        self
    }

    /// # Errors
    ///
    /// Returns an error if no interface is declared under `name`.
    pub fn interface(&self, name: &str) -> Result<&Interface> {
        self.interfaces
            .get(name)
            .ok_or_else(|| TopologyError::InterfaceNotFound(format!("{}.{name}", self.name)).into())
    }

    #[must_use]
    pub fn interfaces(&self) -> &BTreeMap<String, Interface> {
        &self.interfaces
    }

    /// Stitches internal to the panel, such as dart folds.
    #[must_use]
    pub fn stitches(&self) -> &Stitches {
        &self.stitches
    }

    pub fn stitches_mut(&mut self) -> &mut Stitches {
        &mut self.stitches
    }

    pub(crate) fn rebind(&mut self, from: PanelId, to: PanelId) {
        for interface in self.interfaces.values_mut() {
            interface.rebind(from, to);
        }
        self.stitches.rebind(from, to);
    }

    /// Geometric id of `edge`: its index in the loop, matched in either direction.
    #[must_use]
    pub fn edge_index(&self, edge: &Edge) -> Option<usize> {
        self.edges.iter().position(|e| e.matches(edge))
    }

    // --- Assembly ---

    /// Checks that the loop can be assembled.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop is empty or open, or, when
    /// `check_self_intersection` is set, if its flattened boundary crosses itself.
    pub fn validate(&self, check_self_intersection: bool) -> Result<()> {
        if self.edges.is_empty() {
            return Err(TopologyError::EmptySequence.into());
        }
        if !self.edges.is_chained() || !self.edges.is_closed() {
            return Err(TopologyError::LoopNotClosed(self.name.clone()).into());
        }
        if check_self_intersection && closed_polyline_self_intersects(&self.edges.to_points(FLATTEN_TOLERANCE)) {
            return Err(TopologyError::SelfIntersecting(self.name.clone()).into());
        }
        Ok(())
    }

    /// Serializable form of the panel, vertices relative to the pivot.
    #[must_use]
    pub fn to_record(&self) -> PanelRecord {
        let verts = self.edges.verts();
        let n = verts.len();
        let closed = self.edges.is_closed();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, edge)| EdgeRecord {
                endpoints: [i, if closed { (i + 1) % n } else { i + 1 }],
                curvature: edge.curvature.map(Into::into),
            })
            .collect();
        PanelRecord {
            vertices: verts
                .iter()
                .map(|v| [v.x - self.pivot.x, v.y - self.pivot.y])
                .collect(),
            edges,
            rotation: rotation_to_euler_deg(&self.rotation),
            translation: self.translation.into(),
        }
    }

    /// Assembles the panel alone: its record plus its internal stitches.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or an internal stitch cannot be resolved.
    pub fn assembly_with(&self, store: &PatternStore, options: &AssemblyOptions) -> Result<PatternDocument> {
        self.validate(options.check_self_intersection)?;
        let mut doc = PatternDocument::default();
        doc.panels.insert(self.name.clone(), self.to_record());
        doc.stitches = self.stitches.resolve(store, options)?;
        doc.check_stitches()?;
        Ok(doc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use crate::geometry::Curvature;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn rectangle(name: &str) -> Panel {
        let edges = EdgeSequence::from_verts(&[p(0.0, 0.0), p(0.0, 10.0), p(35.0, 10.0), p(35.0, 0.0)]).closed();
        Panel::new(name, edges)
    }

    fn assert_point3(a: &Point3, b: &Point3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
    }

    #[test]
    fn top_center_pivot_keeps_placement() {
        let mut panel = rectangle("front");
        panel
            .rotate_by(&rotation_from_euler_deg(0.0, 30.0, 10.0))
            .translate_by(&Vector3::new(1.0, 2.0, 3.0));
        let before = panel.point_to_3d(&p(35.0, 0.0));
        panel.top_center_pivot();
        assert_eq!(panel.pivot(), p(17.5, 10.0));
        assert_point3(&panel.point_to_3d(&p(35.0, 0.0)), &before);

        panel.set_pivot(p(0.0, 0.0), false);
        assert!((panel.point_to_3d(&p(35.0, 0.0)) - before).norm() > 1.0);
    }

    #[test]
    fn rotate_by_applies_after_current_rotation() {
        let mut panel = rectangle("a");
        panel.rotate_by(&Rotation::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2));
        panel.rotate_by(&Rotation::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2));
        assert_point3(&panel.point_to_3d(&p(1.0, 0.0)), &Point3::new(0.0, 1.0, 0.0));

        panel.rotate_to(Rotation::identity()).translate_to(Vector3::new(0.0, 0.0, 5.0));
        assert_point3(&panel.point_to_3d(&p(1.0, 0.0)), &Point3::new(1.0, 0.0, 5.0));
    }

    #[test]
    fn bbox3d_follows_pose() {
        let mut panel = rectangle("a");
        panel.translate_by(&Vector3::new(0.0, 0.0, 20.0));
        let bbox = panel.bbox3d().unwrap();
        assert_point3(&bbox.min, &Point3::new(0.0, 0.0, 20.0));
        assert_point3(&bbox.max, &Point3::new(35.0, 10.0, 20.0));
    }

    #[test]
    fn mirror_twice_is_congruent() {
        let mut panel = rectangle("a");
        panel
            .rotate_by(&rotation_from_euler_deg(10.0, 20.0, 30.0))
            .translate_by(&Vector3::new(15.0, -3.0, 7.0));
        let original = panel.clone();
        panel.mirror(&Vector2::y()).mirror(&Vector2::y());
        for (a, b) in panel.edges().iter().zip(original.edges().iter()) {
            assert!(a.is_close(b, 1e-12));
        }
        let (a, b) = (panel.bbox3d().unwrap(), original.bbox3d().unwrap());
        assert_point3(&a.min, &b.min);
        assert_point3(&a.max, &b.max);
    }

    #[test]
    fn mirror_across_y_mirrors_placement() {
        let mut panel = rectangle("right");
        panel.translate_by(&Vector3::new(10.0, 0.0, 0.0));
        panel.mirror(&Vector2::y());
        let bbox = panel.bbox3d().unwrap();
        assert_point3(&bbox.min, &Point3::new(-45.0, 0.0, 0.0));
        assert_point3(&bbox.max, &Point3::new(-10.0, 10.0, 0.0));
        assert!(panel.edges().is_closed());
        assert!(panel.validate(true).is_ok());
    }

    #[test]
    fn mirror_keeps_interfaces_on_the_loop() {
        let mut store = PatternStore::new();
        let id = store.add_panel(rectangle("a"));
        let panel = store.panel_mut(id).unwrap();
        let top = panel.key_at(1).unwrap();
        panel.set_interface("top", Interface::from_edge(id, top));
        panel.mirror(&Vector2::y());
        assert_eq!(panel.key_at(2).unwrap(), top);
        assert_eq!(panel.geometric_ids(top), vec![2]);
        assert!(panel.interface("top").unwrap().instances()[0].reversed);
        let resolved = store.interface(id, "top").unwrap().resolve(&store).unwrap();
        assert_eq!(resolved[0].edge_id, 2);
    }

    #[test]
    fn split_keys_forward_to_parts() {
        let mut panel = rectangle("a");
        let top = panel.key_at(1).unwrap();
        let parts = panel.split_edge(1, &[0.5, 0.5]).unwrap();
        assert_eq!(panel.edges().len(), 5);
        assert_eq!(panel.geometric_ids(top), vec![1, 2]);
        assert_eq!(panel.keys()[1..3], parts[..]);

        // Splitting a part again keeps the whole edge covered.
        panel.split_edge(2, &[0.4, 0.6]).unwrap();
        assert_eq!(panel.geometric_ids(top), vec![1, 2, 3]);
        assert_eq!(panel.geometric_ids(parts[0]), vec![1]);
        assert!(panel.edges().is_closed());
        assert!(panel.split_edge(9, &[1.0]).is_err());
    }

    #[test]
    fn keys_found_by_shape() {
        let mut panel = rectangle("a");
        let right = panel.edges()[2].reversed();
        assert_eq!(panel.key_of(&right), Some(panel.key_at(2).unwrap()));
        assert!(panel.keys_of([&Edge::line(p(0.0, 0.0), p(1.0, 1.0))]).is_err());

        let cut = EdgeSequence::from_verts(&[p(35.0, 10.0), p(30.0, 5.0), p(35.0, 0.0)]);
        let fresh = panel.substitute_edge(2, cut).unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(panel.keys_of([&panel.edges()[3].clone()]).unwrap(), vec![fresh[1]]);
        assert!(panel.validate(true).is_ok());
    }

    #[test]
    fn swap_right_wrong_keeps_footprint() {
        let mut panel = rectangle("a");
        panel.translate_by(&Vector3::new(3.0, 4.0, 5.0));
        let before = panel.bbox3d().unwrap();
        panel.swap_right_wrong();
        let after = panel.bbox3d().unwrap();
        assert_point3(&after.min, &before.min);
        assert_point3(&after.max, &before.max);
        // Normal flipped from +z to -z.
        let normal = panel.rotation() * Vector3::z();
        assert_relative_eq!(normal.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn validation_catches_open_and_crossing_loops() {
        let open = Panel::new("open", EdgeSequence::from_verts(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]));
        assert!(matches!(
            open.validate(true).unwrap_err(),
            PatternError::Topology(TopologyError::LoopNotClosed(name)) if name == "open"
        ));

        let bowtie = Panel::new(
            "bowtie",
            EdgeSequence::from_verts(&[p(0.0, 0.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 2.0)]).closed(),
        );
        assert!(matches!(
            bowtie.validate(true).unwrap_err(),
            PatternError::Topology(TopologyError::SelfIntersecting(_))
        ));
        assert!(bowtie.validate(false).is_ok());
        assert!(Panel::new("empty", EdgeSequence::new()).validate(true).is_err());
    }

    #[test]
    fn record_roundtrip() {
        let mut edges = EdgeSequence::from_verts(&[p(0.0, 0.0), p(0.0, 10.0)]);
        edges
            .push(Edge::quadratic(p(0.0, 10.0), p(20.0, 10.0), Vector2::new(0.5, 0.1)))
            .unwrap();
        edges.push(Edge::circle(p(20.0, 10.0), p(20.0, 0.0), 8.0, false, true)).unwrap();
        let mut panel = Panel::new("curvy", edges.closed());
        panel.set_pivot(p(10.0, 10.0), true);
        panel.rotate_by(&rotation_from_euler_deg(0.0, 45.0, 0.0));

        let record = panel.to_record();
        assert_eq!(record.vertices.len(), 4);
        assert_eq!(record.vertices[0], [-10.0, -10.0]);
        assert_eq!(record.edges[3].endpoints, [3, 0]);
        assert!(record.edges[0].curvature.is_none());

        let back = Panel::from_record("curvy", &record).unwrap();
        assert_eq!(back.edges().len(), 4);
        assert!(matches!(back.edges()[1].curvature, Some(Curvature::Quadratic { .. })));
        let original = panel.bbox3d().unwrap();
        let restored = back.bbox3d().unwrap();
        assert_point3(&original.min, &restored.min);
        assert_point3(&original.max, &restored.max);
    }
}
