use crate::error::{GeometryError, Result, TopologyError};
use crate::geometry::{Edge, EdgeSequence};
use crate::math::{rotate_2d, Point2, Vector2, POINT_TOLERANCE, TOLERANCE};

/// Output of [`CutIntoEdge`].
#[derive(Debug, Clone)]
pub struct CutResult {
    /// Replacement for the target edge, from its start to its end.
    pub boundary: EdgeSequence,
    /// The inserted cut-shape edges (e.g. dart legs to be stitched together).
    pub inserted: EdgeSequence,
    /// The remaining pieces of the target edge, in order. They are not
    /// chained when the cut has an opening.
    pub open: Vec<Edge>,
}

/// Inserts a cut shape (dart, notch) into an edge.
///
/// The edge is split around the point at arc length `offset` from its start,
/// leaving a gap as wide as the chord of the cut shape. The shape is rotated
/// and uniformly scaled onto the gap.
pub struct CutIntoEdge {
    shape: EdgeSequence,
    target: Edge,
    offset: f64,
    right: bool,
}

impl CutIntoEdge {
    /// Creates a new `CutIntoEdge` operation.
    ///
    /// `offset` is the arc length from the start of `target` to the center
    /// of the cut. With `right` the shape keeps its authored side relative to
    /// the edge direction (a [`DartShape`](crate::operations::creation::DartShape)
    /// apex points to the right); otherwise it is mirrored across its chord.
    #[must_use]
    pub fn new(shape: EdgeSequence, target: Edge, offset: f64, right: bool) -> Self {
        Self {
            shape,
            target,
            offset,
            right,
        }
    }

    /// Executes the cut.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is empty or closed, or if the cut does
    /// not fit on the target edge.
    pub fn execute(&self) -> Result<CutResult> {
        let (Some(first), Some(last)) = (self.shape.first(), self.shape.last()) else {
            return Err(TopologyError::EmptySequence.into());
        };
        let shape_origin = first.start;
        let shape_chord = last.end - shape_origin;
        let width = shape_chord.norm();
        if width < TOLERANCE {
            return Err(GeometryError::Degenerate("cut shape has coincident endpoints".into()).into());
        }

        let length = self.target.length();
        let (s0, s1) = (self.offset - width / 2.0, self.offset + width / 2.0);
        if s0 < -POINT_TOLERANCE || s1 > length + POINT_TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "cut offset",
                value: self.offset,
                min: width / 2.0,
                max: length - width / 2.0,
            }
            .into());
        }

        let t0 = self.target.param_at_length(s0);
        let t1 = self.target.param_at_length(s1);
        let p0 = if s0 <= POINT_TOLERANCE { self.target.start } else { self.target.point_at(t0) };
        let p1 = if s1 >= length - POINT_TOLERANCE { self.target.end } else { self.target.point_at(t1) };

        let mut open = Vec::with_capacity(2);
        if s0 > POINT_TOLERANCE {
            let mut head = self.target.segment(0.0, t0);
            head.start = self.target.start;
            head.end = p0;
            open.push(head);
        }
        let split_at = open.len();
        if s1 < length - POINT_TOLERANCE {
            let mut tail = self.target.segment(t1, 1.0);
            tail.start = p1;
            tail.end = self.target.end;
            open.push(tail);
        }

        let inserted = self.place_shape(&shape_origin, &shape_chord, &p0, &p1)?;

        let mut boundary = EdgeSequence::from_edges(open[..split_at].iter().cloned())?;
        boundary.append(inserted.clone())?;
        boundary.append(EdgeSequence::from_edges(open[split_at..].iter().cloned())?)?;

        Ok(CutResult {
            boundary,
            inserted,
            open,
        })
    }

    /// Maps the shape so that its chord lands on `p0`–`p1`.
    fn place_shape(
        &self,
        origin: &Point2,
        chord: &Vector2,
        p0: &Point2,
        p1: &Point2,
    ) -> Result<EdgeSequence> {
        let target_chord = p1 - p0;
        let scale = target_chord.norm() / chord.norm();
        let shape_angle = chord.y.atan2(chord.x);
        let target_angle = target_chord.y.atan2(target_chord.x);

        // Shape frame: origin at the first vertex, chord along +x.
        let to_frame = |p: &Point2| Point2::from(rotate_2d(&(p - origin), -shape_angle));
        let to_target = |p: &Point2| p0 + rotate_2d(&p.coords, target_angle) * scale;

        let mut placed = EdgeSequence::new();
        let count = self.shape.len();
        for (i, edge) in self.shape.iter().enumerate() {
            let mut local = edge.clone();
            local.set_endpoints(to_frame(&edge.start), to_frame(&edge.end));
            if !self.right {
                local = local.mirrored(&Vector2::x());
            }
            let start = if i == 0 { *p0 } else { to_target(&local.start) };
            let end = if i + 1 == count { *p1 } else { to_target(&local.end) };
            local.set_endpoints(start, end);
            placed.push(local)?;
        }
        Ok(placed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Curvature;
    use crate::operations::creation::DartShape;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn dart_in_the_middle_of_an_edge() {
        let dart = DartShape::new(1.0, 5.0).execute().unwrap();
        let slant = dart[0].length();
        let target = Edge::line(p(0.0, 0.0), p(20.0, 0.0));
        let cut = CutIntoEdge::new(dart, target.clone(), 10.0, true).execute().unwrap();

        assert_eq!(cut.boundary.len(), 4);
        assert_eq!(cut.boundary.first().unwrap().start, target.start);
        assert_eq!(cut.boundary.last().unwrap().end, target.end);
        assert!(cut.boundary.is_chained());
        // The dart opening removes its 1 cm width from the edge, so the
        // boundary is 20 - 1 plus both legs rather than 20 plus both legs.
        assert_relative_eq!(cut.boundary.length(), 19.0 + 2.0 * slant, epsilon = 1e-9);

        // Two legs forming the single dart fold.
        assert_eq!(cut.inserted.len(), 2);
        assert_relative_eq!(cut.inserted[0].end.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(cut.inserted[0].end.y, -5.0, epsilon = 1e-9);

        assert_eq!(cut.open.len(), 2);
        assert_relative_eq!(cut.open[0].length(), 9.5, epsilon = 1e-9);
        assert_relative_eq!(cut.open[1].length(), 9.5, epsilon = 1e-9);
    }

    #[test]
    fn left_cut_is_mirrored() {
        let dart = DartShape::new(2.0, 3.0).execute().unwrap();
        let target = Edge::line(p(0.0, 0.0), p(0.0, 10.0));
        let cut = CutIntoEdge::new(dart, target, 4.0, false).execute().unwrap();
        // Edge runs along +y: right is +x, left is -x.
        let apex = cut.inserted[0].end;
        assert_relative_eq!(apex.x, -3.0, epsilon = 1e-9);
        assert_relative_eq!(apex.y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn cut_at_edge_start_has_no_head() {
        let dart = DartShape::new(2.0, 3.0).execute().unwrap();
        let target = Edge::line(p(0.0, 0.0), p(10.0, 0.0));
        let cut = CutIntoEdge::new(dart, target, 1.0, true).execute().unwrap();
        assert_eq!(cut.open.len(), 1);
        assert_eq!(cut.boundary.len(), 3);
        assert_eq!(cut.boundary[0].start, p(0.0, 0.0));
    }

    #[test]
    fn cut_into_curved_edge() {
        let dart = DartShape::new(1.0, 4.0).execute().unwrap();
        let target = Edge::quadratic(p(0.0, 0.0), p(30.0, 0.0), Vector2::new(0.5, 0.2));
        let cut = CutIntoEdge::new(dart, target.clone(), target.length() / 2.0, true)
            .execute()
            .unwrap();
        assert!(cut.boundary.is_chained());
        assert!(matches!(cut.open[0].curvature, Some(Curvature::Quadratic { .. })));
        assert_relative_eq!(
            cut.open[0].length() + cut.open[1].length() + 1.0,
            target.length(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn cut_must_fit_on_edge() {
        let dart = DartShape::new(4.0, 3.0).execute().unwrap();
        let target = Edge::line(p(0.0, 0.0), p(10.0, 0.0));
        assert!(CutIntoEdge::new(dart.clone(), target.clone(), 1.0, true).execute().is_err());
        assert!(CutIntoEdge::new(dart, target, 9.0, true).execute().is_err());
    }
}
