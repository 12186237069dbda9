use tracing::warn;

use crate::error::{GeometryError, Result};
use crate::math::arc_2d::{
    arc_from_bulge, arc_subdivision_count, bulge_from_arc, bulge_from_circle, circle_center_through, CenterArc,
};
use crate::math::bezier_2d::{bezier_length, bezier_length_between, bezier_point, bezier_split};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::{reflect_2d, rotate_2d, Point2, Vector2, POINT_TOLERANCE, TOLERANCE};

use super::curvature::{to_absolute, to_relative, Curvature};
use super::sequence::EdgeSequence;

/// Upper bound on the number of segments a single curved edge flattens into.
const MAX_FLATTEN_SEGMENTS: u32 = 256;

/// A single boundary segment of a panel, straight or curved.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub start: Point2,
    pub end: Point2,
    /// `None` for a straight edge.
    pub curvature: Option<Curvature>,
}

impl Edge {
    /// Creates an edge with the given chord-relative curvature.
    #[must_use]
    pub fn new(start: Point2, end: Point2, curvature: Option<Curvature>) -> Self {
        if (end - start).norm() < TOLERANCE {
            warn!(x = start.x, y = start.y, "zero-length edge");
        }
        Self { start, end, curvature }
    }

    /// Creates a straight edge.
    #[must_use]
    pub fn line(start: Point2, end: Point2) -> Self {
        Self::new(start, end, None)
    }

    /// Creates a quadratic Bézier edge from a chord-relative control point.
    #[must_use]
    pub fn quadratic(start: Point2, end: Point2, control: Vector2) -> Self {
        Self::new(start, end, Some(Curvature::Quadratic { control }))
    }

    /// Creates a quadratic Bézier edge from an absolute control point.
    ///
    /// Falls back to a straight edge when the chord is degenerate.
    #[must_use]
    pub fn quadratic_through_control(start: Point2, end: Point2, control: Point2) -> Self {
        match to_relative(&start, &end, &control) {
            Some(control) => Self::quadratic(start, end, control),
            None => {
                warn!("quadratic edge over a zero-length chord, using a straight edge");
                Self::line(start, end)
            }
        }
    }

    /// Creates a cubic Bézier edge from two chord-relative control points.
    #[must_use]
    pub fn cubic(start: Point2, end: Point2, controls: [Vector2; 2]) -> Self {
        Self::new(start, end, Some(Curvature::Cubic { controls }))
    }

    /// Creates a circular arc edge.
    ///
    /// A radius shorter than half the chord is treated as a semicircle.
    #[must_use]
    pub fn circle(start: Point2, end: Point2, radius: f64, large_arc: bool, right: bool) -> Self {
        let half_chord = (end - start).norm() * 0.5;
        if radius < half_chord {
            warn!(radius, half_chord, "arc radius cannot span the chord, using a semicircle");
        }
        Self::new(
            start,
            end,
            Some(Curvature::Circle {
                radius,
                large_arc,
                right,
            }),
        )
    }

    /// Creates the circular arc from `start` to `end` passing through `point`.
    ///
    /// Falls back to a straight edge when the three points are colinear.
    #[must_use]
    pub fn arc_through(start: Point2, end: Point2, point: Point2) -> Self {
        let Some(center) = circle_center_through(&start, &point, &end) else {
            warn!("arc through colinear points, using a straight edge");
            return Self::line(start, end);
        };
        let radius = (start - center).norm();
        // The arc bulges towards `point`: right of the chord means clockwise side.
        let chord = end - start;
        let side = chord.x * (point.y - start.y) - chord.y * (point.x - start.x);
        let right = side < 0.0;
        let bulge = bulge_from_arc(&start, &end, &center, right);
        let large_arc = bulge.abs() > 1.0;
        Self::circle(start, end, radius, large_arc, right)
    }

    /// Returns `true` for an edge without curvature.
    #[must_use]
    pub fn is_straight(&self) -> bool {
        self.curvature.is_none()
    }

    /// Vector from start to end.
    #[must_use]
    pub fn chord(&self) -> Vector2 {
        self.end - self.start
    }

    /// Absolute Bézier control polygon (endpoints included) of a Bézier edge.
    #[must_use]
    pub fn bezier_controls(&self) -> Option<Vec<Point2>> {
        match &self.curvature {
            Some(Curvature::Quadratic { control }) => Some(vec![
                self.start,
                to_absolute(&self.start, &self.end, control),
                self.end,
            ]),
            Some(Curvature::Cubic { controls }) => Some(vec![
                self.start,
                to_absolute(&self.start, &self.end, &controls[0]),
                to_absolute(&self.start, &self.end, &controls[1]),
                self.end,
            ]),
            _ => None,
        }
    }

    /// Center form of a circular arc edge.
    #[must_use]
    pub fn center_arc(&self) -> Option<CenterArc> {
        match self.curvature {
            Some(Curvature::Circle {
                radius,
                large_arc,
                right,
            }) => {
                let (bulge, _) = bulge_from_circle(self.chord().norm(), radius, large_arc, right);
                arc_from_bulge(&self.start, &self.end, bulge)
            }
            _ => None,
        }
    }

    /// Arc length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        match &self.curvature {
            None => self.chord().norm(),
            Some(Curvature::Circle { .. }) => self.center_arc().map_or_else(|| self.chord().norm(), |arc| arc.length()),
            Some(_) => self.bezier_controls().map_or(0.0, |ctrl| bezier_length(&ctrl)),
        }
    }

    /// Evaluates the edge at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        if let Some(ctrl) = self.bezier_controls() {
            return bezier_point(&ctrl, t);
        }
        if let Some(arc) = self.center_arc() {
            return arc.point_at(t);
        }
        self.start + self.chord() * t
    }

    /// Parameter at which the arc length from the start equals `s`.
    ///
    /// Clamps to `[0, 1]` if `s` is outside `[0, length]`.
    #[must_use]
    pub fn param_at_length(&self, s: f64) -> f64 {
        let total = self.length();
        if s <= 0.0 || total < TOLERANCE {
            return 0.0;
        }
        if s >= total {
            return 1.0;
        }
        let Some(ctrl) = self.bezier_controls() else {
            // Lines and arcs are parameterized proportionally to arc length.
            return s / total;
        };

        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..60 {
            let mid = (lo + hi) / 2.0;
            let arc = bezier_length_between(&ctrl, 0.0, mid);
            if (arc - s).abs() < 1e-10 {
                return mid;
            }
            if arc < s {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) / 2.0
    }

    /// Point at arc length `s` from the start.
    #[must_use]
    pub fn point_at_length(&self, s: f64) -> Point2 {
        self.point_at(self.param_at_length(s))
    }

    /// Splits the edge at parameter `t`, keeping the shape of the curve.
    #[must_use]
    pub fn split_at(&self, t: f64) -> (Self, Self) {
        let t = t.clamp(0.0, 1.0);
        let mid = self.point_at(t);

        if let Some(ctrl) = self.bezier_controls() {
            let (left, right) = bezier_split(&ctrl, t);
            return (
                Self::from_bezier(self.start, mid, &left),
                Self::from_bezier(mid, self.end, &right),
            );
        }

        if let Some(arc) = self.center_arc() {
            let piece = |start: Point2, end: Point2, sweep: f64| {
                let (radius, right) = (arc.radius, sweep > 0.0);
                Self {
                    start,
                    end,
                    curvature: Some(Curvature::Circle {
                        radius,
                        large_arc: sweep.abs() > std::f64::consts::PI,
                        right,
                    }),
                }
            };
            return (
                piece(self.start, mid, arc.sweep * t),
                piece(mid, self.end, arc.sweep * (1.0 - t)),
            );
        }

        (Self::line(self.start, mid), Self::line(mid, self.end))
    }

    /// Portion of the edge between parameters `t0 <= t1`.
    pub(crate) fn segment(&self, t0: f64, t1: f64) -> Self {
        if t0 <= 0.0 {
            return self.split_at(t1).0;
        }
        if t1 >= 1.0 {
            return self.split_at(t0).1;
        }
        let (head, _) = self.split_at(t1);
        head.split_at(t0 / t1).1
    }

    /// Subdivides the edge into consecutive pieces whose arc lengths are the
    /// given fractions of the edge length.
    ///
    /// # Errors
    ///
    /// Returns an error if a fraction is negative or the fractions do not sum to 1.
    pub fn subdivide(&self, fractions: &[f64]) -> Result<EdgeSequence> {
        check_fractions(fractions)?;
        let total = self.length();

        let mut params = Vec::with_capacity(fractions.len() + 1);
        params.push(0.0);
        let mut acc = 0.0;
        for frac in &fractions[..fractions.len() - 1] {
            acc += frac;
            params.push(self.param_at_length(acc * total));
        }
        params.push(1.0);

        let boundary: Vec<Point2> = params
            .iter()
            .enumerate()
            .map(|(i, &t)| match i {
                0 => self.start,
                _ if i == params.len() - 1 => self.end,
                _ => self.point_at(t),
            })
            .collect();

        let mut pieces = EdgeSequence::new();
        for (i, w) in params.windows(2).enumerate() {
            let mut piece = self.segment(w[0], w[1]);
            piece.start = boundary[i];
            piece.end = boundary[i + 1];
            pieces.push(piece)?;
        }
        Ok(pieces)
    }

    /// Flattens the edge into a polyline, including both endpoints.
    ///
    /// `tolerance` bounds the distance between the curve and its approximation.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let segments = match &self.curvature {
            None => 1,
            Some(Curvature::Circle { .. }) => self.center_arc().map_or(1, |arc| {
                arc_subdivision_count(arc.radius, arc.sweep.abs(), tolerance).min(MAX_FLATTEN_SEGMENTS)
            }),
            Some(_) => self.bezier_controls().map_or(1, |ctrl| {
                // Control polygon deviation bounds the curve deviation from its chord.
                let deviation: f64 = ctrl
                    .iter()
                    .map(|p| point_to_segment_dist(p, &self.start, &self.end))
                    .fold(0.0, f64::max);
                if tolerance <= 0.0 {
                    MAX_FLATTEN_SEGMENTS
                } else {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let n = (deviation / tolerance).sqrt().ceil() as u32;
                    n.clamp(1, MAX_FLATTEN_SEGMENTS)
                }
            }),
        };

        let mut points = Vec::with_capacity(segments as usize + 1);
        points.push(self.start);
        for j in 1..segments {
            points.push(self.point_at(f64::from(j) / f64::from(segments)));
        }
        points.push(self.end);
        points
    }

    /// Returns the same curve traversed from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            curvature: self.curvature.map(|c| c.reversed()),
        }
    }

    /// Reverses the edge in place.
    pub fn reverse(&mut self) {
        *self = self.reversed();
    }

    /// Reflects the edge across the line through the origin with direction `axis`.
    #[must_use]
    pub fn mirrored(&self, axis: &Vector2) -> Self {
        Self {
            start: Point2::from(reflect_2d(&self.start.coords, axis)),
            end: Point2::from(reflect_2d(&self.end.coords, axis)),
            curvature: self.curvature.map(|c| c.mirrored()),
        }
    }

    /// Translates both endpoints.
    pub fn translate_by(&mut self, delta: &Vector2) {
        self.start += delta;
        self.end += delta;
    }

    /// Rotates the edge counter-clockwise by `angle` radians about `center`.
    pub fn rotate_about(&mut self, center: &Point2, angle: f64) {
        self.start = center + rotate_2d(&(self.start - center), angle);
        self.end = center + rotate_2d(&(self.end - center), angle);
    }

    /// Moves the endpoints, keeping the shape of the curve relative to the chord.
    pub fn set_endpoints(&mut self, start: Point2, end: Point2) {
        let old = self.chord().norm();
        let new = (end - start).norm();
        if old > TOLERANCE {
            self.curvature = self.curvature.map(|c| c.scaled(new / old));
        }
        self.start = start;
        self.end = end;
    }

    /// Structural equality within `tol`: same endpoints and same curvature.
    #[must_use]
    pub fn is_close(&self, other: &Self, tol: f64) -> bool {
        if (self.start - other.start).norm() > tol || (self.end - other.end).norm() > tol {
            return false;
        }
        match (&self.curvature, &other.curvature) {
            (None, None) => true,
            (Some(a), Some(b)) => a.is_close(b, tol),
            _ => false,
        }
    }

    /// Structural equality in either traversal direction.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.is_close(other, POINT_TOLERANCE) || self.is_close(&other.reversed(), POINT_TOLERANCE)
    }

    fn from_bezier(start: Point2, end: Point2, controls: &[Point2]) -> Self {
        let rel = |p: &Point2| to_relative(&start, &end, p);
        let curvature = match controls {
            [_, c, _] => rel(c).map(|control| Curvature::Quadratic { control }),
            [_, c1, c2, _] => rel(c1)
                .zip(rel(c2))
                .map(|(a, b)| Curvature::Cubic { controls: [a, b] }),
            _ => None,
        };
        Self { start, end, curvature }
    }
}

/// Validates subdivision fractions.
pub(crate) fn check_fractions(fractions: &[f64]) -> Result<()> {
    if fractions.is_empty() {
        return Err(GeometryError::Degenerate("no subdivision fractions".into()).into());
    }
    if let Some(&bad) = fractions.iter().find(|f| **f < 0.0) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "fraction",
            value: bad,
            min: 0.0,
            max: 1.0,
        }
        .into());
    }
    let sum: f64 = fractions.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: "sum of fractions",
            value: sum,
            min: 1.0,
            max: 1.0,
        }
        .into());
    }
    Ok(())
}
