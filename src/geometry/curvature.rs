use crate::math::{left_normal, Point2, Vector2, TOLERANCE};

/// Shape of a curved edge, expressed in the frame of the edge's chord.
///
/// Control points are stored as `(x, y)` where `x` runs along the chord
/// (`0` at the start, `1` at the end) and `y` along the chord rotated by +90°,
/// both in units of the chord length. Moving or rotating the endpoints moves
/// the curve with them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curvature {
    /// Quadratic Bézier with one chord-relative control point.
    Quadratic { control: Vector2 },
    /// Cubic Bézier with two chord-relative control points.
    Cubic { controls: [Vector2; 2] },
    /// Circular arc.
    ///
    /// `right` is `true` when the arc bulges to the right of the start→end
    /// direction. `large_arc` selects the longer of the two arcs.
    Circle {
        radius: f64,
        large_arc: bool,
        right: bool,
    },
}

impl Curvature {
    /// Curvature of the same curve traversed from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Quadratic { control } => Self::Quadratic {
                control: flip_frame(&control),
            },
            Self::Cubic { controls } => Self::Cubic {
                controls: [flip_frame(&controls[1]), flip_frame(&controls[0])],
            },
            Self::Circle {
                radius,
                large_arc,
                right,
            } => Self::Circle {
                radius,
                large_arc,
                right: !right,
            },
        }
    }

    /// Curvature after reflecting the edge's endpoints across a line.
    ///
    /// A reflection swaps the sides of the chord, so perpendicular offsets
    /// change sign.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        match *self {
            Self::Quadratic { control } => Self::Quadratic {
                control: Vector2::new(control.x, -control.y),
            },
            Self::Cubic { controls } => Self::Cubic {
                controls: controls.map(|c| Vector2::new(c.x, -c.y)),
            },
            Self::Circle {
                radius,
                large_arc,
                right,
            } => Self::Circle {
                radius,
                large_arc,
                right: !right,
            },
        }
    }

    /// Curvature after the chord was scaled by `factor`.
    ///
    /// Chord-relative controls are scale-free; only the absolute arc radius changes.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            Self::Circle {
                radius,
                large_arc,
                right,
            } => Self::Circle {
                radius: radius * factor.abs(),
                large_arc,
                right,
            },
            other => other,
        }
    }

    /// Structural comparison within `tol`.
    #[must_use]
    pub fn is_close(&self, other: &Self, tol: f64) -> bool {
        match (self, other) {
            (Self::Quadratic { control: a }, Self::Quadratic { control: b }) => (a - b).norm() <= tol,
            (Self::Cubic { controls: a }, Self::Cubic { controls: b }) => {
                (a[0] - b[0]).norm() <= tol && (a[1] - b[1]).norm() <= tol
            }
            (
                Self::Circle {
                    radius: ra,
                    large_arc: la,
                    right: sa,
                },
                Self::Circle {
                    radius: rb,
                    large_arc: lb,
                    right: sb,
                },
            ) => (ra - rb).abs() <= tol && la == lb && sa == sb,
            _ => false,
        }
    }
}

/// Re-expresses a chord-relative point in the frame of the reversed chord.
fn flip_frame(c: &Vector2) -> Vector2 {
    Vector2::new(1.0 - c.x, -c.y)
}

/// Converts a chord-relative control point to absolute coordinates.
#[must_use]
pub fn to_absolute(start: &Point2, end: &Point2, relative: &Vector2) -> Point2 {
    let chord = end - start;
    start + chord * relative.x + left_normal(&chord) * relative.y
}

/// Converts an absolute point to chord-relative coordinates.
///
/// Returns `None` when the chord has zero length.
#[must_use]
pub fn to_relative(start: &Point2, end: &Point2, absolute: &Point2) -> Option<Vector2> {
    let chord = end - start;
    let len_sq = chord.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    let offset = absolute - start;
    Some(Vector2::new(
        offset.dot(&chord) / len_sq,
        offset.dot(&left_normal(&chord)) / len_sq,
    ))
}
