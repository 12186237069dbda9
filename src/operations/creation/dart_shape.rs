use crate::error::{GeometryError, Result};
use crate::geometry::EdgeSequence;
use crate::math::Point2;

/// Creates a symmetric V-shaped dart template.
///
/// The dart runs from `(0, 0)` through the apex `(width / 2, -depth)` to
/// `(width, 0)`, so with the opening along +x the apex points to the right
/// of the edge direction.
pub struct DartShape {
    width: f64,
    depth: f64,
}

impl DartShape {
    /// Creates a new `DartShape` operation.
    #[must_use]
    pub fn new(width: f64, depth: f64) -> Self {
        Self { width, depth }
    }

    /// Dart of the given opening width whose legs have length `side`.
    ///
    /// # Errors
    ///
    /// Returns an error if `side` is shorter than half the width.
    pub fn from_side_length(width: f64, side: f64) -> Result<Self> {
        let half = width / 2.0;
        if side < half {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "dart side",
                value: side,
                min: half,
                max: f64::INFINITY,
            }
            .into());
        }
        Ok(Self::new(width, (side * side - half * half).sqrt()))
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the width or depth is not positive.
    pub fn execute(&self) -> Result<EdgeSequence> {
        for (parameter, value) in [("dart width", self.width), ("dart depth", self.depth)] {
            if value <= 0.0 {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter,
                    value,
                    min: 0.0,
                    max: f64::INFINITY,
                }
                .into());
            }
        }
        Ok(EdgeSequence::from_verts(&[
            Point2::origin(),
            Point2::new(self.width / 2.0, -self.depth),
            Point2::new(self.width, 0.0),
        ]))
    }
}
