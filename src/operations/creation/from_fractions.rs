use crate::error::Result;
use crate::geometry::{Edge, EdgeSequence};
use crate::math::Point2;

/// Splits the straight span `start`–`end` into consecutive edges whose
/// lengths are the given fractions of the span.
pub struct FromFractions {
    start: Point2,
    end: Point2,
    fractions: Vec<f64>,
}

impl FromFractions {
    /// Creates a new `FromFractions` operation.
    #[must_use]
    pub fn new(start: Point2, end: Point2, fractions: Vec<f64>) -> Self {
        Self { start, end, fractions }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if a fraction is negative or they do not sum to 1.
    pub fn execute(&self) -> Result<EdgeSequence> {
        Edge::line(self.start, self.end).subdivide(&self.fractions)
    }
}
