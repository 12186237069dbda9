use crate::error::{GeometryError, Result};
use crate::geometry::EdgeSequence;
use crate::math::Point2;

use super::FromFractions;

/// Creates a straight side from `start` to `end`, with optional pieces of
/// the given length fractions split off at either end.
///
/// A zero cut produces no piece, so the result has one to three edges.
pub struct SideWithCut {
    start: Point2,
    end: Point2,
    start_cut: f64,
    end_cut: f64,
}

impl SideWithCut {
    /// Creates a new `SideWithCut` operation.
    #[must_use]
    pub fn new(start: Point2, end: Point2, start_cut: f64, end_cut: f64) -> Self {
        Self {
            start,
            end,
            start_cut,
            end_cut,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if a cut is negative or the two cuts exceed the side.
    pub fn execute(&self) -> Result<EdgeSequence> {
        let middle = 1.0 - self.start_cut - self.end_cut;
        if self.start_cut < 0.0 || self.end_cut < 0.0 || middle <= 0.0 {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "side cut",
                value: self.start_cut + self.end_cut,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        let fractions: Vec<f64> = [self.start_cut, middle, self.end_cut]
            .into_iter()
            .filter(|f| *f > 0.0)
            .collect();
        FromFractions::new(self.start, self.end, fractions).execute()
    }
}
