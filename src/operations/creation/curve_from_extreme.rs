use tracing::warn;

use crate::geometry::curvature::to_relative;
use crate::geometry::Edge;
use crate::math::{Point2, Vector2};

/// Relative offsets below this are treated as lying on the chord.
const COLINEAR_TOLERANCE: f64 = 1e-6;

/// Fits a quadratic edge from `start` to `end` whose midpoint (t = 0.5)
/// passes through `target_extreme`.
///
/// Used to approximate silhouette curves such as the hip-to-waist taper
/// from three measured points.
pub struct CurveFromExtreme {
    start: Point2,
    end: Point2,
    target_extreme: Point2,
}

impl CurveFromExtreme {
    /// Creates a new `CurveFromExtreme` operation.
    #[must_use]
    pub fn new(start: Point2, end: Point2, target_extreme: Point2) -> Self {
        Self {
            start,
            end,
            target_extreme,
        }
    }

    /// Executes the fit.
    ///
    /// A target on the chord (or a zero-length chord) yields a straight edge.
    #[must_use]
    pub fn execute(&self) -> Edge {
        let Some(target) = to_relative(&self.start, &self.end, &self.target_extreme) else {
            warn!("curve from extreme over a zero-length chord, using a straight edge");
            return Edge::line(self.start, self.end);
        };
        if target.y.abs() < COLINEAR_TOLERANCE {
            warn!(
                x = self.target_extreme.x,
                y = self.target_extreme.y,
                "curve extreme lies on the chord, using a straight edge"
            );
            return Edge::line(self.start, self.end);
        }
        // B(0.5) = (s + 2c + e) / 4, so c = 2 * target - (s + e) / 2.
        let control = Vector2::new(2.0 * target.x - 0.5, 2.0 * target.y);
        Edge::quadratic(self.start, self.end, control)
    }
}
