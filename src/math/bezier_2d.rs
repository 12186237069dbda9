//! Bézier evaluation on control polygons of any degree.

use super::{Point2, Vector2};

/// Evaluates a Bézier curve at `t` with de Casteljau's algorithm.
///
/// Returns the origin for an empty control polygon.
#[must_use]
pub fn bezier_point(controls: &[Point2], t: f64) -> Point2 {
    let mut pts: Vec<Point2> = controls.to_vec();
    let n = pts.len();
    if n == 0 {
        return Point2::origin();
    }
    for level in 1..n {
        for i in 0..n - level {
            pts[i] = pts[i] + (pts[i + 1] - pts[i]) * t;
        }
    }
    pts[0]
}

/// First derivative of a Bézier curve at `t`.
#[must_use]
pub fn bezier_derivative(controls: &[Point2], t: f64) -> Vector2 {
    let n = controls.len();
    if n < 2 {
        return Vector2::zeros();
    }
    #[allow(clippy::cast_precision_loss)]
    let degree = (n - 1) as f64;
    let hodograph: Vec<Point2> = controls
        .windows(2)
        .map(|w| Point2::from((w[1] - w[0]) * degree))
        .collect();
    bezier_point(&hodograph, t).coords
}

/// Splits a Bézier curve at `t` into two control polygons of the same degree.
#[must_use]
pub fn bezier_split(controls: &[Point2], t: f64) -> (Vec<Point2>, Vec<Point2>) {
    let n = controls.len();
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut pts: Vec<Point2> = controls.to_vec();
    for level in 0..n {
        left.push(pts[0]);
        right.push(pts[n - 1 - level]);
        for i in 0..n - 1 - level {
            pts[i] = pts[i] + (pts[i + 1] - pts[i]) * t;
        }
    }
    right.reverse();
    (left, right)
}

/// Arc length of a Bézier curve between parameters `t0` and `t1`.
#[must_use]
pub fn bezier_length_between(controls: &[Point2], t0: f64, t1: f64) -> f64 {
    let (a, b) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
    adaptive_arc_length(&|t| bezier_derivative(controls, t).norm(), a, b, 1e-10, 20)
}

/// Arc length of the whole Bézier curve.
#[must_use]
pub fn bezier_length(controls: &[Point2]) -> f64 {
    bezier_length_between(controls, 0.0, 1.0)
}

/// Adaptive Simpson integration of a speed function.
fn adaptive_arc_length(speed: &dyn Fn(f64) -> f64, a: f64, b: f64, tolerance: f64, max_depth: usize) -> f64 {
    fn simpson_step(speed: &dyn Fn(f64) -> f64, a: f64, b: f64) -> f64 {
        let mid = (a + b) / 2.0;
        (b - a) / 6.0 * (speed(a) + 4.0 * speed(mid) + speed(b))
    }

    fn helper(speed: &dyn Fn(f64) -> f64, a: f64, b: f64, tolerance: f64, whole: f64, depth: usize) -> f64 {
        let mid = (a + b) / 2.0;
        let left = simpson_step(speed, a, mid);
        let right = simpson_step(speed, mid, b);
        let combined = left + right;

        if depth == 0 || (combined - whole).abs() < 15.0 * tolerance {
            combined + (combined - whole) / 15.0
        } else {
            helper(speed, a, mid, tolerance / 2.0, left, depth - 1)
                + helper(speed, mid, b, tolerance / 2.0, right, depth - 1)
        }
    }

    let whole = simpson_step(speed, a, b);
    helper(speed, a, b, tolerance, whole, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn quadratic_midpoint() {
        let ctrl = [p(0.0, 0.0), p(1.0, 2.0), p(2.0, 0.0)];
        let m = bezier_point(&ctrl, 0.5);
        assert_relative_eq!(m.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn straight_cubic_length_matches_chord() {
        let ctrl = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        assert_relative_eq!(bezier_length(&ctrl), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn quadratic_length_closed_form() {
        // y = x^2 parabola segment from (0,0) to (1,1): control (0.5, 0).
        let ctrl = [p(0.0, 0.0), p(0.5, 0.0), p(1.0, 1.0)];
        let expected = (5.0_f64.sqrt() / 2.0) + (2.0 + 5.0_f64.sqrt()).ln() / 4.0;
        assert_relative_eq!(bezier_length(&ctrl), expected, epsilon = 1e-8);
    }

    #[test]
    fn split_preserves_curve() {
        let ctrl = [p(0.0, 0.0), p(1.0, 3.0), p(3.0, -1.0), p(4.0, 1.0)];
        let (left, right) = bezier_split(&ctrl, 0.3);
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 4);
        let on_curve = bezier_point(&ctrl, 0.3);
        assert_relative_eq!(left[3].x, on_curve.x, epsilon = 1e-12);
        assert_relative_eq!(right[0].y, on_curve.y, epsilon = 1e-12);

        let a = bezier_point(&right, 0.5);
        let b = bezier_point(&ctrl, 0.65);
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-12);

        let total = bezier_length(&ctrl);
        assert_relative_eq!(bezier_length(&left) + bezier_length(&right), total, epsilon = 1e-8);
    }
}
