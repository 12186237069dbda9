/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc (bulges to the right of the chord)
/// - `bulge < 0`: clockwise arc (bulges to the left of the chord)
/// - `|bulge| = 1`: semicircle
use std::f64::consts::PI;

use super::{Point2, Vector2, TOLERANCE};

/// Circular arc in center-radius-angle form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterArc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep angle, positive for counter-clockwise.
    pub sweep: f64,
}

impl CenterArc {
    /// Evaluates a point on the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        let angle = self.start_angle + self.sweep * t;
        self.center + Vector2::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Arc length of the whole arc.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }
}

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `None` for zero-length chords or (near) zero bulge.
#[must_use]
pub fn arc_from_bulge(p0: &Point2, p1: &Point2, bulge: f64) -> Option<CenterArc> {
    let d = p1 - p0;
    let chord_len = d.norm();
    if chord_len < TOLERANCE || bulge.abs() < 1e-12 {
        return None;
    }

    // Signed distance from chord midpoint to center, measured along the left normal.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mid = nalgebra::center(p0, p1);
    let normal = Vector2::new(-d.y, d.x) / chord_len;
    let center = mid + normal * (sagitta_ratio * chord_len * 0.5);

    // r = d*(1+b²)/(4*|b|), from r = d/(2*sin(θ/2)) with θ = 4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    let start_angle = (p0.y - center.y).atan2(p0.x - center.x);

    Some(CenterArc {
        center,
        radius,
        start_angle,
        sweep: 4.0 * bulge.atan(),
    })
}

/// Converts arc endpoints + center back to a bulge value.
///
/// `is_ccw`: true for counter-clockwise arc, false for clockwise.
#[must_use]
pub fn bulge_from_arc(p0: &Point2, p1: &Point2, center: &Point2, is_ccw: bool) -> f64 {
    let start_angle = (p0.y - center.y).atan2(p0.x - center.x);
    let end_angle = (p1.y - center.y).atan2(p1.x - center.x);

    let mut sweep = end_angle - start_angle;
    if is_ccw {
        if sweep < 0.0 {
            sweep += 2.0 * PI;
        }
    } else if sweep > 0.0 {
        sweep -= 2.0 * PI;
    }

    (sweep / 4.0).tan()
}

/// Converts `(radius, large_arc, right)` circle parameters over a chord to a bulge.
///
/// A radius shorter than half the chord cannot span it; it is clamped to a
/// semicircle and the second return value is `true`.
#[must_use]
pub fn bulge_from_circle(chord_len: f64, radius: f64, large_arc: bool, right: bool) -> (f64, bool) {
    let half = chord_len * 0.5;
    if half < TOLERANCE {
        return (0.0, false);
    }
    let clamped = radius < half;
    let ratio = if clamped { 1.0 } else { half / radius };
    let small_sweep = 2.0 * ratio.asin();
    let sweep = if large_arc { 2.0 * PI - small_sweep } else { small_sweep };
    let sign = if right { 1.0 } else { -1.0 };
    (sign * (sweep / 4.0).tan(), clamped)
}

/// Center of the circle through three points, or `None` if they are colinear.
#[must_use]
pub fn circle_center_through(a: &Point2, b: &Point2, c: &Point2) -> Option<Point2> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < TOLERANCE {
        return None;
    }
    let a2 = a.coords.norm_squared();
    let b2 = b.coords.norm_squared();
    let c2 = c.coords.norm_squared();
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    Some(Point2::new(ux, uy))
}

/// Computes the number of line segments needed to approximate an arc
/// within the given tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}
