use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(t, u)` with both in `[0, 1]` when the segments cross.
/// Parallel segments report no intersection.
#[must_use]
pub fn segment_segment_intersect_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        Some((t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Checks whether a closed polyline crosses itself.
///
/// The polyline is given by its vertices; the closing segment from the last
/// vertex back to the first is implied. Segments sharing a vertex are not
/// tested against each other.
#[must_use]
pub fn closed_polyline_self_intersects(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a0 = &points[i];
        let a1 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            // First and last segments share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = &points[j];
            let b1 = &points[(j + 1) % n];
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return true;
            }
        }
    }
    false
}
