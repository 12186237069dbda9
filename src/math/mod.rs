pub mod arc_2d;
pub mod bbox;
pub mod bezier_2d;
pub mod distance_2d;
pub mod polygon_2d;

pub use bbox::{BoundingBox2, BoundingBox3};

/// 2D point type (pattern space, centimeters).
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3D rotation used for panel placement.
pub type Rotation = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Maximum distance at which two pattern points are considered coincident.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Default relative tolerance for comparing stitched lengths.
pub const LENGTH_TOLERANCE: f64 = 1e-3;

/// Builds a rotation from extrinsic X, Y, Z Euler angles given in degrees.
#[must_use]
pub fn rotation_from_euler_deg(x: f64, y: f64, z: f64) -> Rotation {
    Rotation::from_euler_angles(x.to_radians(), y.to_radians(), z.to_radians())
}

/// Returns the extrinsic X, Y, Z Euler angles of a rotation in degrees.
#[must_use]
pub fn rotation_to_euler_deg(rotation: &Rotation) -> [f64; 3] {
    let (x, y, z) = rotation.euler_angles();
    [x.to_degrees(), y.to_degrees(), z.to_degrees()]
}

/// Rotates a 2D vector counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate_2d(v: &Vector2, angle: f64) -> Vector2 {
    let (s, c) = angle.sin_cos();
    Vector2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Reflects a 2D vector across the line through the origin with direction `axis`.
///
/// Returns the vector unchanged if `axis` is zero-length.
#[must_use]
pub fn reflect_2d(v: &Vector2, axis: &Vector2) -> Vector2 {
    let len = axis.norm();
    if len < TOLERANCE {
        return *v;
    }
    let a = axis / len;
    a * (2.0 * v.dot(&a)) - v
}

/// Left-pointing normal of a 2D vector (rotated by +90°).
#[must_use]
pub fn left_normal(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Relative closeness test used for lengths: `|a - b| <= tol * max(|a|, |b|)`.
#[must_use]
pub fn relative_eq(a: f64, b: f64, tol: f64) -> bool {
    let scale = a.abs().max(b.abs());
    if scale < TOLERANCE {
        return true;
    }
    (a - b).abs() <= tol * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn euler_roundtrip() {
        let r = rotation_from_euler_deg(10.0, -35.0, 70.0);
        let [x, y, z] = rotation_to_euler_deg(&r);
        assert_relative_eq!(x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(y, -35.0, epsilon = 1e-9);
        assert_relative_eq!(z, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn reflect_across_y_axis_negates_x() {
        let v = reflect_2d(&Vector2::new(3.0, 4.0), &Vector2::new(0.0, 2.0));
        assert_relative_eq!(v.x, -3.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = rotate_2d(&Vector2::new(1.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn relative_eq_scales_with_magnitude() {
        assert!(relative_eq(100.0, 100.05, 1e-3));
        assert!(!relative_eq(100.0, 100.5, 1e-3));
        assert!(relative_eq(0.0, 0.0, 1e-3));
    }
}
