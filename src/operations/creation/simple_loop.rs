use crate::geometry::EdgeSequence;
use crate::math::Point2;

/// Creates a closed straight-edged loop that starts at the origin and
/// visits the given vertices in order.
pub struct SimpleLoop {
    verts: Vec<Point2>,
}

impl SimpleLoop {
    /// Creates a new `SimpleLoop` operation. The origin is implied as the
    /// first vertex and must not be repeated.
    #[must_use]
    pub fn new(verts: Vec<Point2>) -> Self {
        Self { verts }
    }

    /// Executes the operation.
    #[must_use]
    pub fn execute(&self) -> EdgeSequence {
        let mut verts = Vec::with_capacity(self.verts.len() + 1);
        verts.push(Point2::origin());
        verts.extend_from_slice(&self.verts);
        EdgeSequence::from_verts(&verts).closed()
    }
}
