use super::{Point2, Point3};

/// An axis-aligned bounding box in pattern space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2 {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl BoundingBox2 {
    /// Bounding box of a set of points, `None` when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self { min: first, max: first };
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox3 {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl BoundingBox3 {
    /// Bounding box of a set of points, `None` when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self { min: first, max: first };
        for p in iter {
            bbox.min = bbox.min.inf(p);
            bbox.max = bbox.max.sup(p);
        }
        Some(bbox)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}
