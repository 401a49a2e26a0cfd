//! Running axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box grown one point at a time.
///
/// A fresh box is empty: its minimum is `+inf` and its maximum `-inf` on
/// every axis, so the first [`include`](Self::include) sets both corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// An empty box containing nothing.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Whether no point has been included yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: &Point3<f64>) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Centre of the box, `None` while empty.
    pub fn center(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        Some(Point3::from((self.min.coords + self.max.coords) * 0.5))
    }

    /// Extent along each axis, zero while empty.
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box() {
        let bb = BoundingBox::default();
        assert!(bb.is_empty());
        assert_eq!(bb.center(), None);
        assert_eq!(bb.size(), Vector3::zeros());
    }

    #[test]
    fn test_include() {
        let mut bb = BoundingBox::empty();
        bb.include(&Point3::new(1.0, -2.0, 3.0));
        assert!(!bb.is_empty());
        assert_eq!(bb.min, bb.max);

        bb.include(&Point3::new(-1.0, 4.0, 5.0));
        assert_eq!(bb.min, Point3::new(-1.0, -2.0, 3.0));
        assert_eq!(bb.max, Point3::new(1.0, 4.0, 5.0));
        assert_eq!(bb.center(), Some(Point3::new(0.0, 1.0, 4.0)));
        assert_eq!(bb.size(), Vector3::new(2.0, 6.0, 2.0));
    }
}
