#![warn(missing_docs)]

//! Math types for the trimtree containment index.
//!
//! Thin wrappers around nalgebra for 2D surface parameter space,
//! plus the axis-aligned box used throughout the trim tree.

use nalgebra::Vector2;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Axis-aligned bounding box in `(u, v)` parameter space.
///
/// `min` holds `(umin, vmin)`, `max` holds `(umax, vmax)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner.
    pub min: Point2,
    /// Maximum corner.
    pub max: Point2,
}

impl Aabb2 {
    /// Create a box from min and max corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) box suitable for expansion.
    ///
    /// Every union with an empty box returns the other operand unchanged.
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::INFINITY, f64::INFINITY),
            max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// The tightest box holding two points.
    ///
    /// A NaN coordinate is dropped by `f64::min`/`f64::max`, so check
    /// finiteness first where that matters.
    pub fn from_points(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Expand this box to include a point.
    pub fn include_point(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand this box to include another box. Empty boxes are ignored.
    pub fn include_box(&mut self, other: &Aabb2) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Union of two boxes.
    pub fn union(&self, other: &Aabb2) -> Aabb2 {
        let mut out = *self;
        out.include_box(other);
        out
    }

    /// True if min exceeds max on either axis.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// True if the box is non-empty and free of NaNs.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Closed containment test (boundary counts as inside).
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb2) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Width along u.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along v.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Length of the diagonal, or 0 for an empty box.
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).norm()
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_box() {
        let b = Aabb2::empty();
        assert!(b.is_empty());
        assert!(!b.is_valid());
        assert!(!b.contains_point(&Point2::origin()));
        assert_eq!(b.diagonal(), 0.0);
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let a = Aabb2::from_points(Point2::new(1.0, 2.0), Point2::new(3.0, -1.0));
        let u = Aabb2::empty().union(&a);
        assert_eq!(u, a);
        let u2 = a.union(&Aabb2::empty());
        assert_eq!(u2, a);
    }

    #[test]
    fn test_from_points_orders_corners() {
        let b = Aabb2::from_points(Point2::new(4.0, 0.0), Point2::new(1.0, 3.0));
        assert_eq!(b.min, Point2::new(1.0, 0.0));
        assert_eq!(b.max, Point2::new(4.0, 3.0));
        assert_relative_eq!(b.width(), 3.0);
        assert_relative_eq!(b.height(), 3.0);
    }

    #[test]
    fn test_contains() {
        let outer = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let inner = Aabb2::new(Point2::new(2.0, 2.0), Point2::new(3.0, 8.0));
        assert!(outer.contains_box(&inner));
        assert!(!inner.contains_box(&outer));
        assert!(outer.contains_point(&Point2::new(0.0, 10.0)));
        assert!(!outer.contains_point(&Point2::new(-0.1, 5.0)));
    }

    #[test]
    fn test_diagonal() {
        let b = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_relative_eq!(b.diagonal(), 5.0);
    }

    #[test]
    fn test_from_points_drops_nan() {
        // Callers must check finiteness themselves.
        let b = Aabb2::from_points(Point2::new(f64::NAN, 0.0), Point2::new(1.0, 1.0));
        assert!(b.is_valid());
        assert_eq!(b.min.x, 1.0);
    }
}
