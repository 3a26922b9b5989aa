#![warn(missing_docs)]

//! Trimming curves in surface parameter space.
//!
//! Provides the [`Curve2d`] trait that the trim tree evaluates, together with
//! the analytic trim curves most faces are bounded by: line segments and
//! circular arcs. Spline trims live in `trimtree-nurbs`.

use std::f64::consts::PI;
use trimtree_math::{Point2, Vec2};

// =============================================================================
// Curve trait
// =============================================================================

/// A 2D parametric curve (a trim curve in surface parameter space).
pub trait Curve2d: Send + Sync + std::fmt::Debug {
    /// Evaluate the curve at parameter `t` to get a 2D point.
    fn evaluate(&self, t: f64) -> Point2;

    /// Tangent vector at parameter `t`.
    fn tangent(&self, t: f64) -> Vec2;

    /// Parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Interior span boundaries (knots) in increasing order.
    ///
    /// The curve may lose derivative continuity at these parameters.
    /// Only values strictly inside the domain are reported.
    fn span_boundaries(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Curve2d>;
}

impl Clone for Box<dyn Curve2d> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// Line2d
// =============================================================================

/// A 2D line segment in parameter space.
///
/// Parameterization: `P(t) = origin + t * direction`, `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Line2d {
    /// Starting point.
    pub origin: Point2,
    /// Direction (magnitude is the segment length).
    pub direction: Vec2,
}

impl Line2d {
    /// Create from two endpoints.
    pub fn from_points(start: Point2, end: Point2) -> Self {
        Self {
            origin: start,
            direction: end - start,
        }
    }
}

impl Curve2d for Line2d {
    fn evaluate(&self, t: f64) -> Point2 {
        self.origin + t * self.direction
    }

    fn tangent(&self, _t: f64) -> Vec2 {
        self.direction
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn clone_box(&self) -> Box<dyn Curve2d> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Circle2d
// =============================================================================

/// A 2D circle or circular arc in parameter space.
///
/// Parameterization: `P(t) = center + radius * (cos t, sin t)`, `t ∈ [start, end]`.
/// A negative sweep (`end < start`) is expressed by [`Circle2d::clockwise`].
#[derive(Debug, Clone)]
pub struct Circle2d {
    /// Center of the circle.
    pub center: Point2,
    /// Radius.
    pub radius: f64,
    /// Start angle in radians.
    pub start: f64,
    /// End angle in radians.
    pub end: f64,
    /// Traverse the arc clockwise (angle decreasing with `t`).
    pub clockwise: bool,
}

impl Circle2d {
    /// A full counter-clockwise circle starting at angle 0.
    pub fn new(center: Point2, radius: f64) -> Self {
        Self {
            center,
            radius,
            start: 0.0,
            end: 2.0 * PI,
            clockwise: false,
        }
    }

    /// A counter-clockwise arc from `start` to `end` (radians, `end > start`).
    pub fn arc(center: Point2, radius: f64, start: f64, end: f64) -> Self {
        Self {
            center,
            radius,
            start,
            end,
            clockwise: false,
        }
    }

    /// The same arc traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            clockwise: !self.clockwise,
            ..self.clone()
        }
    }

    fn angle(&self, t: f64) -> f64 {
        if self.clockwise {
            self.start + self.end - t
        } else {
            t
        }
    }
}

impl Curve2d for Circle2d {
    fn evaluate(&self, t: f64) -> Point2 {
        let (sin_a, cos_a) = self.angle(t).sin_cos();
        self.center + self.radius * Vec2::new(cos_a, sin_a)
    }

    fn tangent(&self, t: f64) -> Vec2 {
        let (sin_a, cos_a) = self.angle(t).sin_cos();
        let d = self.radius * Vec2::new(-sin_a, cos_a);
        if self.clockwise {
            -d
        } else {
            d
        }
    }

    fn domain(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    fn clone_box(&self) -> Box<dyn Curve2d> {
        Box::new(self.clone())
    }
}
