#![warn(missing_docs)]

//! B-spline and NURBS trim curves in surface parameter space.
//!
//! Provides non-rational B-spline and rational NURBS curves in 2D,
//! evaluated via De Boor's algorithm, with analytic first derivatives.
//! Both implement [`Curve2d`] and report their interior knots as span
//! boundaries so the trim tree never lets a leaf straddle one.
//!
//! # Key types
//!
//! - [`BSplineCurve2d`]: non-rational B-spline curve (polylines are degree 1)
//! - [`NurbsCurve2d`]: rational B-spline curve (exact circles and conics)

use trimtree_geom::Curve2d;
use trimtree_math::{Point2, Vec2};

// =============================================================================
// Knot vector utilities
// =============================================================================

/// Validate a knot vector: non-decreasing, length = n_control_points + degree + 1.
fn validate_knots(knots: &[f64], n_points: usize, degree: usize) -> bool {
    if n_points <= degree || knots.len() != n_points + degree + 1 {
        return false;
    }
    knots.windows(2).all(|w| w[0] <= w[1])
}

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]`, clamped to valid range.
/// For `t` at the end of the domain, returns the last valid span.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    // n = number of control points - 1 (last index)
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Compute non-zero basis function values at parameter `t`.
///
/// Returns a vector of `degree + 1` values `N[span-degree..=span]` at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            if denom.abs() < 1e-30 {
                // Zero-length knot interval
                n[j] = saved;
                continue;
            }
            let temp = n[r] / denom;
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

/// Distinct knot values strictly inside the curve's domain, ascending.
fn interior_knots(knots: &[f64], n_points: usize, degree: usize) -> Vec<f64> {
    let t_min = knots[degree];
    let t_max = knots[n_points];
    let mut out: Vec<f64> = Vec::new();
    for &k in &knots[degree + 1..n_points] {
        if k > t_min && k < t_max && out.last().map_or(true, |&last| k > last) {
            out.push(k);
        }
    }
    out
}

/// Evaluate a curve with homogeneous control points `(w*x, w*y, w)` and
/// its first derivative at `t`.
///
/// `ctrl(i)` returns control point `i`. The derivative uses the degree
/// `p - 1` basis on the same knot vector:
/// `C'(t) = Σ N[k, p-1](t) * p * (P[k] - P[k-1]) / (u[k+p] - u[k])`.
fn eval_homogeneous(
    knots: &[f64],
    degree: usize,
    n_points: usize,
    ctrl: impl Fn(usize) -> [f64; 3],
    t: f64,
) -> ([f64; 3], [f64; 3]) {
    let n = n_points - 1;
    let t = t.clamp(knots[degree], knots[n + 1]);
    let span = find_span(knots, n, degree, t);

    let mut value = [0.0; 3];
    for (i, &b) in basis_functions(knots, span, degree, t).iter().enumerate() {
        let h = ctrl(span - degree + i);
        for c in 0..3 {
            value[c] += b * h[c];
        }
    }

    let mut deriv = [0.0; 3];
    if degree > 0 {
        let lower = basis_functions(knots, span, degree - 1, t);
        for (j, &b) in lower.iter().enumerate() {
            let k = span + 1 + j - degree;
            let denom = knots[k + degree] - knots[k];
            if denom.abs() < 1e-30 {
                continue;
            }
            let scale = degree as f64 * b / denom;
            let (hk, hk1) = (ctrl(k), ctrl(k - 1));
            for c in 0..3 {
                deriv[c] += scale * (hk[c] - hk1[c]);
            }
        }
    }

    (value, deriv)
}

// =============================================================================
// B-spline curve
// =============================================================================

/// A non-rational B-spline curve in 2D parameter space.
///
/// Defined by control points, a knot vector, and a polynomial degree.
/// Evaluated using De Boor's algorithm.
#[derive(Debug, Clone)]
pub struct BSplineCurve2d {
    /// Control points in 2D.
    pub control_points: Vec<Point2>,
    /// Knot vector. Length = control_points.len() + degree + 1.
    pub knots: Vec<f64>,
    /// Polynomial degree (order = degree + 1).
    pub degree: usize,
}

impl BSplineCurve2d {
    /// Create a B-spline curve.
    ///
    /// # Panics
    /// Panics if the knot vector length doesn't match `n + degree + 1`
    /// or the knots decrease.
    pub fn new(control_points: Vec<Point2>, knots: Vec<f64>, degree: usize) -> Self {
        assert!(
            validate_knots(&knots, control_points.len(), degree),
            "invalid knot vector: len={} but expected {} (n={}, p={})",
            knots.len(),
            control_points.len() + degree + 1,
            control_points.len(),
            degree
        );
        Self {
            control_points,
            knots,
            degree,
        }
    }

    /// Create a clamped uniform B-spline with the given degree on `[0, 1]`.
    ///
    /// The knot vector is clamped (first and last knots repeated `degree+1` times)
    /// with uniform internal spacing.
    pub fn clamped_uniform(control_points: Vec<Point2>, degree: usize) -> Self {
        let n = control_points.len();
        let m = n + degree + 1;
        let mut knots = vec![0.0; m];

        let n_internal = m.saturating_sub(2 * (degree + 1));
        for i in 0..=degree {
            knots[i] = 0.0;
            knots[m - 1 - i] = 1.0;
        }
        for i in 1..=n_internal {
            knots[degree + i] = i as f64 / (n_internal + 1) as f64;
        }

        Self::new(control_points, knots, degree)
    }

    /// A degree-1 curve through `points`, one span per segment.
    ///
    /// # Panics
    /// Panics with fewer than two points.
    pub fn polyline(points: Vec<Point2>) -> Self {
        assert!(points.len() >= 2, "polyline needs at least two points");
        Self::clamped_uniform(points, 1)
    }

    /// Evaluate the curve at parameter `t`.
    pub fn eval(&self, t: f64) -> Point2 {
        let (h, _) = self.eval_with_derivative(t);
        Point2::new(h[0], h[1])
    }

    /// First derivative at parameter `t`.
    ///
    /// At an interior knot the derivative of the span starting there is returned.
    pub fn derivative(&self, t: f64) -> Vec2 {
        let (_, d) = self.eval_with_derivative(t);
        Vec2::new(d[0], d[1])
    }

    fn eval_with_derivative(&self, t: f64) -> ([f64; 3], [f64; 3]) {
        let pts = &self.control_points;
        eval_homogeneous(
            &self.knots,
            self.degree,
            pts.len(),
            |i| [pts[i].x, pts[i].y, 1.0],
            t,
        )
    }

    /// Parameter domain `(t_min, t_max)`.
    pub fn parameter_domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }

    /// Number of control points.
    pub fn num_control_points(&self) -> usize {
        self.control_points.len()
    }
}

impl Curve2d for BSplineCurve2d {
    fn evaluate(&self, t: f64) -> Point2 {
        self.eval(t)
    }

    fn tangent(&self, t: f64) -> Vec2 {
        self.derivative(t)
    }

    fn domain(&self) -> (f64, f64) {
        self.parameter_domain()
    }

    fn span_boundaries(&self) -> Vec<f64> {
        interior_knots(&self.knots, self.control_points.len(), self.degree)
    }

    fn clone_box(&self) -> Box<dyn Curve2d> {
        Box::new(self.clone())
    }
}

// =============================================================================
// NURBS (rational B-spline) curve
// =============================================================================

/// A weighted control point for NURBS (homogeneous coordinates).
#[derive(Debug, Clone, Copy)]
pub struct WeightedPoint2 {
    /// 2D position (in Cartesian coordinates, not weighted).
    pub point: Point2,
    /// Weight (must be > 0).
    pub weight: f64,
}

impl WeightedPoint2 {
    /// Create a weighted point.
    pub fn new(point: Point2, weight: f64) -> Self {
        Self { point, weight }
    }

    /// Create with unit weight.
    pub fn unweighted(point: Point2) -> Self {
        Self { point, weight: 1.0 }
    }

    /// Convert to homogeneous coordinates: `(w*x, w*y, w)`.
    pub fn to_homogeneous(&self) -> [f64; 3] {
        [
            self.weight * self.point.x,
            self.weight * self.point.y,
            self.weight,
        ]
    }
}

/// A rational B-spline (NURBS) curve in 2D parameter space.
///
/// Evaluated by computing a 3D non-rational B-spline in homogeneous
/// coordinates and dividing by the weight.
#[derive(Debug, Clone)]
pub struct NurbsCurve2d {
    /// Weighted control points.
    pub control_points: Vec<WeightedPoint2>,
    /// Knot vector.
    pub knots: Vec<f64>,
    /// Polynomial degree.
    pub degree: usize,
}

impl NurbsCurve2d {
    /// Create a NURBS curve.
    ///
    /// # Panics
    /// Panics if the knot vector is invalid for the control point count.
    pub fn new(control_points: Vec<WeightedPoint2>, knots: Vec<f64>, degree: usize) -> Self {
        assert!(
            validate_knots(&knots, control_points.len(), degree),
            "invalid knot vector"
        );
        Self {
            control_points,
            knots,
            degree,
        }
    }

    /// Create a full counter-clockwise NURBS circle.
    ///
    /// Nine control points with degree 2; the quarter points at
    /// `t = 0.25, 0.5, 0.75` are double knots.
    pub fn circle(center: Point2, radius: f64) -> Self {
        let w = 1.0_f64 / 2.0_f64.sqrt(); // cos(45°)
        let r = radius;
        let c = center;

        let pts = vec![
            WeightedPoint2::new(Point2::new(c.x + r, c.y), 1.0),
            WeightedPoint2::new(Point2::new(c.x + r, c.y + r), w),
            WeightedPoint2::new(Point2::new(c.x, c.y + r), 1.0),
            WeightedPoint2::new(Point2::new(c.x - r, c.y + r), w),
            WeightedPoint2::new(Point2::new(c.x - r, c.y), 1.0),
            WeightedPoint2::new(Point2::new(c.x - r, c.y - r), w),
            WeightedPoint2::new(Point2::new(c.x, c.y - r), 1.0),
            WeightedPoint2::new(Point2::new(c.x + r, c.y - r), w),
            WeightedPoint2::new(Point2::new(c.x + r, c.y), 1.0),
        ];

        let knots = vec![
            0.0, 0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0, 1.0,
        ];

        Self::new(pts, knots, 2)
    }

    fn eval_homogeneous(&self, t: f64) -> ([f64; 3], [f64; 3]) {
        let pts = &self.control_points;
        eval_homogeneous(
            &self.knots,
            self.degree,
            pts.len(),
            |i| pts[i].to_homogeneous(),
            t,
        )
    }

    /// Evaluate the curve at parameter `t`.
    pub fn eval(&self, t: f64) -> Point2 {
        let (h, _) = self.eval_homogeneous(t);
        if h[2].abs() < 1e-30 {
            Point2::origin()
        } else {
            Point2::new(h[0] / h[2], h[1] / h[2])
        }
    }

    /// First derivative at parameter `t` (quotient rule on the homogeneous form).
    pub fn derivative(&self, t: f64) -> Vec2 {
        let (h, d) = self.eval_homogeneous(t);
        let w = h[2];
        if w.abs() < 1e-30 {
            return Vec2::zeros();
        }
        let (x, y) = (h[0] / w, h[1] / w);
        Vec2::new((d[0] - d[2] * x) / w, (d[1] - d[2] * y) / w)
    }

    /// Parameter domain.
    pub fn parameter_domain(&self) -> (f64, f64) {
        (
            self.knots[self.degree],
            self.knots[self.control_points.len()],
        )
    }
}

impl Curve2d for NurbsCurve2d {
    fn evaluate(&self, t: f64) -> Point2 {
        self.eval(t)
    }

    fn tangent(&self, t: f64) -> Vec2 {
        self.derivative(t)
    }

    fn domain(&self) -> (f64, f64) {
        self.parameter_domain()
    }

    fn span_boundaries(&self) -> Vec<f64> {
        interior_knots(&self.knots, self.control_points.len(), self.degree)
    }

    fn clone_box(&self) -> Box<dyn Curve2d> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
