//! The face-side geometry capability the tree is built from.

use trimtree_geom::{Curve2d, Line2d};
use trimtree_math::Point2;

/// A surface patch bounded by loops of trim curves in its parameter space.
///
/// Loops are peers. Whether a loop is an outer boundary or a hole is up
/// to the caller; the tree only reports crossing parity.
pub trait TrimmedFace {
    /// Parameter domain `((u_min, u_max), (v_min, v_max))` of the underlying surface.
    fn surface_domain(&self) -> ((f64, f64), (f64, f64));

    /// Number of trim loops.
    fn loop_count(&self) -> usize;

    /// Trim curves of loop `loop_index`, in loop order.
    fn loop_trims(&self, loop_index: usize) -> Vec<&dyn Curve2d>;
}

/// An owned face description: a surface domain plus loops of boxed curves.
#[derive(Debug, Clone)]
pub struct FaceTrims {
    domain: ((f64, f64), (f64, f64)),
    loops: Vec<Vec<Box<dyn Curve2d>>>,
}

impl FaceTrims {
    /// A face with no loops over the given surface domain.
    pub fn new(domain: ((f64, f64), (f64, f64))) -> Self {
        Self {
            domain,
            loops: Vec::new(),
        }
    }

    /// Append a loop and return its index.
    pub fn add_loop(&mut self, trims: Vec<Box<dyn Curve2d>>) -> usize {
        self.loops.push(trims);
        self.loops.len() - 1
    }

    /// Builder form of [`FaceTrims::add_loop`].
    pub fn with_loop(mut self, trims: Vec<Box<dyn Curve2d>>) -> Self {
        self.add_loop(trims);
        self
    }

    /// Append a closed polygon, one [`Line2d`] trim per edge, and return its index.
    pub fn add_polygon(&mut self, points: &[Point2]) -> usize {
        let n = points.len();
        let trims = (0..n)
            .map(|i| {
                Box::new(Line2d::from_points(points[i], points[(i + 1) % n])) as Box<dyn Curve2d>
            })
            .collect();
        self.add_loop(trims)
    }
}

impl TrimmedFace for FaceTrims {
    fn surface_domain(&self) -> ((f64, f64), (f64, f64)) {
        self.domain
    }

    fn loop_count(&self) -> usize {
        self.loops.len()
    }

    fn loop_trims(&self, loop_index: usize) -> Vec<&dyn Curve2d> {
        self.loops
            .get(loop_index)
            .map(|trims| trims.iter().map(|c| c.as_ref()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_loop_is_closed() {
        let mut face = FaceTrims::new(((0.0, 10.0), (0.0, 10.0)));
        let idx = face.add_polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ]);
        assert_eq!(idx, 0);
        assert_eq!(face.loop_count(), 1);

        let trims = face.loop_trims(0);
        assert_eq!(trims.len(), 3);
        for i in 0..3 {
            let (_, t1) = trims[i].domain();
            let (t0, _) = trims[(i + 1) % 3].domain();
            let gap = trims[i].evaluate(t1) - trims[(i + 1) % 3].evaluate(t0);
            assert!(gap.norm() < 1e-12);
        }
    }

    #[test]
    fn test_missing_loop_is_empty() {
        let face = FaceTrims::new(((0.0, 1.0), (0.0, 1.0)));
        assert!(face.loop_trims(3).is_empty());
    }
}
