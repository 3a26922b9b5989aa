//! Point containment by casting a ray in +v through the trim trees.
//!
//! A trim node crosses the ray at most once when it was split only for
//! flatness or size, so such a node lying wholly above the point toggles
//! parity without being opened. Nodes split at a knot or a tangent are
//! opened until their children can be trusted. A leaf straddling the
//! point in v is solved exactly for `v(u)`.
//!
//! A degraded node, whose curve could not be evaluated, has a box above
//! every finite v and counts as one crossing wherever u falls in its range.
//!
//! Box u-ranges are half-open, `[umin, umax)`, so a ray through the
//! vertex shared by two trims is counted once.

use trimtree_math::{Aabb2, Point2};

use crate::arena::{LoopNode, NodeId, TrimNode};
use crate::tree::CurveTree;

/// Counters for one or more queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Loops whose box contained the point.
    pub loops_tested: usize,
    /// Trim nodes examined.
    pub nodes_visited: usize,
    /// Leaves solved for `v(u)`.
    pub leaves_solved: usize,
    /// Solves that hit the iteration cap.
    pub nonconverged: usize,
}

/// Where a node's box sits relative to the ray from `(u, v)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// The ray cannot hit the node.
    Miss,
    /// The node lies wholly above the point.
    Below,
    /// The point is inside the node's v-range.
    Straddle,
}

fn classify(bbox: &Aabb2, u: f64, v: f64) -> Position {
    if !(u >= bbox.min.x && u < bbox.max.x) || v >= bbox.max.y {
        Position::Miss
    } else if v <= bbox.min.y {
        Position::Below
    } else {
        Position::Straddle
    }
}

impl CurveTree {
    /// True if `(u, v)` is outside the material of the face.
    ///
    /// Equivalent to `!self.parity(u, v)`.
    pub fn is_trimmed(&self, u: f64, v: f64) -> bool {
        !self.parity(u, v)
    }

    /// [`CurveTree::is_trimmed`], accumulating work counters into `stats`.
    pub fn is_trimmed_with_stats(&self, u: f64, v: f64, stats: &mut QueryStats) -> bool {
        !self.parity_with_stats(u, v, stats)
    }

    /// Crossing parity of the +v ray from `(u, v)` over all loops.
    pub fn parity(&self, u: f64, v: f64) -> bool {
        self.parity_with_stats(u, v, &mut QueryStats::default())
    }

    /// Crossing parity of a single loop, or `None` if there is no such loop.
    ///
    /// With an outer boundary and holes, a point is in the material when the
    /// outer loop's parity is set and no hole's is.
    pub fn loop_parity(&self, loop_index: usize, u: f64, v: f64) -> Option<bool> {
        let node = self.arena.loop_node(*self.loops.get(loop_index)?)?;
        let mut stats = QueryStats::default();
        Some(self.loop_crossings(node, u, v, &mut stats))
    }

    fn parity_with_stats(&self, u: f64, v: f64, stats: &mut QueryStats) -> bool {
        let mut parity = false;
        let mut id = self.first_loop();
        while let Some(node) = self.arena.loop_node(id) {
            parity ^= self.loop_crossings(node, u, v, stats);
            id = node.next;
        }
        parity
    }

    fn loop_crossings(&self, node: &LoopNode, u: f64, v: f64, stats: &mut QueryStats) -> bool {
        if !self.arena.bbox(node.bbox).contains_point(&Point2::new(u, v)) {
            return false;
        }
        stats.loops_tested += 1;

        let mut parity = false;
        let mut stack: Vec<NodeId> = Vec::new();
        for &root in &node.trims {
            stack.push(root);
            while let Some(id) = stack.pop() {
                let Some(trim) = self.arena.trim(id) else {
                    continue;
                };
                stats.nodes_visited += 1;

                match classify(&self.arena.bbox(trim.bbox), u, v) {
                    Position::Miss => {}
                    Position::Below if trim.degraded || trim.is_leaf() || !trim.problem => {
                        parity = !parity;
                    }
                    Position::Straddle if trim.is_leaf() => {
                        stats.leaves_solved += 1;
                        if let Some(crossing) = self.solve_v_at_u(trim, u, stats) {
                            if v <= crossing {
                                parity = !parity;
                            }
                        }
                    }
                    Position::Below | Position::Straddle => {
                        stack.push(trim.right);
                        stack.push(trim.left);
                    }
                }
            }
        }
        parity
    }

    /// Solve a leaf's curve for the v at which it passes `u`.
    ///
    /// Bisection, with a linear-interpolation guess used when it falls in
    /// the inner part of the bracket. Returns `None` if the leaf's ends do
    /// not bracket `u`.
    fn solve_v_at_u(&self, leaf: &TrimNode, u: f64, stats: &mut QueryStats) -> Option<f64> {
        let curve = self.curves.get(leaf.curve as usize)?;
        let tol = self.config.solver_tolerance;
        let (a, b) = self.arena.domain(leaf);

        let (pa, pb) = (curve.evaluate(a), curve.evaluate(b));
        let (mut lo, mut hi) = (a, b);
        let (mut f_lo, mut f_hi) = (pa.x - u, pb.x - u);
        if f_lo.abs() <= tol {
            return Some(pa.y);
        }
        if f_hi.abs() <= tol {
            return Some(pb.y);
        }
        if f_lo.signum() == f_hi.signum() {
            return None;
        }

        let mut collapsed = false;
        for _ in 0..self.config.solver_max_iterations {
            let width = hi - lo;
            let mut t = lo - f_lo * width / (f_hi - f_lo);
            if !(t > lo + 0.05 * width && t < hi - 0.05 * width) {
                t = lo + 0.5 * width;
            }
            if t <= lo || t >= hi {
                // The bracket has collapsed to adjacent floats.
                collapsed = true;
                break;
            }

            let p = curve.evaluate(t);
            let f = p.x - u;
            if f.abs() <= tol {
                return Some(p.y);
            }
            if f.signum() == f_lo.signum() {
                lo = t;
                f_lo = f;
            } else {
                hi = t;
                f_hi = f;
            }
        }

        let best = if f_lo.abs() <= f_hi.abs() { lo } else { hi };
        if !collapsed {
            stats.nonconverged += 1;
            log::debug!(
                "v(u) solve for u = {} stopped in [{}, {}], residual {}",
                u,
                lo,
                hi,
                f_lo.abs().min(f_hi.abs())
            );
        }
        Some(curve.evaluate(best).y)
    }
}
