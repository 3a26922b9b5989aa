//! One-time construction of a face's loop directory and trim trees.
//!
//! Each trim curve is subdivided breadth-first from an explicit queue.
//! A node is split when, in order:
//!
//! 1. an interior knot lies strictly inside its interval,
//! 2. the endpoint tangents change sign in u or v (a vertical or
//!    horizontal tangent inside),
//! 3. the endpoint tangents diverge past the flatness threshold, or
//! 4. the chord is long compared to the surface domain.
//!
//! Leaves get the box of their two endpoints. Boxes are then propagated
//! leaves-up to the trim roots and into each loop's aggregate box.
//!
//! A curve that returns non-finite points leaves empty boxes behind. The
//! topmost such node is degraded: it stops being searched and stands in
//! for a single crossing over its u-range.

use std::collections::VecDeque;

use trimtree_geom::Curve2d;
use trimtree_math::{Aabb2, Point2, Vec2};

use crate::arena::{Arena, LoopNode, NodeId, TrimNode};
use crate::config::TrimTreeConfig;
use crate::error::BuildDiagnostic;
use crate::face::TrimmedFace;
use crate::tree::{CurveTree, TrimSource};

/// Tangents are sampled this fraction of the interval inside each end, so
/// a knot at the end reports the side belonging to the interval.
const TANGENT_NUDGE: f64 = 1e-9;

/// Tangents shorter than this are treated as undefined.
const MIN_TANGENT: f64 = 1e-14;

/// Why a node was split.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SplitReason {
    Knot,
    Tangent,
    Flatness,
    Size,
}

impl SplitReason {
    fn is_problem(self) -> bool {
        matches!(self, SplitReason::Knot | SplitReason::Tangent)
    }
}

struct Builder<'a> {
    config: &'a TrimTreeConfig,
    arena: Arena,
    curves: Vec<Box<dyn Curve2d>>,
    knots: Vec<Vec<f64>>,
    sources: Vec<TrimSource>,
    leaves: Vec<NodeId>,
    diagnostics: Vec<BuildDiagnostic>,
    /// Surface parameter domain as a box.
    domain: Aabb2,
    /// Chord length above which test 4 fires.
    size_limit: f64,
}

/// Build the tree for one face. `config` must already be validated.
pub(crate) fn build_tree<F: TrimmedFace + ?Sized>(face: &F, config: &TrimTreeConfig) -> CurveTree {
    let mut builder = Builder::new(face, config);
    let loops = builder.build_loops(face);
    builder.propagate(&loops);

    let invalid = builder.inconsistent_nodes();
    debug_assert!(
        invalid.is_empty(),
        "trim nodes {:?} have inconsistent boxes",
        invalid
    );
    builder.degrade(&loops, &invalid);

    builder.finish(loops)
}

impl<'a> Builder<'a> {
    fn new<F: TrimmedFace + ?Sized>(face: &F, config: &'a TrimTreeConfig) -> Self {
        let ((u0, u1), (v0, v1)) = face.surface_domain();
        let domain = Aabb2::new(Point2::new(u0, v0), Point2::new(u1, v1));
        let diagonal = domain.diagonal();
        let size_limit = if diagonal.is_finite() && diagonal > 0.0 {
            config.relative_size_factor * diagonal
        } else {
            log::warn!(
                "surface domain {:?} has no usable diagonal; relative-size subdivision disabled",
                face.surface_domain()
            );
            f64::INFINITY
        };

        Self {
            config,
            arena: Arena::new(),
            curves: Vec::new(),
            knots: Vec::new(),
            sources: Vec::new(),
            leaves: Vec::new(),
            diagnostics: Vec::new(),
            domain,
            size_limit,
        }
    }

    fn finish(self, loops: Vec<NodeId>) -> CurveTree {
        log::debug!(
            "built trim tree: {} loops, {} trims, {} nodes, {} leaves, {} diagnostics",
            loops.len(),
            self.curves.len(),
            self.arena.len() - 1,
            self.leaves.len(),
            self.diagnostics.len()
        );

        CurveTree::from_parts(
            self.arena,
            loops,
            self.curves,
            self.sources,
            self.config.clone(),
            self.diagnostics,
        )
    }

    fn diagnose(&mut self, diagnostic: BuildDiagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Allocate every loop node and subdivide every usable trim.
    fn build_loops<F: TrimmedFace + ?Sized>(&mut self, face: &F) -> Vec<NodeId> {
        let mut loops: Vec<NodeId> = Vec::with_capacity(face.loop_count());

        for loop_index in 0..face.loop_count() {
            let bbox = self.arena.push_box(Aabb2::empty());
            let loop_id = self.arena.push_loop(LoopNode {
                next: NodeId::NONE,
                trim_count: 0,
                bbox,
                trims: Vec::new(),
            });
            if let Some(prev) = loops.last().and_then(|&p| self.arena.loop_node_mut(p)) {
                prev.next = loop_id;
            }
            loops.push(loop_id);

            let mut roots = Vec::new();
            for (trim_index, curve) in face.loop_trims(loop_index).into_iter().enumerate() {
                let (t_min, t_max) = curve.domain();
                if !(t_min.is_finite() && t_max.is_finite() && t_min < t_max) {
                    self.diagnose(BuildDiagnostic::DegenerateDomain {
                        loop_index,
                        trim_index,
                        t_min,
                        t_max,
                    });
                    continue;
                }

                let curve_ref = self.curves.len() as u32;
                self.knots.push(curve.span_boundaries());
                self.curves.push(curve.clone_box());
                self.sources.push(TrimSource {
                    loop_index,
                    trim_index,
                });
                roots.push(self.subdivide(curve_ref, t_min, t_max));
            }

            if let Some(node) = self.arena.loop_node_mut(loop_id) {
                node.trim_count = roots.len() as u32;
                node.trims = roots;
            }
        }

        loops
    }

    fn new_trim_node(&mut self, parent: NodeId, t_min: u32, t_max: u32, curve: u32) -> NodeId {
        let bbox = self.arena.push_box(Aabb2::empty());
        self.arena.push_trim(TrimNode {
            parent,
            t_min,
            t_max,
            left: NodeId::NONE,
            right: NodeId::NONE,
            problem: false,
            degraded: false,
            bbox,
            curve,
        })
    }

    /// Subdivide one curve over `[t_min, t_max]` and return the root.
    fn subdivide(&mut self, curve_ref: u32, t_min: f64, t_max: f64) -> NodeId {
        let lo = self.arena.push_t(t_min);
        let hi = self.arena.push_t(t_max);
        let root = self.new_trim_node(NodeId::NONE, lo, hi, curve_ref);

        let mut queue = VecDeque::from([(root, 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            let Some(node) = self.arena.trim(id).copied() else {
                continue;
            };
            let (a, b) = self.arena.domain(&node);

            let mut split = self.find_split(curve_ref, a, b);
            if split.is_some() && depth >= self.config.max_depth {
                let source = self.sources[curve_ref as usize];
                self.diagnose(BuildDiagnostic::DepthLimit {
                    loop_index: source.loop_index,
                    trim_index: source.trim_index,
                    t_min: a,
                    t_max: b,
                    depth,
                });
                split = None;
            }

            match split {
                None => {
                    // A non-finite endpoint leaves the box empty.
                    let leaf_box = match self.finite_ends(curve_ref, a, b) {
                        Some((pa, pb)) => Aabb2::from_points(pa, pb),
                        None => Aabb2::empty(),
                    };
                    *self.arena.bbox_mut(node.bbox) = leaf_box;
                    self.leaves.push(id);
                }
                Some((at, reason)) => {
                    let mid = self.arena.push_t(at);
                    let left = self.new_trim_node(id, node.t_min, mid, curve_ref);
                    let right = self.new_trim_node(id, mid, node.t_max, curve_ref);
                    if let Some(n) = self.arena.trim_mut(id) {
                        n.left = left;
                        n.right = right;
                        n.problem = reason.is_problem();
                    }
                    queue.push_back((left, depth + 1));
                    queue.push_back((right, depth + 1));
                }
            }
        }

        root
    }

    /// Run the four split tests in order; the first that fires wins.
    fn find_split(&mut self, curve_ref: u32, a: f64, b: f64) -> Option<(f64, SplitReason)> {
        let eps = self.config.parameter_tolerance;
        if b - a <= 2.0 * eps {
            return None;
        }

        if let Some(k) = knot_near_middle(&self.knots[curve_ref as usize], a, b, eps) {
            return Some((k, SplitReason::Knot));
        }

        let nudge = (b - a) * TANGENT_NUDGE;
        let (ta, tb) = {
            let curve = &self.curves[curve_ref as usize];
            (curve.tangent(a + nudge), curve.tangent(b - nudge))
        };

        // Component 0 is a vertical tangent (du/dt = 0), 1 a horizontal one.
        for component in 0..2 {
            if ta[component] * tb[component] < 0.0 {
                let at = self.find_tangent_zero(curve_ref, a, b, component);
                let margin = eps.max(4.0 * nudge);
                if at - a > margin && b - at > margin {
                    return Some((at, SplitReason::Tangent));
                }
            }
        }

        if let Some(dot) = unit_dot(&ta, &tb) {
            if dot < self.config.flatness_threshold {
                return Some((0.5 * (a + b), SplitReason::Flatness));
            }
        }

        let curve = &self.curves[curve_ref as usize];
        let chord = (curve.evaluate(b) - curve.evaluate(a)).norm();
        if chord > self.size_limit {
            return Some((0.5 * (a + b), SplitReason::Size));
        }

        None
    }

    /// Bisect for the parameter where one tangent component changes sign.
    fn find_tangent_zero(&mut self, curve_ref: u32, a: f64, b: f64, component: usize) -> f64 {
        let nudge = (b - a) * TANGENT_NUDGE;
        let tol = self
            .config
            .parameter_tolerance
            .max(4.0 * f64::EPSILON * b.abs().max(a.abs()));
        let curve = &self.curves[curve_ref as usize];

        let mut lo = a + nudge;
        let mut hi = b - nudge;
        let lo_sign = curve.tangent(lo)[component] < 0.0;

        for _ in 0..self.config.tangent_max_iterations {
            if hi - lo <= tol {
                return 0.5 * (lo + hi);
            }
            let mid = 0.5 * (lo + hi);
            let value = curve.tangent(mid)[component];
            if value == 0.0 {
                return mid;
            }
            if (value < 0.0) == lo_sign {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let estimate = 0.5 * (lo + hi);
        if hi - lo > tol {
            let source = self.sources[curve_ref as usize];
            self.diagnose(BuildDiagnostic::TangentNotConverged {
                loop_index: source.loop_index,
                trim_index: source.trim_index,
                t_min: a,
                t_max: b,
                iterations: self.config.tangent_max_iterations,
            });
        }
        estimate
    }

    /// Union every leaf into its parent, level by level, then the trim
    /// roots into their loops.
    fn propagate(&mut self, loops: &[NodeId]) {
        let mut reported = vec![0u8; self.arena.len()];
        let mut frontier = self.leaves.clone();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in frontier {
                let Some(node) = self.arena.trim(id).copied() else {
                    continue;
                };
                let Some(parent) = self.arena.trim(node.parent).copied() else {
                    continue;
                };
                let child_box = self.arena.bbox(node.bbox);
                self.arena.bbox_mut(parent.bbox).include_box(&child_box);

                let count = &mut reported[node.parent.index()];
                *count += 1;
                if *count == 2 {
                    next.push(node.parent);
                }
            }
            frontier = next;
        }

        for &loop_id in loops {
            let Some(lp) = self.arena.loop_node(loop_id) else {
                continue;
            };
            let loop_slot = lp.bbox;
            let mut loop_box = self.arena.bbox(loop_slot);
            for &root in &lp.trims {
                if let Some(node) = self.arena.trim(root) {
                    loop_box.include_box(&self.arena.bbox(node.bbox));
                }
            }
            *self.arena.bbox_mut(loop_slot) = loop_box;
        }
    }

    /// Both ends of `[a, b]` on the curve, or `None` if either is not finite.
    fn finite_ends(&self, curve_ref: u32, a: f64, b: f64) -> Option<(Point2, Point2)> {
        let curve = &self.curves[curve_ref as usize];
        let (pa, pb) = (curve.evaluate(a), curve.evaluate(b));
        let finite = |p: &Point2| p.x.is_finite() && p.y.is_finite();
        (finite(&pa) && finite(&pb)).then_some((pa, pb))
    }

    /// The topmost trim nodes whose box is not a proper rectangle after
    /// propagation. Descendants of a reported node are not listed.
    fn inconsistent_nodes(&self) -> Vec<NodeId> {
        self.arena
            .trim_ids()
            .filter(|&id| {
                let Some(node) = self.arena.trim(id) else {
                    return false;
                };
                if self.arena.bbox(node.bbox).is_valid() {
                    return false;
                }
                match self.arena.trim(node.parent) {
                    Some(parent) => self.arena.bbox(parent.bbox).is_valid(),
                    None => true,
                }
            })
            .collect()
    }

    /// Turn each inconsistent node into a stand-in for one crossing.
    ///
    /// The node gets a box that is infinitely high over its u-range, so a
    /// ray whose u falls in that range always sees it above the point. Its
    /// ancestors are widened to hold that box and marked as problem nodes
    /// so queries open them down to the degraded node.
    fn degrade(&mut self, loops: &[NodeId], invalid: &[NodeId]) {
        for &id in invalid {
            let Some(node) = self.arena.trim(id).copied() else {
                continue;
            };
            self.diagnose(BuildDiagnostic::InvalidBox { node: id.index() });

            let mut root = id;
            while let Some(parent) = self
                .arena
                .trim(root)
                .map(|n| n.parent)
                .filter(|p| !p.is_none())
            {
                root = parent;
            }
            let loop_slot = loops
                .iter()
                .filter_map(|&l| self.arena.loop_node(l))
                .find(|lp| lp.trims.contains(&root))
                .map(|lp| lp.bbox);

            let (a, b) = self.arena.domain(&node);
            let (u_lo, u_hi) = match self.finite_ends(node.curve, a, b) {
                Some((pa, pb)) => (pa.x.min(pb.x), pa.x.max(pb.x)),
                None => {
                    let fallback = loop_slot
                        .map(|slot| self.arena.bbox(slot))
                        .filter(Aabb2::is_valid)
                        .or_else(|| Some(self.domain).filter(Aabb2::is_valid));
                    match fallback {
                        Some(bbox) => (bbox.min.x, bbox.max.x),
                        None => (f64::NEG_INFINITY, f64::INFINITY),
                    }
                }
            };
            let crossing = crossing_box(u_lo, u_hi);

            *self.arena.bbox_mut(node.bbox) = crossing;
            if let Some(n) = self.arena.trim_mut(id) {
                n.degraded = true;
            }

            let mut parent = node.parent;
            while let Some(p) = self.arena.trim(parent).copied() {
                self.arena.bbox_mut(p.bbox).include_box(&crossing);
                if let Some(n) = self.arena.trim_mut(parent) {
                    n.problem = true;
                }
                parent = p.parent;
            }

            if let Some(slot) = loop_slot {
                let loop_box = self.arena.bbox_mut(slot);
                if !loop_box.is_valid() {
                    *loop_box = Aabb2::new(
                        Point2::new(u_lo, f64::NEG_INFINITY),
                        Point2::new(u_hi, f64::INFINITY),
                    );
                }
                loop_box.include_box(&crossing);
            }
        }
    }
}

/// A box over `[u_lo, u_hi]` lying above every finite v.
fn crossing_box(u_lo: f64, u_hi: f64) -> Aabb2 {
    Aabb2::new(
        Point2::new(u_lo, f64::INFINITY),
        Point2::new(u_hi, f64::INFINITY),
    )
}

/// The interior knot closest to the middle of `(a, b)`, at least `eps`
/// from either end.
fn knot_near_middle(knots: &[f64], a: f64, b: f64, eps: f64) -> Option<f64> {
    let start = knots.partition_point(|&k| k <= a + eps);
    let end = knots.partition_point(|&k| k < b - eps);
    if start >= end {
        return None;
    }
    let inside = &knots[start..end];
    let mid = 0.5 * (a + b);
    let i = inside.partition_point(|&k| k < mid);
    let candidates = [i.checked_sub(1), (i < inside.len()).then_some(i)];
    candidates
        .into_iter()
        .flatten()
        .map(|j| inside[j])
        .min_by(|x, y| (x - mid).abs().total_cmp(&(y - mid).abs()))
}

/// Cosine of the angle between two tangents, or `None` if either is degenerate.
fn unit_dot(ta: &Vec2, tb: &Vec2) -> Option<f64> {
    let (na, nb) = (ta.norm(), tb.norm());
    if na < MIN_TANGENT || nb < MIN_TANGENT {
        return None;
    }
    Some(ta.dot(tb) / (na * nb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FaceTrims;
    use crate::tree::TrimNodeView;
    use std::f64::consts::{PI, TAU};
    use trimtree_geom::{Circle2d, Line2d};
    use trimtree_nurbs::{BSplineCurve2d, NurbsCurve2d};

    fn single_curve(curve: Box<dyn Curve2d>) -> CurveTree {
        let face = FaceTrims::new(((-10.0, 10.0), (-10.0, 10.0))).with_loop(vec![curve]);
        build_tree(&face, &TrimTreeConfig::default())
    }

    /// A line that evaluates to NaN for `t` strictly inside `(from, to)`.
    #[derive(Debug, Clone)]
    struct Holed {
        line: Line2d,
        from: f64,
        to: f64,
    }

    impl Curve2d for Holed {
        fn evaluate(&self, t: f64) -> Point2 {
            if self.from < t && t < self.to {
                Point2::new(f64::NAN, f64::NAN)
            } else {
                self.line.evaluate(t)
            }
        }

        fn tangent(&self, t: f64) -> Vec2 {
            self.line.tangent(t)
        }

        fn domain(&self) -> (f64, f64) {
            self.line.domain()
        }

        fn clone_box(&self) -> Box<dyn Curve2d> {
            Box::new(self.clone())
        }
    }

    /// The 10x10 square with its top edge, run from (10, 10) to (0, 10),
    /// undefined over `(from, to)`.
    fn square_with_holed_top(from: f64, to: f64) -> FaceTrims {
        let line = |x0: f64, y0: f64, x1: f64, y1: f64| {
            Line2d::from_points(Point2::new(x0, y0), Point2::new(x1, y1))
        };
        FaceTrims::new(((0.0, 10.0), (0.0, 10.0))).with_loop(vec![
            Box::new(line(0.0, 0.0, 10.0, 0.0)),
            Box::new(line(10.0, 0.0, 10.0, 10.0)),
            Box::new(Holed {
                line: line(10.0, 10.0, 0.0, 10.0),
                from,
                to,
            }),
            Box::new(line(0.0, 10.0, 0.0, 0.0)),
        ])
    }

    /// Run the build steps without the box assertion.
    fn build_degraded(face: &FaceTrims) -> CurveTree {
        let config = TrimTreeConfig::default();
        let mut builder = Builder::new(face, &config);
        let loops = builder.build_loops(face);
        builder.propagate(&loops);
        let invalid = builder.inconsistent_nodes();
        builder.degrade(&loops, &invalid);
        builder.finish(loops)
    }

    fn degraded_nodes(tree: &CurveTree) -> Vec<TrimNodeView> {
        let mut nodes = Vec::new();
        tree.visit_trims(|node| {
            if node.degraded {
                nodes.push(*node);
            }
        });
        nodes
    }

    #[test]
    fn test_knot_near_middle() {
        let knots = [0.1, 0.2, 0.45, 0.7];
        assert_eq!(knot_near_middle(&knots, 0.0, 1.0, 1e-10), Some(0.45));
        assert_eq!(knot_near_middle(&knots, 0.45, 0.7, 1e-10), None);
        assert_eq!(knot_near_middle(&knots, 0.25, 1.0, 1e-10), Some(0.7));
        assert_eq!(knot_near_middle(&[], 0.0, 1.0, 1e-10), None);
    }

    #[test]
    fn test_unit_dot() {
        let a = Vec2::new(2.0, 0.0);
        let b = Vec2::new(0.0, 3.0);
        assert!(unit_dot(&a, &b).unwrap().abs() < 1e-15);
        assert!((unit_dot(&a, &a).unwrap() - 1.0).abs() < 1e-15);
        assert!(unit_dot(&a, &Vec2::zeros()).is_none());
    }

    #[test]
    fn test_crossing_box() {
        let bbox = crossing_box(2.0, 5.0);
        assert!(bbox.is_valid());
        assert!(!bbox.is_empty());
        assert_eq!((bbox.min.x, bbox.max.x), (2.0, 5.0));
        assert_eq!(bbox.min.y, f64::INFINITY);
    }

    #[test]
    fn test_short_line_is_single_leaf() {
        let tree = single_curve(Box::new(Line2d::from_points(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
        )));
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!((leaves[0].t_min, leaves[0].t_max), (0.0, 1.0));
        assert!(tree.diagnostics().is_empty());
    }

    #[test]
    fn test_long_line_splits_by_size() {
        // Diagonal of the domain is ~28.3, so the limit is ~2.83.
        let tree = single_curve(Box::new(Line2d::from_points(
            Point2::new(-9.0, 0.0),
            Point2::new(9.0, 0.0),
        )));
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 8);
        for leaf in &leaves {
            assert!(leaf.bbox.width() <= 2.83);
        }
        // Size splits are not problem points.
        for id in tree.trim_ids() {
            assert!(!tree.trim_node(id).unwrap().problem);
        }
    }

    #[test]
    fn test_polyline_splits_at_every_knot() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let tree = single_curve(Box::new(BSplineCurve2d::polyline(pts)));
        let mut domains: Vec<(f64, f64)> =
            tree.leaves().iter().map(|l| (l.t_min, l.t_max)).collect();
        domains.sort_by(|x, y| x.0.total_cmp(&y.0));
        assert_eq!(
            domains,
            vec![(0.0, 0.25), (0.25, 0.5), (0.5, 0.75), (0.75, 1.0)]
        );
        let root = tree.trim_roots(0)[0];
        assert!(tree.trim_node(root).unwrap().problem);
    }

    #[test]
    fn test_circle_splits_at_tangents() {
        let tree = single_curve(Box::new(Circle2d::new(Point2::origin(), 2.0)));
        let root = tree.trim_node(tree.trim_roots(0)[0]).unwrap();
        assert!(root.problem);
        // The first split is the vertical tangent at angle π.
        let left = tree.trim_node(root.left).unwrap();
        assert!((left.t_max - PI).abs() < 1e-8);
        assert!(left.problem);
        // Every leaf is flat enough.
        for leaf in tree.leaves() {
            let sweep = leaf.t_max - leaf.t_min;
            assert!(sweep <= PI / 4.0 + 1e-9, "leaf sweep {}", sweep);
        }
    }

    #[test]
    fn test_nurbs_circle_splits_at_knots_first() {
        let tree = single_curve(Box::new(NurbsCurve2d::circle(Point2::origin(), 3.0)));
        let root = tree.trim_node(tree.trim_roots(0)[0]).unwrap();
        assert!(root.problem);
        let left = tree.trim_node(root.left).unwrap();
        assert_eq!((left.t_min, left.t_max), (0.0, 0.5));
        for leaf in tree.leaves() {
            for k in [0.25, 0.5, 0.75] {
                assert!(!(leaf.t_min < k && k < leaf.t_max));
            }
        }
    }

    #[test]
    fn test_degenerate_domain_is_excluded() {
        let face = FaceTrims::new(((0.0, 1.0), (0.0, 1.0))).with_loop(vec![
            Box::new(Circle2d::arc(Point2::origin(), 1.0, 1.0, 1.0)),
            Box::new(Line2d::from_points(Point2::new(0.0, 0.0), Point2::new(0.1, 0.0))),
        ]);
        let tree = build_tree(&face, &TrimTreeConfig::default());
        assert_eq!(tree.trim_count(0), Some(1));
        assert!(matches!(
            tree.diagnostics(),
            [BuildDiagnostic::DegenerateDomain {
                loop_index: 0,
                trim_index: 0,
                ..
            }]
        ));
    }

    #[test]
    fn test_depth_limit_is_reported() {
        let config = TrimTreeConfig {
            max_depth: 2,
            ..Default::default()
        };
        let face = FaceTrims::new(((0.0, 1.0), (0.0, 1.0)))
            .with_loop(vec![Box::new(Circle2d::new(Point2::new(0.5, 0.5), 0.4))]);
        let tree = build_tree(&face, &config);
        assert!(tree.leaves().len() <= 4);
        assert!(tree
            .diagnostics()
            .iter()
            .any(|d| matches!(d, BuildDiagnostic::DepthLimit { depth: 2, .. })));
    }

    #[test]
    fn test_loops_are_linked_in_order() {
        let mut face = FaceTrims::new(((0.0, 10.0), (0.0, 10.0)));
        face.add_polygon(&[
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ]);
        face.add_polygon(&[
            Point2::new(6.0, 2.0),
            Point2::new(8.0, 2.0),
            Point2::new(8.0, 4.0),
        ]);
        let tree = build_tree(&face, &TrimTreeConfig::default());
        assert_eq!(tree.loop_count(), 2);
        assert_eq!(tree.trim_count(0), Some(3));
        assert_eq!(tree.trim_count(1), Some(3));

        let outer = tree.loop_bbox(0).unwrap();
        let inner = tree.loop_bbox(1).unwrap();
        assert!(outer.contains_box(&inner));
        assert_eq!(tree.bounding_box(), Some(outer));
    }

    #[test]
    fn test_tangent_cap_still_splits_inside() {
        let config = TrimTreeConfig {
            tangent_max_iterations: 1,
            ..Default::default()
        };
        let face = FaceTrims::new(((-10.0, 10.0), (-10.0, 10.0)))
            .with_loop(vec![Box::new(Circle2d::new(Point2::origin(), 2.0))]);
        let tree = build_tree(&face, &config);
        assert!(tree
            .diagnostics()
            .iter()
            .any(|d| matches!(d, BuildDiagnostic::TangentNotConverged { .. })));

        let root = tree.trim_node(tree.trim_roots(0)[0]).unwrap();
        assert!(root.problem);
        let left = tree.trim_node(root.left).unwrap();
        assert!(left.t_max > 0.0 && left.t_max < TAU, "split at {}", left.t_max);
    }

    #[test]
    fn test_tangent_zero_at_endpoint_is_not_split() {
        // The vertical tangent at angle 0 sits 3e-9 inside the start, within
        // the endpoint margin, so the root falls through to the flatness test.
        let tree = single_curve(Box::new(Circle2d::arc(Point2::origin(), 1.0, -3e-9, PI / 2.0)));
        let root = tree.trim_node(tree.trim_roots(0)[0]).unwrap();
        assert!(!root.problem);
        let left = tree.trim_node(root.left).unwrap();
        assert_eq!(left.t_max, 0.5 * (root.t_min + root.t_max));
        assert!(!tree
            .diagnostics()
            .iter()
            .any(|d| matches!(d, BuildDiagnostic::TangentNotConverged { .. })));
    }

    #[test]
    fn test_non_finite_trim_counts_as_crossing() {
        let tree = build_degraded(&square_with_holed_top(-1.0, 2.0));
        let invalid: Vec<_> = tree
            .diagnostics()
            .iter()
            .filter(|d| matches!(d, BuildDiagnostic::InvalidBox { .. }))
            .collect();
        assert_eq!(invalid.len(), 1);

        let degraded = degraded_nodes(&tree);
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].id, tree.trim_roots(0)[2]);
        assert_eq!((degraded[0].bbox.min.x, degraded[0].bbox.max.x), (0.0, 10.0));

        for u in [2.0, 5.0, 8.0] {
            assert!(!tree.is_trimmed(u, 5.0), "({}, 5) reported trimmed", u);
        }
        assert!(tree.is_trimmed(12.0, 5.0));
        assert!(tree.is_trimmed(5.0, -1.0));
    }

    #[test]
    fn test_partly_non_finite_trim_degrades_smallest_subtree() {
        // The top edge splits by size into quarters, then eighths; the
        // eighths around the hole come back empty.
        let tree = build_degraded(&square_with_holed_top(0.6, 0.7));
        let degraded = degraded_nodes(&tree);
        assert_eq!(degraded.len(), 1);
        assert_eq!((degraded[0].t_min, degraded[0].t_max), (0.5, 0.75));
        assert_eq!((degraded[0].bbox.min.x, degraded[0].bbox.max.x), (2.5, 5.0));

        let mut parent = degraded[0].parent;
        while let Some(node) = tree.trim_node(parent) {
            assert!(node.problem);
            parent = node.parent;
        }

        for u in [1.0, 3.0, 5.0, 8.0] {
            assert!(!tree.is_trimmed(u, 5.0), "({}, 5) reported trimmed", u);
        }
        assert!(tree.is_trimmed(3.0, -1.0));
    }
}
