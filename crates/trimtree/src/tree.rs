//! The built per-face structure and its read-only introspection.

use rayon::prelude::*;
use trimtree_geom::Curve2d;
use trimtree_math::Aabb2;

use crate::arena::{Arena, NodeId};
use crate::build::build_tree;
use crate::config::TrimTreeConfig;
use crate::error::{BuildDiagnostic, Result};
use crate::face::TrimmedFace;

/// Where a trim came from on the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimSource {
    /// Loop position in the face.
    pub loop_index: usize,
    /// Trim position in the loop.
    pub trim_index: usize,
}

/// A snapshot of one trim node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimNodeView {
    /// The node's handle.
    pub id: NodeId,
    /// Parent node, `NodeId::NONE` for a trim root.
    pub parent: NodeId,
    /// Left child, `NodeId::NONE` for a leaf.
    pub left: NodeId,
    /// Right child, `NodeId::NONE` for a leaf.
    pub right: NodeId,
    /// Interval start.
    pub t_min: f64,
    /// Interval end.
    pub t_max: f64,
    /// Split at a knot or a horizontal/vertical tangent, or above a
    /// degraded node.
    pub problem: bool,
    /// The curve evaluated to non-finite points here; the node stands in
    /// for one crossing over its u-range.
    pub degraded: bool,
    /// Box over the node's part of the curve.
    pub bbox: Aabb2,
    /// Which trim of the face this node belongs to.
    pub source: TrimSource,
}

impl TrimNodeView {
    /// True if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Trim-curve subdivision trees for every loop of one face.
///
/// Built once from a [`TrimmedFace`]; immutable afterwards. Curves are
/// cloned into the tree, so it does not borrow from the face and can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct CurveTree {
    pub(crate) arena: Arena,
    pub(crate) loops: Vec<NodeId>,
    pub(crate) curves: Vec<Box<dyn Curve2d>>,
    sources: Vec<TrimSource>,
    pub(crate) config: TrimTreeConfig,
    diagnostics: Vec<BuildDiagnostic>,
}

impl CurveTree {
    /// Build with the default configuration.
    pub fn build<F: TrimmedFace + ?Sized>(face: &F) -> Self {
        build_tree(face, &TrimTreeConfig::default())
    }

    /// Build with an explicit configuration.
    pub fn build_with_config<F: TrimmedFace + ?Sized>(
        face: &F,
        config: &TrimTreeConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(build_tree(face, config))
    }

    pub(crate) fn from_parts(
        arena: Arena,
        loops: Vec<NodeId>,
        curves: Vec<Box<dyn Curve2d>>,
        sources: Vec<TrimSource>,
        config: TrimTreeConfig,
        diagnostics: Vec<BuildDiagnostic>,
    ) -> Self {
        Self {
            arena,
            loops,
            curves,
            sources,
            config,
            diagnostics,
        }
    }

    /// Head of the loop list.
    pub(crate) fn first_loop(&self) -> NodeId {
        self.loops.first().copied().unwrap_or(NodeId::NONE)
    }

    /// Union of all loop boxes, or `None` if no loop has a usable trim.
    pub fn bounding_box(&self) -> Option<Aabb2> {
        let bbox = (0..self.loops.len())
            .filter_map(|i| self.loop_bbox(i))
            .fold(Aabb2::empty(), |acc, b| acc.union(&b));
        (!bbox.is_empty()).then_some(bbox)
    }

    /// Number of loops, including loops whose trims were all excluded.
    pub fn loop_count(&self) -> usize {
        self.loops.len()
    }

    /// Aggregate box of one loop.
    pub fn loop_bbox(&self, loop_index: usize) -> Option<Aabb2> {
        let node = self.arena.loop_node(*self.loops.get(loop_index)?)?;
        Some(self.arena.bbox(node.bbox))
    }

    /// Number of trims of one loop that made it into the tree.
    pub fn trim_count(&self, loop_index: usize) -> Option<usize> {
        let node = self.arena.loop_node(*self.loops.get(loop_index)?)?;
        Some(node.trim_count as usize)
    }

    /// Root node of each included trim of one loop.
    pub fn trim_roots(&self, loop_index: usize) -> &[NodeId] {
        self.loops
            .get(loop_index)
            .and_then(|&id| self.arena.loop_node(id))
            .map(|node| node.trims.as_slice())
            .unwrap_or(&[])
    }

    /// Number of loop and trim nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len() - 1
    }

    /// Ids of every trim node.
    pub fn trim_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.arena.trim_ids()
    }

    /// Look up a trim node.
    pub fn trim_node(&self, id: NodeId) -> Option<TrimNodeView> {
        let node = self.arena.trim(id)?;
        let (t_min, t_max) = self.arena.domain(node);
        Some(TrimNodeView {
            id,
            parent: node.parent,
            left: node.left,
            right: node.right,
            t_min,
            t_max,
            problem: node.problem,
            degraded: node.degraded,
            bbox: self.arena.bbox(node.bbox),
            source: self.sources[node.curve as usize],
        })
    }

    /// Call `f` on every trim node.
    pub fn visit_trims<F: FnMut(&TrimNodeView)>(&self, mut f: F) {
        for id in self.arena.trim_ids() {
            if let Some(view) = self.trim_node(id) {
                f(&view);
            }
        }
    }

    /// Every leaf, in creation order.
    pub fn leaves(&self) -> Vec<TrimNodeView> {
        let mut leaves = Vec::new();
        self.visit_trims(|view| {
            if view.is_leaf() {
                leaves.push(*view);
            }
        });
        leaves
    }

    /// Problems found while building.
    pub fn diagnostics(&self) -> &[BuildDiagnostic] {
        &self.diagnostics
    }

    /// The configuration the tree was built with.
    pub fn config(&self) -> &TrimTreeConfig {
        &self.config
    }
}

/// Build trees for several faces in parallel.
///
/// Each face gets its own arena; results are in input order.
pub fn build_many<F: TrimmedFace + Sync>(
    faces: &[F],
    config: &TrimTreeConfig,
) -> Result<Vec<CurveTree>> {
    config.validate()?;
    Ok(faces.par_iter().map(|face| build_tree(face, config)).collect())
}
