//! Index-addressed node storage for a single face's tree.
//!
//! All loop and trim nodes of a face live in one append-only `Vec` and
//! refer to each other by [`NodeId`]. Index 0 holds a sentinel, so
//! `NodeId::NONE` doubles as "no parent", "no child" and "end of list".
//! Parameter values and boxes are kept in two side pools and referenced by
//! slot.

use trimtree_math::Aabb2;

/// Handle of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The reserved sentinel.
    pub const NONE: NodeId = NodeId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        NodeId(index as u32)
    }

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True for the sentinel.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Slot in the t-coordinate or box pool.
pub(crate) type Slot = u32;

/// One loop of the face.
#[derive(Debug, Clone)]
pub(crate) struct LoopNode {
    /// Next loop in face order, `NONE` for the last.
    pub next: NodeId,
    /// Number of trims that made it into the tree.
    pub trim_count: u32,
    /// Aggregate box slot.
    pub bbox: Slot,
    /// Root trim node of each trim, in loop order.
    pub trims: Vec<NodeId>,
}

/// One interval of one trim curve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrimNode {
    pub parent: NodeId,
    /// t-pool slot of the interval start.
    pub t_min: Slot,
    /// t-pool slot of the interval end.
    pub t_max: Slot,
    pub left: NodeId,
    pub right: NodeId,
    /// Split at a knot or a horizontal/vertical tangent; the chord across
    /// this node is never trusted.
    pub problem: bool,
    /// The curve could not be boxed here; the node counts as one crossing
    /// anywhere in its u-range.
    pub degraded: bool,
    pub bbox: Slot,
    /// Index into the tree's curve table.
    pub curve: u32,
}

impl TrimNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Sentinel,
    Loop(LoopNode),
    Trim(TrimNode),
}

/// Append-only node, t-coordinate and box storage.
#[derive(Debug, Clone)]
pub(crate) struct Arena {
    nodes: Vec<Node>,
    t_pool: Vec<f64>,
    boxes: Vec<Aabb2>,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Sentinel],
            t_pool: Vec::new(),
            boxes: Vec::new(),
        }
    }

    /// Number of nodes including the sentinel.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn push_loop(&mut self, node: LoopNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::Loop(node));
        id
    }

    pub fn push_trim(&mut self, node: TrimNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::Trim(node));
        id
    }

    pub fn push_t(&mut self, t: f64) -> Slot {
        self.t_pool.push(t);
        (self.t_pool.len() - 1) as Slot
    }

    pub fn push_box(&mut self, bbox: Aabb2) -> Slot {
        self.boxes.push(bbox);
        (self.boxes.len() - 1) as Slot
    }

    pub fn loop_node(&self, id: NodeId) -> Option<&LoopNode> {
        match self.nodes.get(id.index()) {
            Some(Node::Loop(node)) => Some(node),
            _ => None,
        }
    }

    pub fn loop_node_mut(&mut self, id: NodeId) -> Option<&mut LoopNode> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Loop(node)) => Some(node),
            _ => None,
        }
    }

    pub fn trim(&self, id: NodeId) -> Option<&TrimNode> {
        match self.nodes.get(id.index()) {
            Some(Node::Trim(node)) => Some(node),
            _ => None,
        }
    }

    pub fn trim_mut(&mut self, id: NodeId) -> Option<&mut TrimNode> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Trim(node)) => Some(node),
            _ => None,
        }
    }

    /// Ids of every trim node, in creation order.
    pub fn trim_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Trim(_)))
            .map(|(i, _)| NodeId::from_index(i))
    }

    pub fn t(&self, slot: Slot) -> f64 {
        self.t_pool[slot as usize]
    }

    /// Parameter interval of a trim node.
    pub fn domain(&self, node: &TrimNode) -> (f64, f64) {
        (self.t(node.t_min), self.t(node.t_max))
    }

    pub fn bbox(&self, slot: Slot) -> Aabb2 {
        self.boxes[slot as usize]
    }

    pub fn bbox_mut(&mut self, slot: Slot) -> &mut Aabb2 {
        &mut self.boxes[slot as usize]
    }
}
