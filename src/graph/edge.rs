//! Edge type and related structures.
//!
//! Edges are the simulation-visible links between nodes. Each edge has:
//! - A stable identifier (its creation index)
//! - The unordered pair of endpoint node IDs
//! - A weight written by the producer every tick
//! - The ID of the relation that was recorded when the edge was created

use std::fmt;

use super::node::NodeId;
use super::relation::RelationId;

/// Stable edge identifier.
///
/// Edges are never removed, so the ID doubles as the index into the graph's
/// edge sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// An undirected weighted link between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    id: EdgeId,
    id1: NodeId,
    id2: NodeId,
    weight: f32,
    relation: RelationId,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, id1: NodeId, id2: NodeId, relation: RelationId) -> Self {
        Self {
            id,
            id1,
            id2,
            weight: 0.0,
            relation,
        }
    }

    #[inline]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// First endpoint (the `from` node at creation).
    #[inline]
    pub fn id1(&self) -> NodeId {
        self.id1
    }

    /// Second endpoint (the `to` node at creation).
    #[inline]
    pub fn id2(&self) -> NodeId {
        self.id2
    }

    #[inline]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.id1, self.id2)
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    #[inline]
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// The relation recorded alongside this edge.
    #[inline]
    pub fn relation(&self) -> RelationId {
        self.relation
    }

    /// True if `node` is one of the endpoints.
    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.id1 == node || self.id2 == node
    }

    /// True if this edge links `a` and `b`, in either order.
    #[inline]
    pub fn links(&self, a: NodeId, b: NodeId) -> bool {
        (self.id1 == a && self.id2 == b) || (self.id1 == b && self.id2 == a)
    }

    /// The endpoint opposite `node`, or None if `node` is not an endpoint.
    #[inline]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.id1 == node {
            Some(self.id2)
        } else if self.id2 == node {
            Some(self.id1)
        } else {
            None
        }
    }

    /// Whether both endpoints are the same node.
    #[inline]
    pub fn is_self_loop(&self) -> bool {
        self.id1 == self.id2
    }
}
