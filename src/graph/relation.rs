//! Directed annotations between nodes.
//!
//! A relation is recorded every time an edge is created, and may also be
//! added on its own. Unlike edges, several relations may exist between the
//! same pair of nodes.

use std::fmt;

use super::edge::EdgeId;
use super::node::NodeId;

/// Relation identifier: the index into the graph's relation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(pub u32);

impl RelationId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relation({})", self.0)
    }
}

/// A directed record from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    id: RelationId,
    from: NodeId,
    to: NodeId,
    edge: Option<EdgeId>,
}

impl Relation {
    pub(crate) fn new(id: RelationId, from: NodeId, to: NodeId, edge: Option<EdgeId>) -> Self {
        Self { id, from, to, edge }
    }

    #[inline]
    pub fn id(&self) -> RelationId {
        self.id
    }

    #[inline]
    pub fn from(&self) -> NodeId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// The edge created together with this relation, if any.
    #[inline]
    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }

    /// True if the relation links `a` and `b` in either direction.
    #[inline]
    pub fn involves(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    /// The node at the other end from `node`.
    #[inline]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_direction() {
        let rel = Relation::new(RelationId(3), NodeId(1), NodeId(2), Some(EdgeId(0)));
        assert_eq!(rel.from(), NodeId(1));
        assert_eq!(rel.to(), NodeId(2));
        assert_eq!(rel.edge(), Some(EdgeId(0)));
        assert!(rel.involves(NodeId(2), NodeId(1)));
        assert!(!rel.involves(NodeId(1), NodeId(1)));
        assert_eq!(rel.other(NodeId(2)), Some(NodeId(1)));
        assert_eq!(rel.other(NodeId(5)), None);
        assert_eq!(format!("{}", rel.id()), "Relation(3)");
    }
}
