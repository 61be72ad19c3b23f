//! R-tree based spatial index using the rstar crate.
//!
//! Node positions change every tick, so the tree is bulk-loaded from a
//! snapshot of the graph rather than maintained incrementally.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;
use crate::math::Vec2;

/// A node position in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// Position at the time the index was rebuilt.
    pub position: Vec2,
}

impl NodePoint {
    pub fn new(id: NodeId, position: Vec2) -> Self {
        Self { id, position }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.position.x, self.position.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        (self.position - Vec2::new(point[0], point[1])).length_squared()
    }
}

/// Spatial index over node positions, used for world-space picking.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Replace the contents of the index with `points`.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = NodePoint>) {
        self.tree = RTree::bulk_load(points.into_iter().collect());
    }

    /// Find the nearest node to a point.
    pub fn nearest(&self, at: Vec2) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[at.x, at.y]).map(|point| point.id)
    }

    /// Find the nearest node no farther than `max_distance` from `at`.
    pub fn nearest_within(&self, at: Vec2, max_distance: f32) -> Option<NodeId> {
        let query = [at.x, at.y];
        self.tree
            .nearest_neighbor(&query)
            .filter(|point| point.distance_2(&query) <= max_distance * max_distance)
            .map(|point| point.id)
    }

    /// All nodes inside the axis-aligned box spanned by `min` and `max`.
    pub fn in_rect(&self, min: Vec2, max: Vec2) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(points: &[(u32, f32, f32)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(
            points
                .iter()
                .map(|&(id, x, y)| NodePoint::new(NodeId(id), Vec2::new(x, y))),
        );
        index
    }

    #[test]
    fn test_nearest() {
        let index = index_of(&[(0, 0.0, 0.0), (1, 10.0, 10.0), (2, 5.0, 5.0)]);

        assert_eq!(index.nearest(Vec2::new(0.0, 0.0)), Some(NodeId(0)));
        assert_eq!(index.nearest(Vec2::new(6.0, 6.0)), Some(NodeId(2)));
        assert_eq!(index.nearest(Vec2::new(11.0, 11.0)), Some(NodeId(1)));
    }

    #[test]
    fn test_nearest_within() {
        let index = index_of(&[(0, 0.0, 0.0), (1, 10.0, 10.0)]);

        assert_eq!(index.nearest_within(Vec2::ZERO, 5.0), Some(NodeId(0)));
        assert_eq!(index.nearest_within(Vec2::new(5.0, 5.0), 1.0), None);
        // ~7.07 away
        assert_eq!(index.nearest_within(Vec2::new(5.0, 5.0), 8.0), Some(NodeId(0)));
    }

    #[test]
    fn test_in_rect() {
        let index = index_of(&[(0, 0.0, 0.0), (1, 5.0, 5.0), (2, 10.0, 10.0)]);

        let found = index.in_rect(Vec2::new(-1.0, -1.0), Vec2::new(6.0, 6.0));
        assert_eq!(found.len(), 2);
        assert!(found.contains(&NodeId(0)));
        assert!(found.contains(&NodeId(1)));
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = index_of(&[(0, 0.0, 0.0)]);
        assert_eq!(index.len(), 1);

        index.rebuild(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.nearest(Vec2::ZERO), None);
    }
}
