//! Hop distance from every node to the nearest selected node.
//!
//! Multi-source breadth-first search seeded with the whole selection at
//! once. The distance vector doubles as the visited marker, so every node is
//! enqueued at most once and cycles terminate.

use petgraph::visit::NodeIndexable;
use std::collections::VecDeque;

use super::engine::Graph;

impl Graph {
    /// Recompute `distance_to_selected` for every node.
    ///
    /// Selected nodes get 0, others the minimum number of edge hops to any
    /// selected node, and -1 when unreachable or when nothing is selected.
    pub fn update_distances(&mut self) {
        let mut distances = vec![-1i32; self.topology.node_bound()];
        let mut queue = VecDeque::with_capacity(self.selected.len());

        for id in &self.selected {
            if let Some(&index) = self.node_id_to_index.get(id) {
                distances[index.index()] = 0;
                queue.push_back(index);
            }
        }

        while let Some(current) = queue.pop_front() {
            let next = distances[current.index()] + 1;
            for neighbor in self.topology.neighbors(current) {
                if distances[neighbor.index()] == -1 {
                    distances[neighbor.index()] = next;
                    queue.push_back(neighbor);
                }
            }
        }

        for node in self.nodes.values_mut() {
            let distance = self
                .node_id_to_index
                .get(&node.id())
                .map_or(-1, |index| distances[index.index()]);
            node.set_distance_to_selected(distance);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Graph, NodeId};

    fn graph_with_edges(count: u32, edges: &[(u32, u32)]) -> Graph {
        let mut graph = Graph::default();
        for id in 0..count {
            graph.add_node(NodeId(id), "n", None).unwrap();
        }
        for &(a, b) in edges {
            graph.add_edge(NodeId(a), NodeId(b)).unwrap();
        }
        graph
    }

    fn distances(graph: &Graph) -> Vec<i32> {
        graph.nodes().values().map(|n| n.distance_to_selected()).collect()
    }

    #[test]
    fn test_chain_distances() {
        // A - B - C - D
        let mut graph = graph_with_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        graph.select(NodeId(0)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_no_selection_is_minus_one() {
        let mut graph = graph_with_edges(3, &[(0, 1), (1, 2)]);
        graph.update_distances();
        assert_eq!(distances(&graph), vec![-1, -1, -1]);

        // Clearing the selection resets previously computed distances
        graph.select(NodeId(1)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![1, 0, 1]);
        graph.clear_select();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![-1, -1, -1]);
    }

    #[test]
    fn test_disconnected_component_unreachable() {
        let mut graph = graph_with_edges(4, &[(0, 1), (2, 3)]);
        graph.select(NodeId(0)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![0, 1, -1, -1]);
    }

    #[test]
    fn test_cycle_takes_shortest_path() {
        // 0 - 1 - 2 - 3 - 4 - 5 - 0
        let mut graph =
            graph_with_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]);
        graph.select(NodeId(0)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![0, 1, 2, 3, 2, 1]);
    }

    #[test]
    fn test_multiple_sources_take_nearest() {
        let mut graph = graph_with_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        graph.select(NodeId(0)).unwrap();
        graph.select(NodeId(4)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_self_loop_does_not_disturb_distances() {
        let mut graph = graph_with_edges(2, &[(0, 0), (0, 1)]);
        graph.select(NodeId(0)).unwrap();
        graph.update_distances();
        assert_eq!(distances(&graph), vec![0, 1]);
    }

    #[test]
    fn test_sparse_ids_inserted_out_of_order() {
        let mut graph = Graph::default();
        for id in [40, 7, 300, 2] {
            graph.add_node(NodeId(id), "n", None).unwrap();
        }
        graph.add_edge(NodeId(300), NodeId(7)).unwrap();
        graph.add_edge(NodeId(7), NodeId(40)).unwrap();
        graph.select(NodeId(300)).unwrap();

        graph.step(0.0);

        // id order: 2, 7, 40, 300
        assert_eq!(distances(&graph), vec![-1, 1, 2, 0]);
    }
}
