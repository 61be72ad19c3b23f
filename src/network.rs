//! Reconciliation with the network-state producer.
//!
//! Once per tick the producer exposes its unit count, unit names, activation
//! levels and a symmetric weight matrix. Unit `i` maps to node `NodeId(i)`.
//! The graph only ever grows to match: units are never removed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::graph::{Graph, NodeId};

/// Read-only view of the producer's state for one tick.
pub trait NetworkSource {
    /// Number of units. Grows monotonically over a session.
    fn size(&self) -> usize;

    /// Unit names, index-aligned with node ids.
    fn unit_names(&self) -> &[String];

    /// Activation levels, index-aligned with node ids.
    fn activations(&self) -> &[f32];

    /// Weight between units `i` and `j`. Symmetric.
    fn weight(&self, i: usize, j: usize) -> f32;
}

/// An owned snapshot of the producer state, e.g. received from JavaScript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSnapshot {
    pub names: Vec<String>,
    pub activations: Vec<f32>,
    /// Row-major `names.len() × names.len()` matrix. Missing entries read as 0.
    pub weights: Vec<f32>,
}

impl NetworkSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit with zero activation and no weights, growing the matrix.
    pub fn add_unit(&mut self, name: impl Into<String>) -> usize {
        let old = self.names.len();
        let new = old + 1;

        let mut weights = vec![0.0; new * new];
        for i in 0..old {
            for j in 0..old {
                weights[i * new + j] = self.weight(i, j);
            }
        }
        self.weights = weights;
        self.names.push(name.into());
        self.activations.resize(new, 0.0);
        old
    }

    pub fn set_activation(&mut self, unit: usize, level: f32) {
        if let Some(slot) = self.activations.get_mut(unit) {
            *slot = level;
        }
    }

    /// Set the weight between two units, keeping the matrix symmetric.
    pub fn set_weight(&mut self, i: usize, j: usize, weight: f32) {
        let n = self.names.len();
        if i < n && j < n {
            self.weights[i * n + j] = weight;
            self.weights[j * n + i] = weight;
        }
    }
}

impl NetworkSource for NetworkSnapshot {
    fn size(&self) -> usize {
        self.names.len()
    }

    fn unit_names(&self) -> &[String] {
        &self.names
    }

    fn activations(&self) -> &[f32] {
        &self.activations
    }

    fn weight(&self, i: usize, j: usize) -> f32 {
        let n = self.names.len();
        if i >= n || j >= n {
            return 0.0;
        }
        self.weights.get(i * n + j).copied().unwrap_or(0.0)
    }
}

/// Knobs for [`sync_from_network`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Tickle a node when its activation rises by more than this in one tick.
    pub tickle_threshold: Option<f32>,
}

/// What a sync changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added_nodes: usize,
    pub added_edges: usize,
    pub tickled: usize,
}

/// Bring `graph` in line with the producer.
///
/// When any producer unit has no node yet, every missing unit is added and
/// every pair of units without an edge is linked. Nodes added outside the
/// producer's id range do not count toward its units. Then
/// activations are copied into the nodes and weights into the edges between
/// producer units.
pub fn sync_from_network<S: NetworkSource + ?Sized>(
    graph: &mut Graph,
    source: &S,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let size = source.size();
    let names = source.unit_names();
    let activations = source.activations();

    if names.len() < size {
        return Err(GraphError::InvalidNetwork {
            size,
            provided: names.len(),
            what: "names",
        });
    }
    if activations.len() < size {
        return Err(GraphError::InvalidNetwork {
            size,
            provided: activations.len(),
            what: "activations",
        });
    }

    let mut report = SyncReport::default();

    if (0..size).any(|i| !graph.contains_node(unit_id(i))) {
        let nodes_before = graph.nodes_count();
        let edges_before = graph.edges_count();

        for (i, name) in names.iter().enumerate().take(size) {
            graph.add_node(unit_id(i), name, None)?;
        }
        for i in 0..size {
            for j in (i + 1)..size {
                if graph.get_edge(unit_id(i), unit_id(j)).is_none() {
                    graph.add_edge(unit_id(i), unit_id(j))?;
                }
            }
        }

        report.added_nodes = graph.nodes_count() - nodes_before;
        report.added_edges = graph.edges_count() - edges_before;
        debug!(
            units = size,
            added_nodes = report.added_nodes,
            added_edges = report.added_edges,
            "graph extended from network"
        );
    }

    for (i, &level) in activations.iter().enumerate().take(size) {
        let node = graph.node_mut(unit_id(i))?;
        let previous = node.activity();
        node.set_activity(level);

        if let Some(threshold) = options.tickle_threshold {
            if level - previous > threshold {
                graph.tickle(unit_id(i), level)?;
                report.tickled += 1;
            }
        }
    }

    for edge in graph.edges_mut() {
        let (a, b) = (edge.id1().raw() as usize, edge.id2().raw() as usize);
        if a < size && b < size {
            edge.set_weight(source.weight(a, b));
        }
    }

    Ok(report)
}

#[inline]
fn unit_id(index: usize) -> NodeId {
    NodeId(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(names: &[&str]) -> NetworkSnapshot {
        let mut snap = NetworkSnapshot::new();
        for name in names {
            snap.add_unit(*name);
        }
        snap
    }

    #[test]
    fn test_snapshot_grows_matrix() {
        let mut snap = snapshot(&["a", "b"]);
        snap.set_weight(0, 1, 0.3);
        snap.add_unit("c");

        assert_eq!(snap.size(), 3);
        assert_eq!(snap.weights.len(), 9);
        assert_eq!(snap.weight(1, 0), 0.3);
        assert_eq!(snap.weight(2, 0), 0.0);
        assert_eq!(snap.weight(5, 0), 0.0);
    }

    #[test]
    fn test_sync_builds_full_mesh() {
        let mut graph = Graph::default();
        let snap = snapshot(&["a", "b", "c", "d"]);

        let report = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(report.added_nodes, 4);
        assert_eq!(report.added_edges, 6);
        assert_eq!(graph.nodes_count(), 4);
        assert_eq!(graph.edges_count(), 6);
        assert_eq!(graph.node(NodeId(2)).unwrap().label(), "c");
    }

    #[test]
    fn test_sync_is_incremental() {
        let mut graph = Graph::default();
        let mut snap = snapshot(&["a", "b"]);
        sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        let first_pos = graph.node(NodeId(0)).unwrap().position();

        snap.add_unit("c");
        let report = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(report.added_nodes, 1);
        assert_eq!(report.added_edges, 2);
        assert_eq!(graph.edges_count(), 3);
        assert_eq!(graph.node(NodeId(0)).unwrap().position(), first_pos);

        // Nothing new: no topology changes
        let report = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(report, SyncReport::default());
    }

    #[test]
    fn test_sync_copies_activity_and_weights() {
        let mut graph = Graph::default();
        let mut snap = snapshot(&["a", "b", "c"]);
        sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();

        snap.set_activation(1, 0.8);
        snap.set_weight(0, 2, 0.25);
        sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();

        assert_eq!(graph.node(NodeId(1)).unwrap().activity(), 0.8);
        assert_eq!(graph.get_edge(NodeId(2), NodeId(0)).unwrap().weight(), 0.25);
        assert_eq!(graph.get_edge(NodeId(0), NodeId(1)).unwrap().weight(), 0.0);
    }

    #[test]
    fn test_sync_leaves_foreign_edges_alone() {
        let mut graph = Graph::default();
        graph.add_node(NodeId(10), "extra", None).unwrap();
        let snap = snapshot(&["a", "b"]);
        sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();

        let edge = graph.add_edge(NodeId(0), NodeId(10)).unwrap();
        graph.edges_mut()[edge.raw() as usize].set_weight(0.9);
        sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(graph.get_edge(NodeId(0), NodeId(10)).unwrap().weight(), 0.9);
    }

    #[test]
    fn test_sync_with_only_foreign_nodes_present() {
        let mut graph = Graph::default();
        graph.add_node(NodeId(10), "extra", None).unwrap();
        let mut snap = snapshot(&["a"]);
        snap.set_activation(0, 0.4);

        let report = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(report.added_nodes, 1);
        assert_eq!(graph.node(NodeId(0)).unwrap().activity(), 0.4);

        // Steady state on later ticks
        let report = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap();
        assert_eq!(report, SyncReport::default());
        assert_eq!(graph.nodes_count(), 2);
    }

    #[test]
    fn test_sync_tickles_on_activation_rise() {
        let mut graph = Graph::default();
        let mut snap = snapshot(&["a", "b"]);
        let options = SyncOptions { tickle_threshold: Some(0.5) };
        sync_from_network(&mut graph, &snap, &options).unwrap();

        snap.set_activation(0, 0.9);
        snap.set_activation(1, 0.2);
        let report = sync_from_network(&mut graph, &snap, &options).unwrap();
        assert_eq!(report.tickled, 1);
        assert!(graph.node(NodeId(0)).unwrap().is_decaying());
        assert!(!graph.node(NodeId(1)).unwrap().is_decaying());
    }

    #[test]
    fn test_sync_rejects_short_activations() {
        let mut graph = Graph::default();
        let mut snap = snapshot(&["a", "b"]);
        snap.activations.truncate(1);

        let err = sync_from_network(&mut graph, &snap, &SyncOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidNetwork { size: 2, provided: 1, what: "activations" }
        ));
        assert_eq!(graph.nodes_count(), 0);
    }
}
