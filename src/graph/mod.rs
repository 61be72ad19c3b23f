//! Graph data structures and the force simulation.
//!
//! Nodes are keyed by caller-assigned ids in an ordered map, edges and
//! relations are append-only arenas addressed by index, and edge topology is
//! mirrored in petgraph's StableGraph for adjacency and traversal.

mod distance;
mod edge;
mod engine;
mod forces;
mod node;
mod relation;

pub use edge::{Edge, EdgeId};
pub use engine::Graph;
pub use node::{Node, NodeId, NodeState};
pub use relation::{Relation, RelationId};
