//! Error types for the graph engine.

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised by graph queries and mutations.
///
/// Duplicate insertion is never an error (`add_node`/`add_edge` are
/// idempotent) and numeric degeneracy is clamped inside the force helpers,
/// so in practice the only failure of the topology API is an unknown id.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("{0} not found")]
    NodeNotFound(NodeId),
    #[error("invalid physics configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("network declares {size} units but provides {provided} {what}")]
    InvalidNetwork {
        size: usize,
        provided: usize,
        what: &'static str,
    },
}

/// Errors raised while loading or validating a [`PhysicsConfig`](crate::physics::PhysicsConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
