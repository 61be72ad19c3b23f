//! Spatial indexing for O(log n) picking.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-neighbor and range queries on node positions.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
