//! Activation Graph - WASM Module
//!
//! Physics and topology engine for visualising an evolving activation
//! network (units and their pairwise weights) as a force-directed graph. It
//! is compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen; rendering, camera and input handling live on the JS side.
//!
//! # Architecture
//!
//! - `graph`: Nodes, edges, relations, forces and selection distances
//! - `network`: Reconciliation with the producer of activations and weights
//! - `simulation`: Frame driver (dt clamping, time scale, pause)
//! - `physics`: Tunable constants
//! - `spatial`: R-tree spatial indexing for O(log n) picking

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod math;
pub mod network;
pub mod physics;
pub mod simulation;
pub mod spatial;

pub use error::{ConfigError, GraphError};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, Relation, RelationId};
pub use math::Vec2;
pub use network::{NetworkSnapshot, NetworkSource, SyncOptions, SyncReport, sync_from_network};
pub use physics::{PhysicsConfig, SpringWeighting};
pub use simulation::{Simulation, TickConfig};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn config_from_js<T: Default + serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    if value.is_undefined() || value.is_null() {
        Ok(T::default())
    } else {
        Ok(serde_wasm_bindgen::from_value(value)?)
    }
}

/// Main entry point for the engine.
///
/// Wraps a [`Simulation`] and provides the public API exposed to
/// JavaScript. Lookup failures surface as thrown `Error`s.
#[wasm_bindgen]
pub struct ActivationGraphWasm {
    sim: Simulation,
}

#[wasm_bindgen]
impl ActivationGraphWasm {
    /// Create an empty engine.
    ///
    /// # Arguments
    ///
    /// * `physics` - Optional `PhysicsConfig`-shaped object; missing fields
    ///   take their defaults
    /// * `tick` - Optional `TickConfig`-shaped object
    #[wasm_bindgen(constructor)]
    pub fn new(physics: JsValue, tick: JsValue) -> Result<ActivationGraphWasm, JsError> {
        let physics: PhysicsConfig = config_from_js(physics)?;
        let tick: TickConfig = config_from_js(tick)?;
        Ok(Self {
            sim: Simulation::new(physics, tick)?,
        })
    }

    /// Create an engine from a JSON config document, either a bare physics
    /// object or one with a `physics` section.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<ActivationGraphWasm, JsError> {
        let physics = PhysicsConfig::from_json(json)?;
        Ok(Self {
            sim: Simulation::new(physics, TickConfig::default())?,
        })
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Add a node (no-op if the id exists), optionally spawning it next to
    /// `neighbour`.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, id: u32, label: &str, neighbour: Option<u32>) -> Result<(), JsError> {
        self.sim
            .graph_mut()
            .add_node(NodeId(id), label, neighbour.map(NodeId))?;
        Ok(())
    }

    /// Link two nodes (no-op if already linked). Returns the edge ID.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, from: u32, to: u32) -> Result<u32, JsError> {
        Ok(self.sim.graph_mut().add_edge(NodeId(from), NodeId(to))?.raw())
    }

    /// Add `amount` random nodes, each linked to `relations` random nodes.
    /// Returns the new node IDs.
    #[wasm_bindgen(js_name = addRandomNodes)]
    pub fn add_random_nodes(&mut self, amount: u32, relations: u32) -> Result<Vec<u32>, JsError> {
        Ok(self
            .sim
            .graph_mut()
            .add_random_nodes(amount as usize, relations as usize)?
            .into_iter()
            .map(NodeId::raw)
            .collect())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.sim.graph().nodes_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.sim.graph().edges_count() as u32
    }

    /// Node IDs in the order used by every per-node buffer below.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<u32> {
        self.sim.graph().nodes().keys().map(|id| id.raw()).collect()
    }

    #[wasm_bindgen(js_name = nodeLabel)]
    pub fn node_label(&self, id: u32) -> Result<String, JsError> {
        Ok(self.sim.graph().node(NodeId(id))?.label().to_owned())
    }

    #[wasm_bindgen(js_name = nodeSafeLabel)]
    pub fn node_safe_label(&self, id: u32) -> Result<String, JsError> {
        Ok(self.sim.graph().node(NodeId(id))?.safe_label().to_owned())
    }

    /// Node IDs one relation away from `id`.
    #[wasm_bindgen(js_name = getConnectedNodes)]
    pub fn get_connected_nodes(&self, id: u32) -> Result<Vec<u32>, JsError> {
        Ok(self
            .sim
            .graph()
            .connected_nodes(NodeId(id))?
            .into_iter()
            .map(NodeId::raw)
            .collect())
    }

    // =========================================================================
    // Selection and Hover
    // =========================================================================

    pub fn select(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().select(NodeId(id))?)
    }

    pub fn deselect(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().deselect(NodeId(id))?)
    }

    #[wasm_bindgen(js_name = clearSelect)]
    pub fn clear_select(&mut self) {
        self.sim.graph_mut().clear_select();
    }

    #[wasm_bindgen(js_name = isSelected)]
    pub fn is_selected(&self, id: u32) -> bool {
        self.sim.graph().is_selected(NodeId(id))
    }

    #[wasm_bindgen(js_name = getSelected)]
    pub fn get_selected(&self) -> Option<u32> {
        self.sim.graph().get_selected().map(NodeId::raw)
    }

    #[wasm_bindgen(js_name = getAllSelected)]
    pub fn get_all_selected(&self) -> Vec<u32> {
        self.sim.graph().all_selected().iter().map(|id| id.raw()).collect()
    }

    #[wasm_bindgen(js_name = setHovered)]
    pub fn set_hovered(&mut self, id: Option<u32>) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().set_hovered(id.map(NodeId))?)
    }

    #[wasm_bindgen(js_name = getHovered)]
    pub fn get_hovered(&self) -> Option<u32> {
        self.sim.graph().hovered().map(NodeId::raw)
    }

    /// Find the nearest node within `radius` of a graph-space point.
    pub fn pick(&mut self, x: f32, y: f32, radius: f32) -> Option<u32> {
        self.sim.graph_mut().pick(Vec2::new(x, y), radius).map(NodeId::raw)
    }

    /// Find all nodes inside a rectangle (box selection).
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<u32> {
        self.sim
            .graph_mut()
            .nodes_in_rect(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y))
            .into_iter()
            .map(NodeId::raw)
            .collect()
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Move a node, e.g. while it is dragged.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, id: u32, x: f32, y: f32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().set_node_position(NodeId(id), Vec2::new(x, y))?)
    }

    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().pin_node(NodeId(id))?)
    }

    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, id: u32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().unpin_node(NodeId(id))?)
    }

    /// Start a decaying repulsion boost on a node.
    pub fn tickle(&mut self, id: u32, intensity: f32) -> Result<(), JsError> {
        Ok(self.sim.graph_mut().tickle(NodeId(id), intensity)?)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Step the physics by exactly `dt` seconds, bypassing the frame driver.
    pub fn step(&mut self, dt: f32) {
        self.sim.graph_mut().step(dt);
    }

    /// Run one frame without producer input. Returns the delta-time used.
    pub fn tick(&mut self, dt: f32) -> Result<f32, JsError> {
        Ok(self.sim.tick::<NetworkSnapshot>(None, dt)?)
    }

    /// Run one frame, first reconciling with a `NetworkSnapshot`-shaped
    /// object `{ names, activations, weights }`.
    #[wasm_bindgen(js_name = tickWithNetwork)]
    pub fn tick_with_network(&mut self, snapshot: JsValue, dt: f32) -> Result<f32, JsError> {
        let snapshot: NetworkSnapshot = serde_wasm_bindgen::from_value(snapshot)?;
        Ok(self.sim.tick(Some(&snapshot), dt)?)
    }

    /// Reconcile with a `NetworkSnapshot`-shaped object without stepping.
    /// Returns the number of nodes added.
    #[wasm_bindgen(js_name = syncNetwork)]
    pub fn sync_network(&mut self, snapshot: JsValue) -> Result<u32, JsError> {
        let snapshot: NetworkSnapshot = serde_wasm_bindgen::from_value(snapshot)?;
        Ok(self.sim.sync(&snapshot)?.added_nodes as u32)
    }

    #[wasm_bindgen(js_name = setPaused)]
    pub fn set_paused(&mut self, paused: bool) {
        self.sim.set_paused(paused);
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.sim.is_paused()
    }

    #[wasm_bindgen(js_name = setTimeScale)]
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.sim.set_time_scale(time_scale);
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Interleaved positions [x0, y0, x1, y1, ...] in `nodeIds()` order.
    pub fn positions(&self) -> Float32Array {
        let positions: Vec<f32> = self
            .sim
            .graph()
            .nodes()
            .values()
            .flat_map(|node| {
                let p = node.position();
                [p.x, p.y]
            })
            .collect();
        Float32Array::from(&positions[..])
    }

    /// Activity levels in `nodeIds()` order.
    pub fn activities(&self) -> Float32Array {
        let activities: Vec<f32> = self.sim.graph().nodes().values().map(Node::activity).collect();
        Float32Array::from(&activities[..])
    }

    /// Hop distance to the selection (-1 if unreachable) in `nodeIds()` order.
    pub fn distances(&self) -> Vec<i32> {
        self.sim
            .graph()
            .nodes()
            .values()
            .map(Node::distance_to_selected)
            .collect()
    }

    /// Edge endpoints [a0, b0, a1, b1, ...] in creation order.
    #[wasm_bindgen(js_name = edgePairs)]
    pub fn edge_pairs(&self) -> Vec<u32> {
        self.sim
            .graph()
            .edges()
            .iter()
            .flat_map(|edge| [edge.id1().raw(), edge.id2().raw()])
            .collect()
    }

    /// Edge weights in creation order.
    #[wasm_bindgen(js_name = edgeWeights)]
    pub fn edge_weights(&self) -> Float32Array {
        let weights: Vec<f32> = self.sim.graph().edges().iter().map(Edge::weight).collect();
        Float32Array::from(&weights[..])
    }

    /// Returns [min_x, min_y, max_x, max_y], or None if the graph is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.sim
            .graph()
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }
}
