//! Graph - the activation network as a physical system.
//!
//! The Graph owns the nodes (keyed by caller-assigned id), the edges (in
//! creation order) and the relations, mirrors the edge topology in petgraph's
//! StableGraph for adjacency queries, and owns the selection and hover state.
//! Force helpers live in `forces.rs`, selection distances in `distance.rs`.

use petgraph::Undirected;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};
use super::relation::{Relation, RelationId};
use crate::error::{GraphError, Result};
use crate::math::Vec2;
use crate::physics::PhysicsConfig;
use crate::spatial::{NodePoint, SpatialIndex};

/// The simulated graph.
///
/// This struct manages:
/// - Nodes by id, iterated in id order so every tick sums forces in the
///   same order
/// - Edge and relation arenas, append-only for the session
/// - Edge topology via petgraph
/// - The selection set and the hovered node
/// - Spatial index for picking
pub struct Graph {
    /// Physics tunables shared by every node.
    pub(super) config: PhysicsConfig,

    /// Edge topology. Nodes store their NodeId, edges their EdgeId.
    pub(super) topology: StableGraph<NodeId, EdgeId, Undirected>,

    /// Map from NodeId to petgraph NodeIndex
    pub(super) node_id_to_index: HashMap<NodeId, NodeIndex>,

    pub(super) nodes: BTreeMap<NodeId, Node>,

    /// Creation order; EdgeId is the index.
    edges: Vec<Edge>,

    /// RelationId is the index.
    relations: Vec<Relation>,

    /// Sole source of truth for selection.
    pub(super) selected: BTreeSet<NodeId>,

    hovered: Option<NodeId>,

    /// Spawn positions and random picks
    rng: StdRng,

    /// Spatial index for picking
    spatial: SpatialIndex,

    /// Whether positions changed since the spatial index was built
    spatial_dirty: bool,
}

impl Graph {
    /// Create an empty graph simulated with `config`.
    pub fn new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: PhysicsConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            topology: StableGraph::default(),
            node_id_to_index: HashMap::new(),
            nodes: BTreeMap::new(),
            edges: Vec::new(),
            relations: Vec::new(),
            selected: BTreeSet::new(),
            hovered: None,
            spatial: SpatialIndex::new(),
            spatial_dirty: false,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the physics tunables. Existing nodes keep their mass, damping
    /// and base charge.
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node, or return the existing one if `id` is already present.
    ///
    /// A new node spawns next to `neighbour` when given, otherwise at a
    /// pseudo-random position around the origin. Spawning everything at one
    /// point would make the first repulsion step degenerate.
    pub fn add_node(
        &mut self,
        id: NodeId,
        label: &str,
        neighbour: Option<NodeId>,
    ) -> Result<&mut Node> {
        if !self.nodes.contains_key(&id) {
            let position = self.spawn_position(neighbour)?;
            let node = Node::new(id, label, position, &self.config);

            let index = self.topology.add_node(id);
            self.node_id_to_index.insert(id, index);
            self.nodes.insert(id, node);
            self.spatial_dirty = true;

            debug!(%id, label, x = position.x, y = position.y, "node added");
        }
        self.node_mut(id)
    }

    fn spawn_position(&mut self, neighbour: Option<NodeId>) -> Result<Vec2> {
        let (center, radius) = match neighbour {
            Some(n) => (self.node(n)?.position(), self.config.neighbour_spawn_radius),
            None => (Vec2::ZERO, self.config.spawn_radius),
        };
        let jitter = Vec2::new(
            self.rng.gen_range(-radius..=radius),
            self.rng.gen_range(-radius..=radius),
        );
        Ok(center + jitter)
    }

    /// Look up a node. Unknown ids are a caller logic error.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Mutable node lookup.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// A uniformly chosen node, or None for an empty graph.
    pub fn random_node(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..self.nodes.len());
        self.nodes.keys().nth(pick).copied()
    }

    /// Grow the graph with `amount` randomly labelled nodes, for stress and
    /// demo runs.
    ///
    /// Each node takes the next free id, spawns next to a random existing
    /// node and links to it, then gets `relations - 1` more edges to random
    /// nodes (possibly itself). Returns the new ids.
    pub fn add_random_nodes(&mut self, amount: usize, relations: usize) -> Result<Vec<NodeId>> {
        const LABEL_LEN: usize = 6;

        let mut added = Vec::with_capacity(amount);
        for _ in 0..amount {
            let id = self
                .nodes
                .keys()
                .next_back()
                .map_or(NodeId(0), |last| NodeId(last.raw() + 1));
            let label: String = (0..LABEL_LEN)
                .map(|_| char::from(self.rng.gen_range(b'a'..=b'z')))
                .collect();

            let neighbour = self.random_node();
            self.add_node(id, &label, neighbour)?;

            if let Some(neighbour) = neighbour {
                self.add_edge(id, neighbour)?;
            }
            for _ in 1..relations {
                if let Some(other) = self.random_node() {
                    self.add_edge(id, other)?;
                }
            }
            added.push(id);
        }

        debug!(amount, relations, nodes = self.nodes.len(), "random nodes added");
        Ok(added)
    }

    /// Move a node, e.g. while the UI drags it.
    pub fn set_node_position(&mut self, id: NodeId, position: Vec2) -> Result<()> {
        self.node_mut(id)?.set_position(position);
        self.spatial_dirty = true;
        Ok(())
    }

    /// Pin a node (exclude from integration).
    pub fn pin_node(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.set_pinned(true);
        Ok(())
    }

    /// Unpin a node.
    pub fn unpin_node(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.set_pinned(false);
        Ok(())
    }

    /// Give a node a temporary repulsion boost that decays over the
    /// following steps.
    pub fn tickle(&mut self, id: NodeId, intensity: f32) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.tickle(intensity, &self.config);
        Ok(())
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Link two nodes. Idempotent: if an edge already exists between them,
    /// in either order, its id is returned and nothing is created.
    ///
    /// A new edge starts with weight 0 and records a relation `from -> to`
    /// on both endpoints.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;

        if let Some(existing) = self.get_edge(from, to) {
            return Ok(existing.id());
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        let relation_id = self.push_relation(from, to, Some(edge_id));

        self.edges.push(Edge::new(edge_id, from, to, relation_id));
        self.topology.add_edge(from_index, to_index, edge_id);

        debug!(%from, %to, edge = %edge_id, "edge added");
        Ok(edge_id)
    }

    /// The edge between `a` and `b` in either order, if any.
    pub fn get_edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        let a_index = self.node_id_to_index.get(&a)?;
        let b_index = self.node_id_to_index.get(&b)?;
        self.topology
            .find_edge(*a_index, *b_index)
            .and_then(|e| self.topology.edge_weight(e))
            .map(|edge_id| &self.edges[edge_id.index()])
    }

    /// Mutable variant of [`get_edge`](Self::get_edge).
    pub fn get_edge_mut(&mut self, a: NodeId, b: NodeId) -> Option<&mut Edge> {
        let edge_id = self.get_edge(a, b)?.id();
        self.edges.get_mut(edge_id.index())
    }

    /// Every edge touching `id`.
    pub fn edges_for(&self, id: NodeId) -> Result<Vec<&Edge>> {
        let index = self.index_of(id)?;
        Ok(self
            .topology
            .edges(index)
            .map(|e| &self.edges[e.weight().index()])
            .collect())
    }

    /// All edges, in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges with mutable access to their weights.
    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn edges_count(&self) -> usize {
        self.edges.len()
    }

    pub(super) fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_id_to_index
            .get(&id)
            .copied()
            .ok_or(GraphError::NodeNotFound(id))
    }

    // =========================================================================
    // Relations
    // =========================================================================

    fn push_relation(&mut self, from: NodeId, to: NodeId, edge: Option<EdgeId>) -> RelationId {
        let id = RelationId(self.relations.len() as u32);
        self.relations.push(Relation::new(id, from, to, edge));

        if let Some(node) = self.nodes.get_mut(&from) {
            node.push_relation(id);
        }
        if to != from {
            if let Some(node) = self.nodes.get_mut(&to) {
                node.push_relation(id);
            }
        }
        id
    }

    /// Record an annotation-only relation `from -> to`. Unlike edges,
    /// relations may be duplicated between the same pair.
    pub fn add_relation(&mut self, from: NodeId, to: NodeId) -> Result<RelationId> {
        self.index_of(from)?;
        self.index_of(to)?;
        Ok(self.push_relation(from, to, None))
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(id.index())
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Nodes one relation away from `id`, without duplicates, in the order
    /// the relations were recorded.
    pub fn connected_nodes(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.node(id)?;
        let mut connected = Vec::new();
        for rel in node.relations() {
            let other = self.relations[rel.index()].other(id);
            if let Some(other) = other {
                if !connected.contains(&other) {
                    connected.push(other);
                }
            }
        }
        Ok(connected)
    }

    /// True iff a relation exists between `a` and `b` in either direction.
    pub fn is_connected_to(&self, a: NodeId, b: NodeId) -> Result<bool> {
        self.node(b)?;
        Ok(self
            .node(a)?
            .relations()
            .iter()
            .any(|rel| self.relations[rel.index()].involves(a, b)))
    }

    /// Every relation between `a` and `b`, in either direction. Empty when
    /// the nodes are unrelated.
    pub fn relations_between(&self, a: NodeId, b: NodeId) -> Result<Vec<&Relation>> {
        self.node(b)?;
        Ok(self
            .node(a)?
            .relations()
            .iter()
            .map(|rel| &self.relations[rel.index()])
            .filter(|rel| rel.involves(a, b))
            .collect())
    }

    // =========================================================================
    // Selection and Hover
    // =========================================================================

    pub fn select(&mut self, id: NodeId) -> Result<()> {
        self.index_of(id)?;
        self.selected.insert(id);
        Ok(())
    }

    pub fn deselect(&mut self, id: NodeId) -> Result<()> {
        self.index_of(id)?;
        self.selected.remove(&id);
        Ok(())
    }

    pub fn clear_select(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    /// One of the selected nodes, or None. Callers must not rely on which.
    pub fn get_selected(&self) -> Option<NodeId> {
        self.selected.iter().next().copied()
    }

    /// The full selection, possibly empty.
    pub fn all_selected(&self) -> &BTreeSet<NodeId> {
        &self.selected
    }

    /// Mark `id` as the hovered node, replacing any previous one. `None`
    /// clears the hover.
    pub fn set_hovered(&mut self, id: Option<NodeId>) -> Result<()> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        self.hovered = id;
        Ok(())
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.hovered == Some(id)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by `dt`.
    ///
    /// Net forces for every node are computed first, from the positions and
    /// charges as they stand at the start of the tick, then every node is
    /// integrated and its tickle pulse decayed. Distances to the selection
    /// are refreshed last.
    pub fn step(&mut self, dt: f32) {
        if dt > 0.0 && !self.nodes.is_empty() {
            let forces: Vec<(NodeId, Vec2)> = self
                .nodes
                .values()
                .map(|node| (node.id(), self.net_force_on(node)))
                .collect();

            let config = &self.config;
            let mut frozen = 0usize;
            for (id, force) in forces {
                if let Some(node) = self.nodes.get_mut(&id) {
                    if !node.integrate(force, dt, config) {
                        frozen += 1;
                    }
                    node.decay(dt, config);
                }
            }
            self.spatial_dirty = true;

            trace!(nodes = self.nodes.len(), frozen, dt, "step");
        }

        self.update_distances();
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index from current positions.
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial.rebuild(
            self.nodes
                .values()
                .map(|node| NodePoint::new(node.id(), node.position())),
        );
        self.spatial_dirty = false;
    }

    fn ensure_spatial_index(&mut self) {
        if self.spatial_dirty {
            self.rebuild_spatial_index();
        }
    }

    /// The node nearest to `at`, if one lies within `radius`.
    pub fn pick(&mut self, at: Vec2, radius: f32) -> Option<NodeId> {
        self.ensure_spatial_index();
        self.spatial.nearest_within(at, radius)
    }

    /// Nodes inside the box spanned by `min` and `max`.
    pub fn nodes_in_rect(&mut self, min: Vec2, max: Vec2) -> Vec<NodeId> {
        self.ensure_spatial_index();
        self.spatial.in_rect(min, max)
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box of all nodes as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut positions = self.nodes.values().map(Node::position);
        let first = positions.next()?;
        Some(positions.fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::with_valid_config(PhysicsConfig::default())
    }
}
