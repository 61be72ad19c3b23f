//! Force helpers.
//!
//! All three forces read the graph as it stands; `Graph::step` evaluates
//! them for every node before moving any, so they always see a consistent
//! start-of-tick snapshot.

use super::engine::Graph;
use super::node::{Node, NodeId};
use crate::error::Result;
use crate::math::Vec2;
use crate::physics::SpringWeighting;

impl Graph {
    /// Sum of every force acting on `node`.
    pub(super) fn net_force_on(&self, node: &Node) -> Vec2 {
        self.coulomb_repulsion_on(node) + self.hooke_attraction_on(node) + self.gravity_on(node)
    }

    /// Inverse-square repulsion from every other node, pushing `id` away.
    pub fn coulomb_repulsion_for(&self, id: NodeId) -> Result<Vec2> {
        Ok(self.coulomb_repulsion_on(self.node(id)?))
    }

    /// Spring force from every edge incident to `id`.
    pub fn hooke_attraction_for(&self, id: NodeId) -> Result<Vec2> {
        Ok(self.hooke_attraction_on(self.node(id)?))
    }

    /// Constant pull toward the origin, felt only by selected nodes.
    pub fn gravity_for(&self, id: NodeId) -> Result<Vec2> {
        Ok(self.gravity_on(self.node(id)?))
    }

    /// Repulsion a test charge carrying `initial_charge` would feel at `position`.
    pub fn coulomb_repulsion_at(&self, position: Vec2) -> Vec2 {
        self.nodes
            .values()
            .map(|other| self.repulsion(position, self.config.initial_charge, None, other))
            .sum()
    }

    /// `d` rescaled to length `magnitude`. A zero `d` gives a zero vector.
    pub fn project(&self, magnitude: f32, d: Vec2) -> Vec2 {
        d.normalize() * magnitude
    }

    pub(super) fn coulomb_repulsion_on(&self, node: &Node) -> Vec2 {
        self.nodes
            .values()
            .filter(|other| other.id() != node.id())
            .map(|other| self.repulsion(node.position(), node.charge(), Some(node.id()), other))
            .sum()
    }

    /// Repulsion on a charge at `position` from `other`.
    ///
    /// Separations under `min_separation` are clamped. Exactly coincident
    /// nodes have no direction between them, so the lower id is pushed
    /// toward -x and the higher toward +x.
    fn repulsion(&self, position: Vec2, charge: f32, id: Option<NodeId>, other: &Node) -> Vec2 {
        let away = position - other.position();
        let distance = away.length();
        let clamped = distance.max(self.config.min_separation);
        let magnitude =
            self.config.coulomb_constant * charge * other.charge() / (clamped * clamped);

        let direction = if distance > f32::EPSILON {
            away / distance
        } else {
            match id {
                Some(id) if id < other.id() => Vec2::new(-1.0, 0.0),
                Some(id) if id > other.id() => Vec2::new(1.0, 0.0),
                _ => Vec2::ZERO,
            }
        };
        direction * magnitude
    }

    pub(super) fn hooke_attraction_on(&self, node: &Node) -> Vec2 {
        let Some(&index) = self.node_id_to_index.get(&node.id()) else {
            return Vec2::ZERO;
        };

        let mut force = Vec2::ZERO;
        for edge_ref in self.topology.edges(index) {
            let edge = &self.edges()[edge_ref.weight().index()];
            let Some(other_id) = edge.other(node.id()) else {
                continue;
            };
            if other_id == node.id() {
                continue;
            }
            let Some(other) = self.nodes.get(&other_id) else {
                continue;
            };

            let delta = other.position() - node.position();
            let length = delta.length();
            if length <= f32::EPSILON {
                continue;
            }

            let stiffness = match self.config.spring_weighting {
                SpringWeighting::Uniform => self.config.spring_constant,
                SpringWeighting::ByWeight => self.config.spring_constant * edge.weight(),
            };
            let stretch = length - self.config.nominal_edge_length;
            force += delta / length * (stiffness * stretch);
        }
        force
    }

    pub(super) fn gravity_on(&self, node: &Node) -> Vec2 {
        if !self.selected.contains(&node.id()) {
            return Vec2::ZERO;
        }
        self.project(self.config.gravity_constant, -node.position())
    }
}
