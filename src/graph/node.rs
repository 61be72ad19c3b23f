//! Node type and related structures.
//!
//! Nodes are the vertices of the activation network. Each node has:
//! - A caller-assigned identifier (never reused, never removed)
//! - Physics state: position, velocity, mass, damping, charge, kinetic energy
//! - Topology state: the relations it takes part in
//! - Derived state: hop distance to the nearest selected node
//! - A transient charge pulse ("tickle") that decays back to the base charge

use std::fmt;

use super::relation::RelationId;
use crate::math::Vec2;
use crate::physics::PhysicsConfig;

/// Stable node identifier.
///
/// Assigned by the caller (the producer's unit index) and immutable for the
/// lifetime of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const PINNED: u8 = 0b0000_0001;
    const DECAYING: u8 = 0b0000_0010;
    const AT_REST: u8 = 0b0000_0100;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    #[inline]
    fn set(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }

    /// Check if the node is pinned (excluded from integration).
    #[inline]
    pub fn is_pinned(self) -> bool {
        self.flags & Self::PINNED != 0
    }

    /// Set the pinned state.
    #[inline]
    pub fn set_pinned(&mut self, pinned: bool) {
        self.set(Self::PINNED, pinned);
    }

    /// Check if a tickle pulse is still relaxing.
    #[inline]
    pub fn is_decaying(self) -> bool {
        self.flags & Self::DECAYING != 0
    }

    /// Set the decaying state.
    #[inline]
    pub fn set_decaying(&mut self, decaying: bool) {
        self.set(Self::DECAYING, decaying);
    }

    /// Check if the last step left the node in place because its kinetic
    /// energy was under the threshold.
    #[inline]
    pub fn is_at_rest(self) -> bool {
        self.flags & Self::AT_REST != 0
    }

    /// Set the at-rest state.
    #[inline]
    pub fn set_at_rest(&mut self, at_rest: bool) {
        self.set(Self::AT_REST, at_rest);
    }
}

/// A unit of the activation network, as laid out by the simulation.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    safe_label: String,

    /// External stimulus level, written by the producer every tick.
    activity: f32,

    position: Vec2,
    velocity: Vec2,
    mass: f32,
    damping: f32,
    charge: f32,
    base_charge: f32,
    kinetic_energy: f32,

    relations: Vec<RelationId>,

    /// -1 when nothing is selected or no selected node is reachable.
    distance_to_selected: i32,

    decay_time: f32,
    decay_speed: f32,
    tickled_charge: f32,

    state: NodeState,
}

/// Strip everything but ASCII alphanumerics and `_`.
pub(crate) fn safe_label_filter(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

impl Node {
    /// Create a node at rest at `position`, taking mass, damping and charge
    /// from `config`.
    pub fn new(id: NodeId, label: impl Into<String>, position: Vec2, config: &PhysicsConfig) -> Self {
        let label = label.into();
        Self {
            id,
            safe_label: safe_label_filter(&label),
            label,
            activity: 0.0,
            position,
            velocity: Vec2::ZERO,
            mass: config.mass,
            damping: config.damping,
            charge: config.initial_charge,
            base_charge: config.initial_charge,
            kinetic_energy: 0.0,
            relations: Vec::new(),
            distance_to_selected: -1,
            decay_time: 0.0,
            decay_speed: 1.0,
            tickled_charge: config.initial_charge,
            state: NodeState::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label with special characters removed, for contexts that only accept
    /// identifiers.
    #[inline]
    pub fn safe_label(&self) -> &str {
        &self.safe_label
    }

    #[inline]
    pub fn activity(&self) -> f32 {
        self.activity
    }

    #[inline]
    pub fn set_activity(&mut self, activity: f32) {
        self.activity = activity;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    #[inline]
    pub fn charge(&self) -> f32 {
        self.charge
    }

    #[inline]
    pub fn base_charge(&self) -> f32 {
        self.base_charge
    }

    /// `½·m·|v|²` as of the last step.
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        self.kinetic_energy
    }

    /// Relations this node takes part in, as source or target.
    #[inline]
    pub fn relations(&self) -> &[RelationId] {
        &self.relations
    }

    #[inline]
    pub(crate) fn push_relation(&mut self, relation: RelationId) {
        self.relations.push(relation);
    }

    #[inline]
    pub fn distance_to_selected(&self) -> i32 {
        self.distance_to_selected
    }

    #[inline]
    pub(crate) fn set_distance_to_selected(&mut self, distance: i32) {
        self.distance_to_selected = distance;
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.state.set_pinned(pinned);
        if pinned {
            self.velocity = Vec2::ZERO;
            self.kinetic_energy = 0.0;
        }
    }

    #[inline]
    pub fn is_decaying(&self) -> bool {
        self.state.is_decaying()
    }

    fn update_kinetic_energy(&mut self) {
        self.kinetic_energy = 0.5 * self.mass * self.velocity.length_squared();
    }

    /// Advance this node by `dt` under the net `force` computed for it at the
    /// start of the tick.
    ///
    /// Velocity is integrated then damped and clamped to `max_speed`. The
    /// position only moves when the resulting kinetic energy reaches
    /// `min_kinetic_energy`. Returns whether the node moved.
    pub fn integrate(&mut self, force: Vec2, dt: f32, config: &PhysicsConfig) -> bool {
        if dt <= 0.0 {
            return false;
        }
        if self.state.is_pinned() {
            self.velocity = Vec2::ZERO;
            self.kinetic_energy = 0.0;
            self.state.set_at_rest(true);
            return false;
        }

        let force = if force.is_finite() { force } else { Vec2::ZERO };
        let acceleration = force / self.mass;

        self.velocity += acceleration * dt;
        self.velocity *= self.damping;
        self.velocity = self.velocity.clamp_length(config.max_speed);
        self.update_kinetic_energy();

        if self.kinetic_energy < config.min_kinetic_energy {
            self.state.set_at_rest(true);
            return false;
        }

        self.state.set_at_rest(false);
        self.position += self.velocity * dt;
        true
    }

    /// Start a charge pulse. The charge jumps to
    /// `base_charge * (1 + tickle_gain * intensity)` and relaxes back over
    /// subsequent [`decay`](Self::decay) calls; stronger stimuli relax slower.
    pub fn tickle(&mut self, intensity: f32, config: &PhysicsConfig) {
        let intensity = intensity.max(0.0);
        self.tickled_charge = self.base_charge * (1.0 + config.tickle_gain * intensity);
        self.charge = self.tickled_charge;
        self.decay_time = 0.0;
        self.decay_speed = 1.0 / (1.0 + intensity);
        self.state.set_decaying(true);
    }

    /// Advance the tickle pulse by `dt`, linearly relaxing the charge toward
    /// `base_charge`. A no-op when no pulse is running.
    pub fn decay(&mut self, dt: f32, config: &PhysicsConfig) {
        if !self.state.is_decaying() || dt <= 0.0 {
            return;
        }

        self.decay_time += dt * self.decay_speed;
        let progress = self.decay_time / config.decay_duration;

        if progress >= 1.0 {
            self.charge = self.base_charge;
            self.decay_time = 0.0;
            self.state.set_decaying(false);
        } else {
            self.charge = self.tickled_charge + (self.base_charge - self.tickled_charge) * progress;
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" at {}", self.id, self.label, self.position)
    }
}
