//! Frame driver.
//!
//! Wraps a [`Graph`] with the per-frame bookkeeping of the control loop:
//! delta-time clamping for numerical stability under slow frames, time
//! scaling, pausing, and producer reconciliation before every step.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ConfigError, Result};
use crate::graph::Graph;
use crate::network::{NetworkSource, SyncOptions, SyncReport, sync_from_network};
use crate::physics::PhysicsConfig;

/// Configuration for the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Largest delta-time fed to the physics, in seconds (default: 1/60).
    pub max_dt: f32,
    /// Multiplier applied to the clamped delta-time (default: 1.0).
    pub time_scale: f32,
    /// Producer sync options.
    pub sync: SyncOptions,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            max_dt: 1.0 / 60.0,
            time_scale: 1.0,
            sync: SyncOptions::default(),
        }
    }
}

impl TickConfig {
    /// Reject a non-positive `max_dt` and a negative `time_scale`. Both must
    /// be finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "max_dt",
                value: self.max_dt,
            });
        }
        if !(self.time_scale.is_finite() && self.time_scale >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "time_scale",
                value: self.time_scale,
            });
        }
        Ok(())
    }
}

/// A graph plus the state of the loop driving it.
pub struct Simulation {
    graph: Graph,
    tick: TickConfig,
    runtime: f32,
    frame_count: u64,
    paused: bool,
}

impl Simulation {
    pub fn new(physics: PhysicsConfig, tick: TickConfig) -> Result<Self> {
        tick.validate()?;
        Ok(Self::from_graph(Graph::new(physics)?, tick))
    }

    pub fn from_graph(graph: Graph, tick: TickConfig) -> Self {
        Self {
            graph,
            tick,
            runtime: 0.0,
            frame_count: 0,
            paused: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn tick_config(&self) -> &TickConfig {
        &self.tick
    }

    /// Negative or NaN scales are treated as 0 (frozen time).
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.tick.time_scale = if time_scale.is_finite() { time_scale.max(0.0) } else { 0.0 };
    }

    /// Simulated seconds elapsed, after clamping and scaling.
    pub fn runtime(&self) -> f32 {
        self.runtime
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// The delta-time the physics will see for a frame of `dt` seconds.
    pub fn effective_dt(&self, dt: f32) -> f32 {
        dt.min(self.tick.max_dt).max(0.0) * self.tick.time_scale
    }

    /// Reconcile the graph with `source` without stepping.
    pub fn sync<S: NetworkSource + ?Sized>(&mut self, source: &S) -> Result<SyncReport> {
        sync_from_network(&mut self.graph, source, &self.tick.sync)
    }

    /// Run one frame: clamp and scale `dt`, then, unless paused, pull the
    /// producer state and step the physics. Returns the delta-time used.
    pub fn tick<S: NetworkSource + ?Sized>(&mut self, source: Option<&S>, dt: f32) -> Result<f32> {
        let dt = self.effective_dt(dt);
        self.runtime += dt;
        self.frame_count += 1;

        if self.paused {
            return Ok(dt);
        }

        if let Some(source) = source {
            self.sync(source)?;
        }
        self.graph.step(dt);

        trace!(frame = self.frame_count, runtime = self.runtime, dt, "tick");
        Ok(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::graph::NodeId;
    use crate::network::NetworkSnapshot;

    fn sim() -> Simulation {
        Simulation::new(PhysicsConfig::default(), TickConfig::default()).unwrap()
    }

    #[test]
    fn test_effective_dt_clamped_and_scaled() {
        let mut sim = sim();
        assert!((sim.effective_dt(1.0) - 1.0 / 60.0).abs() < 1e-7);
        assert_eq!(sim.effective_dt(0.01), 0.01);
        assert_eq!(sim.effective_dt(-1.0), 0.0);

        sim.set_time_scale(2.0);
        assert!((sim.effective_dt(0.01) - 0.02).abs() < 1e-7);
    }

    #[test]
    fn test_invalid_tick_config_rejected() {
        for tick in [
            TickConfig { max_dt: 0.0, ..Default::default() },
            TickConfig { max_dt: f32::NAN, ..Default::default() },
            TickConfig { time_scale: -1.0, ..Default::default() },
            TickConfig { time_scale: f32::NAN, ..Default::default() },
        ] {
            let err = Simulation::new(PhysicsConfig::default(), tick).err().unwrap();
            assert!(matches!(err, GraphError::InvalidConfig(ConfigError::OutOfRange { .. })));
        }

        let mut sim = sim();
        sim.set_time_scale(f32::NAN);
        assert_eq!(sim.effective_dt(0.01), 0.0);
        sim.tick::<NetworkSnapshot>(None, 0.01).unwrap();
        assert_eq!(sim.runtime(), 0.0);
    }

    #[test]
    fn test_tick_syncs_and_steps() {
        let mut sim = sim();
        let mut snap = NetworkSnapshot::new();
        snap.add_unit("a");
        snap.add_unit("b");
        snap.set_activation(1, 0.5);

        let dt = sim.tick(Some(&snap), 0.5).unwrap();
        assert!((dt - 1.0 / 60.0).abs() < 1e-7);
        assert_eq!(sim.graph().nodes_count(), 2);
        assert_eq!(sim.graph().node(NodeId(1)).unwrap().activity(), 0.5);
        assert_eq!(sim.frame_count(), 1);
        assert!((sim.runtime() - dt).abs() < 1e-7);
    }

    #[test]
    fn test_paused_tick_does_not_touch_graph() {
        let mut sim = sim();
        let mut snap = NetworkSnapshot::new();
        snap.add_unit("a");

        sim.toggle_pause();
        assert!(sim.is_paused());
        sim.tick(Some(&snap), 0.01).unwrap();
        assert_eq!(sim.graph().nodes_count(), 0);
        assert_eq!(sim.frame_count(), 1);

        sim.set_paused(false);
        sim.tick(Some(&snap), 0.01).unwrap();
        assert_eq!(sim.graph().nodes_count(), 1);
    }

    #[test]
    fn test_tick_without_source() {
        let mut sim = sim();
        sim.graph_mut().add_node(NodeId(0), "solo", None).unwrap();
        sim.tick::<NetworkSnapshot>(None, 0.01).unwrap();
        assert_eq!(sim.graph().nodes_count(), 1);
    }
}
