//! Physics tunables.
//!
//! Every constant the simulation depends on lives in [`PhysicsConfig`] and is
//! handed to the [`Graph`](crate::graph::Graph) at construction, so several
//! independent simulations can coexist in one process.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How edge weights feed into the Hooke spring force.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpringWeighting {
    /// Every edge is the same spring, weights are display-only.
    #[default]
    Uniform,
    /// Spring constant is multiplied by the edge weight.
    ByWeight,
}

/// Configuration for the force simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Initial node mass (default: 1.0).
    pub mass: f32,
    /// Velocity multiplier applied every step, 0 < d <= 1 (default: 0.95).
    /// 1 means no damping at all.
    pub damping: f32,
    /// Strength of the inverse-square repulsion (default: 20000.0).
    #[serde(alias = "repulsion")]
    pub coulomb_constant: f32,
    /// Rest-state charge of a new node (default: 1.0).
    pub initial_charge: f32,
    /// Magnitude of the pull toward the origin felt by selected nodes (default: 10.0).
    pub gravity_constant: f32,
    /// Hooke spring constant (default: 20.0).
    pub spring_constant: f32,
    /// Spring rest length (default: 50.0).
    pub nominal_edge_length: f32,
    /// Nodes whose kinetic energy falls below this do not move (default: 30.0).
    pub min_kinetic_energy: f32,
    /// Velocity magnitude clamp (default: 50.0).
    #[serde(alias = "maxspeed")]
    pub max_speed: f32,
    /// Separation used in place of anything closer when computing repulsion (default: 1.0).
    pub min_separation: f32,
    /// Whether springs scale with edge weight (default: uniform).
    pub spring_weighting: SpringWeighting,
    /// Half-extent of the square new unconnected nodes spawn in (default: 100.0).
    pub spawn_radius: f32,
    /// Jitter around the neighbour a new node spawns next to (default: 10.0).
    pub neighbour_spawn_radius: f32,
    /// Charge gain per unit of tickle intensity (default: 2.0).
    pub tickle_gain: f32,
    /// Seconds a tickle takes to relax at decay speed 1 (default: 1.0).
    pub decay_duration: f32,
    /// Seed for spawn positions and random node picks (default: 0).
    pub seed: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 0.95,
            coulomb_constant: 20000.0,
            initial_charge: 1.0,
            gravity_constant: 10.0,
            spring_constant: 20.0,
            nominal_edge_length: 50.0,
            min_kinetic_energy: 30.0,
            max_speed: 50.0,
            min_separation: 1.0,
            spring_weighting: SpringWeighting::Uniform,
            spawn_radius: 100.0,
            neighbour_spawn_radius: 10.0,
            tickle_gain: 2.0,
            decay_duration: 1.0,
            seed: 0,
        }
    }
}

/// Legacy config layout: physics settings nested under a `"physics"` key
/// next to unrelated display settings.
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    physics: Option<PhysicsConfig>,
}

impl PhysicsConfig {
    /// Parse a config from JSON.
    ///
    /// Accepts either a bare physics object or a document with a `"physics"`
    /// section. Missing fields take their defaults. The result is validated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let config = if value.get("physics").is_some() {
            let file: ConfigFile = serde_json::from_value(value)?;
            file.physics.unwrap_or_default()
        } else {
            serde_json::from_value(value)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in a range the integrator can handle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(field: &'static str, value: f32, ok: bool) -> Result<(), ConfigError> {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange { field, value })
            }
        }

        check("mass", self.mass, self.mass > 0.0)?;
        check("damping", self.damping, self.damping > 0.0 && self.damping <= 1.0)?;
        check("coulomb_constant", self.coulomb_constant, self.coulomb_constant >= 0.0)?;
        check("initial_charge", self.initial_charge, true)?;
        check("gravity_constant", self.gravity_constant, self.gravity_constant >= 0.0)?;
        check("spring_constant", self.spring_constant, self.spring_constant >= 0.0)?;
        check(
            "nominal_edge_length",
            self.nominal_edge_length,
            self.nominal_edge_length >= 0.0,
        )?;
        check(
            "min_kinetic_energy",
            self.min_kinetic_energy,
            self.min_kinetic_energy >= 0.0,
        )?;
        check("max_speed", self.max_speed, self.max_speed >= 0.0)?;
        check("min_separation", self.min_separation, self.min_separation > 0.0)?;
        check("spawn_radius", self.spawn_radius, self.spawn_radius >= 0.0)?;
        check(
            "neighbour_spawn_radius",
            self.neighbour_spawn_radius,
            self.neighbour_spawn_radius >= 0.0,
        )?;
        check("tickle_gain", self.tickle_gain, self.tickle_gain >= 0.0)?;
        check("decay_duration", self.decay_duration, self.decay_duration > 0.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_speed, 50.0);
        assert_eq!(config.spring_weighting, SpringWeighting::Uniform);
    }

    #[test]
    fn test_from_json_legacy_section() {
        let json = r#"{
            "shadows": false,
            "physics": { "mass": 2.0, "damping": 0.8, "repulsion": 5000.0, "maxspeed": 20.0 }
        }"#;
        let config = PhysicsConfig::from_json(json).unwrap();
        assert_eq!(config.mass, 2.0);
        assert_eq!(config.damping, 0.8);
        assert_eq!(config.coulomb_constant, 5000.0);
        assert_eq!(config.max_speed, 20.0);
        // Untouched fields keep their defaults
        assert_eq!(config.spring_constant, 20.0);
    }

    #[test]
    fn test_from_json_bare_object() {
        let config =
            PhysicsConfig::from_json(r#"{ "min_separation": 2.5, "spring_weighting": "by_weight" }"#)
                .unwrap();
        assert_eq!(config.min_separation, 2.5);
        assert_eq!(config.spring_weighting, SpringWeighting::ByWeight);
        assert_eq!(config.mass, 1.0);
    }

    #[test]
    fn test_from_json_without_physics_section_uses_defaults() {
        let config = PhysicsConfig::from_json(r#"{ "physics": null }"#).unwrap();
        assert_eq!(config, PhysicsConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PhysicsConfig { damping: 0.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "damping", .. })
        ));

        let config = PhysicsConfig { mass: -1.0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = PhysicsConfig { min_separation: 0.0, ..Default::default() };
        assert!(config.validate().is_err());

        assert!(matches!(
            PhysicsConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
