use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::gravity::G;

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,                     // fixed step, s
    pub max_time: f64,               // hard stop for the demo runner, s
    pub gravitational_constant: f64, // m^3 kg^-1 s^-2
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,          // 50 Hz fixed update
            max_time: 3600.0,  // 1 h
            gravitational_constant: G,
        }
    }
}

// ---------------------------------------------------------------------------
// Floating origin config
// ---------------------------------------------------------------------------

/// How far the origin moves once the anchor leaves the threshold cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecenterMode {
    /// Move by whole threshold cells on each axis that exceeded the threshold.
    #[default]
    Grid,
    /// Move the origin onto the anchor.
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatingOriginConfig {
    pub threshold: f32, // half-width of the threshold cube, local units
    pub recenter: RecenterMode,
}

impl Default for FloatingOriginConfig {
    fn default() -> Self {
        Self {
            threshold: 10_000.0,
            recenter: RecenterMode::Grid,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub sim: SimConfig,
    pub origin: FloatingOriginConfig,
    pub trail_length: usize, // samples kept per body, 0 disables trails
}

impl WorldConfig {
    /// Parse and validate a YAML document. Missing keys fall back to defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sim.dt > 0.0 && self.sim.dt.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "sim.dt must be positive, got {}",
                self.sim.dt
            )));
        }
        if !(self.sim.max_time >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "sim.max_time must not be negative, got {}",
                self.sim.max_time
            )));
        }
        if !(self.sim.gravitational_constant > 0.0 && self.sim.gravitational_constant.is_finite()) {
            return Err(ConfigError::Invalid("sim.gravitational_constant must be positive".into()));
        }
        if !(self.origin.threshold > 0.0 && self.origin.threshold.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "origin.threshold must be positive, got {}",
                self.origin.threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = WorldConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.origin.threshold, 10_000.0);
        assert_eq!(config.origin.recenter, RecenterMode::Grid);
    }

    #[test]
    fn partial_document_overrides() {
        let yaml = "
sim:
  dt: 0.1
origin:
  threshold: 5000.0
  recenter: anchor
trail_length: 64
";
        let config = WorldConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.sim.dt, 0.1);
        assert_eq!(config.sim.gravitational_constant, G);
        assert_eq!(config.origin.threshold, 5000.0);
        assert_eq!(config.origin.recenter, RecenterMode::Anchor);
        assert_eq!(config.trail_length, 64);
    }

    #[test]
    fn non_positive_threshold_rejected() {
        let err = WorldConfig::from_yaml_str("origin: { threshold: 0.0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn zero_dt_rejected() {
        let err = WorldConfig::from_yaml_str("sim: { dt: 0.0 }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_reported() {
        let err = WorldConfig::from_yaml_str("sim: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
