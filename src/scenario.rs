//! Serializable description of a simulated scene.
//!
//! ```yaml
//! name: Home system
//! anchor: 10
//! attractors:
//!   - { id: 1, position: [0.0, 0.0, 0.0], mass: 1.989e30 }
//! bodies:
//!   - id: 10
//!     name: Vessel
//!     position: [1.496e11, 0.0, 0.0]
//!     velocity: [0.0, 29780.0, 0.0]
//!     provider: { kind: two_body, parent: 1 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::error::{ConfigError, ScenarioError, SimError};
use crate::math::Vector3D;
use crate::physics::{AccelerationProvider, AttractorState, BodyId};
use crate::sim::World;

fn zero() -> Vector3D {
    Vector3D::zeros()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub id: BodyId,
    #[serde(default)]
    pub name: String,
    pub position: Vector3D, // m, absolute
    #[serde(default = "zero")]
    pub velocity: Vector3D, // m/s, absolute
    #[serde(default)]
    pub provider: AccelerationProvider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub attractors: Vec<AttractorState>,
    #[serde(default)]
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub anchor: Option<BodyId>,
}

impl Scenario {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn body_name(&self, id: BodyId) -> Option<&str> {
        self.bodies
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.as_str())
    }

    /// Set up a world: attractors first, then bodies (binding their providers),
    /// then the anchor, with the frame centred on it.
    pub fn build(&self, config: &WorldConfig) -> Result<World, ScenarioError> {
        config.validate()?;
        let mut world = World::new(config.clone());
        world.set_attractors(self.attractors.clone())?;
        for body in &self.bodies {
            world.add_body(body.id, body.position, body.velocity, &body.provider)?;
        }
        world.set_anchor(self.anchor).map_err(|e| match e {
            SimError::UnknownBody(id) => ScenarioError::UnknownAnchor(id),
            other => ScenarioError::Sim(other),
        })?;
        world.recenter(&mut []);
        Ok(world)
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;
    use crate::orbital::circular_orbit;
    use crate::physics::gravity::{gravitational_parameter, G};

    pub const STAR: BodyId = BodyId(1);
    pub const PLANET: BodyId = BodyId(2);
    pub const VESSEL: BodyId = BodyId(10);
    pub const PROBE: BodyId = BodyId(11);

    const M_STAR: f64 = 1.989e30;
    const M_PLANET: f64 = 5.972e24;
    const AU: f64 = 1.495_978_707e11;

    /// Star, an orbiting planet and two craft around the planet.
    ///
    /// The planet and vessel feel every attractor; the probe only its parent.
    pub fn star_planet_vessel() -> Scenario {
        let (planet_pos, planet_vel) = circular_orbit(
            &Vector3D::zeros(),
            &Vector3D::zeros(),
            gravitational_parameter(M_STAR, G),
            AU,
            0.0,
        );
        let mu_planet = gravitational_parameter(M_PLANET, G);
        let (vessel_pos, vessel_vel) =
            circular_orbit(&planet_pos, &planet_vel, mu_planet, 6_771_000.0, 0.9);
        let (probe_pos, probe_vel) =
            circular_orbit(&planet_pos, &planet_vel, mu_planet, 4.2e7, 0.0);

        Scenario {
            name: "Star / planet / vessel".into(),
            attractors: vec![
                AttractorState::new(STAR, Vector3D::zeros(), M_STAR),
                AttractorState::new(PLANET, planet_pos, M_PLANET),
            ],
            bodies: vec![
                BodySpec {
                    id: PLANET,
                    name: "Planet".into(),
                    position: planet_pos,
                    velocity: planet_vel,
                    provider: AccelerationProvider::n_body(None),
                },
                BodySpec {
                    id: VESSEL,
                    name: "Vessel".into(),
                    position: vessel_pos,
                    velocity: vessel_vel,
                    provider: AccelerationProvider::n_body(None),
                },
                BodySpec {
                    id: PROBE,
                    name: "Probe".into(),
                    position: probe_pos,
                    velocity: probe_vel,
                    provider: AccelerationProvider::two_body(PLANET),
                },
            ],
            anchor: Some(VESSEL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::math::Vector3F;

    #[test]
    fn preset_builds_and_centres_on_anchor() {
        let scenario = presets::star_planet_vessel();
        let world = scenario.build(&WorldConfig::default()).unwrap();
        assert_eq!(world.anchor(), Some(presets::VESSEL));
        assert_eq!(world.local_position(presets::VESSEL), Some(Vector3F::zeros()));
        assert_eq!(world.simulator().bodies().len(), 3);
        assert_eq!(scenario.body_name(presets::PROBE), Some("Probe"));
    }

    #[test]
    fn yaml_scenario_with_defaults() {
        let yaml = "
name: Two craft
anchor: 10
attractors:
  - { id: 1, position: [0.0, 0.0, 0.0], mass: 5.972e24 }
bodies:
  - id: 10
    position: [7.0e6, 0.0, 0.0]
    velocity: [0.0, 7546.0, 0.0]
    provider: { kind: two_body, parent: 1 }
  - id: 11
    position: [0.0, 8.0e6, 0.0]
";
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(scenario.bodies[1].velocity, Vector3D::zeros());
        assert_eq!(scenario.bodies[1].provider, AccelerationProvider::n_body(None));
        let world = scenario.build(&WorldConfig::default()).unwrap();
        assert!(world.simulator().acceleration_of(BodyId(10)).unwrap().norm() > 8.0);
    }

    #[test]
    fn self_parenting_scenario_fails_to_build() {
        let yaml = "
name: Broken
attractors:
  - { id: 1, position: [0.0, 0.0, 0.0], mass: 1.0e20 }
bodies:
  - id: 1
    position: [0.0, 0.0, 0.0]
    provider: { kind: two_body, parent: 1 }
";
        let err = Scenario::from_yaml_str(yaml)
            .unwrap()
            .build(&WorldConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Sim(SimError::Provider { source: ProviderError::InvalidConfig(_), .. })
        ));
    }

    #[test]
    fn unknown_anchor_reported() {
        let scenario = Scenario {
            name: "Empty".into(),
            attractors: vec![],
            bodies: vec![],
            anchor: Some(BodyId(5)),
        };
        let err = scenario.build(&WorldConfig::default()).unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownAnchor(BodyId(5))));
    }
}
