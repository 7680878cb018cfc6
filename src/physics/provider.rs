//! Pluggable acceleration models attached to simulated bodies.
//!
//! The family is closed: every variant is listed in [`AccelerationProvider`]
//! and dispatched with a `match`. Configuration (de)serialises as a tagged map,
//! e.g. `{ kind: two_body, parent: 3 }`.

use log::debug;
use serde::{Deserialize, Serialize};

use super::attractor::{AttractorHandle, AttractorIndex, BodyId, SimulatorId};
use super::context::TrajectoryContext;
use super::gravity::point_mass_accel;
use crate::error::ProviderError;
use crate::math::Vector3D;

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Gravity from a single designated parent attractor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TwoBody {
    pub parent: Option<BodyId>,
    #[serde(skip)]
    binding: Option<Binding>,
}

/// Where a two-body provider's cache points.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Binding {
    body: BodyId,
    parent: AttractorHandle,
}

impl TwoBody {
    pub fn new(parent: BodyId) -> Self {
        Self { parent: Some(parent), binding: None }
    }

    /// Simulator and body this instance is bound to, if any.
    pub fn bound_to(&self) -> Option<(SimulatorId, BodyId)> {
        self.binding.map(|b| (b.parent.simulator, b.body))
    }

    /// Cached index of the parent in the bound simulator's attractor list.
    pub fn cached_parent_index(&self) -> Option<usize> {
        self.binding.map(|b| b.parent.index)
    }
}

/// Gravity from every attractor except the body itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NBody {
    /// Mass this body contributes as an attractor, kg.
    #[serde(default)]
    pub mass: Option<f64>,
}

/// Constant thrust spreading `delta_v` over `[start_ut, start_ut + duration]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub delta_v: Vector3D, // m/s
    pub start_ut: f64,     // s
    pub duration: f64,     // s
}

/// Aggregated far-field gravity (tree / grouping approximation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchicalApprox {
    /// Opening angle below which a group is treated as one mass.
    ///
    /// Reserved: carried through configuration but not read until the
    /// approximation is built.
    pub theta: f64,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccelerationProvider {
    TwoBody(TwoBody),
    NBody(NBody),
    Maneuver(Maneuver),
    HierarchicalApprox(HierarchicalApprox),
}

impl Default for AccelerationProvider {
    fn default() -> Self {
        AccelerationProvider::NBody(NBody::default())
    }
}

impl AccelerationProvider {
    pub fn two_body(parent: BodyId) -> Self {
        AccelerationProvider::TwoBody(TwoBody::new(parent))
    }

    pub fn n_body(mass: Option<f64>) -> Self {
        AccelerationProvider::NBody(NBody { mass })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccelerationProvider::TwoBody(_) => "two-body",
            AccelerationProvider::NBody(_) => "n-body",
            AccelerationProvider::Maneuver(_) => "maneuver",
            AccelerationProvider::HierarchicalApprox(_) => "hierarchical approximation",
        }
    }

    /// Independent copy bound to `body` inside `simulator`.
    ///
    /// All configuration checks happen here so that the per-step query never
    /// has to discover a broken setup.
    pub fn clone_for(
        &self,
        body: BodyId,
        simulator: &impl AttractorIndex,
    ) -> Result<Self, ProviderError> {
        match self {
            AccelerationProvider::TwoBody(p) => {
                let Some(parent) = p.parent else {
                    return Ok(AccelerationProvider::TwoBody(TwoBody::default()));
                };
                if parent == body {
                    return Err(ProviderError::invalid(format!(
                        "body {} cannot be its own gravitational parent",
                        body
                    )));
                }
                let handle = simulator.attractor_handle(parent).ok_or_else(|| {
                    ProviderError::invalid(format!(
                        "parent {} is not an attractor in {}",
                        parent,
                        simulator.simulator_id()
                    ))
                })?;
                debug!(
                    "bound two-body provider of {} to parent {} at index {} in {}",
                    body, parent, handle.index, handle.simulator
                );
                Ok(AccelerationProvider::TwoBody(TwoBody {
                    parent: Some(parent),
                    binding: Some(Binding { body, parent: handle }),
                }))
            }
            AccelerationProvider::NBody(p) => {
                if let Some(m) = p.mass {
                    if !(m.is_finite() && m >= 0.0) {
                        return Err(ProviderError::invalid(format!(
                            "n-body mass must be finite and non-negative, got {}",
                            m
                        )));
                    }
                }
                Ok(self.clone())
            }
            AccelerationProvider::Maneuver(m) => {
                let finite = m.start_ut.is_finite()
                    && m.duration.is_finite()
                    && m.delta_v.iter().all(|c| c.is_finite());
                if !finite || m.duration < 0.0 {
                    return Err(ProviderError::invalid(
                        "maneuver window and delta-v must be finite, duration non-negative",
                    ));
                }
                Ok(self.clone())
            }
            AccelerationProvider::HierarchicalApprox(_) => {
                Err(ProviderError::Unsupported("hierarchical approximation gravity"))
            }
        }
    }

    /// Acceleration acting on the context's body, m/s^2.
    pub fn get_acceleration(&self, ctx: &TrajectoryContext<'_>) -> Result<Vector3D, ProviderError> {
        let g = ctx.gravitational_constant();
        match self {
            AccelerationProvider::TwoBody(p) => {
                if p.parent.is_none() {
                    return Ok(Vector3D::zeros());
                }
                let binding = p.binding.ok_or_else(|| {
                    ProviderError::invalid("two-body provider used before being bound")
                })?;
                if binding.body != ctx.body() {
                    return Err(ProviderError::invalid(format!(
                        "provider bound to body {} queried for body {}",
                        binding.body,
                        ctx.body()
                    )));
                }
                let parent = ctx.resolve(&binding.parent)?;
                Ok(point_mass_accel(&ctx.position(), &parent.position, parent.mass, g))
            }
            AccelerationProvider::NBody(_) => {
                let own = ctx.self_attractor_index();
                let from = ctx.position();
                Ok(ctx
                    .attractors()
                    .filter(|(i, _)| Some(*i) != own)
                    .map(|(_, a)| point_mass_accel(&from, &a.position, a.mass, g))
                    .fold(Vector3D::zeros(), |acc, a| acc + a))
            }
            AccelerationProvider::Maneuver(_) => {
                Err(ProviderError::Unsupported("maneuver acceleration"))
            }
            AccelerationProvider::HierarchicalApprox(_) => {
                Err(ProviderError::Unsupported("hierarchical approximation gravity"))
            }
        }
    }

    /// Mass this body contributes to others, if it acts as an attractor.
    pub fn get_mass(&self, ctx: &TrajectoryContext<'_>) -> Option<f64> {
        match self {
            AccelerationProvider::NBody(p) => {
                p.mass.or_else(|| ctx.self_attractor().map(|a| a.mass))
            }
            AccelerationProvider::TwoBody(_)
            | AccelerationProvider::Maneuver(_)
            | AccelerationProvider::HierarchicalApprox(_) => None,
        }
    }
}
