use super::attractor::{AttractorHandle, AttractorState, BodyId, SimulatorId};
use crate::error::ProviderError;
use crate::math::Vector3D;

/// Read-only view handed to a provider for a single acceleration query.
///
/// Built fresh for every query and borrowed from the simulator; providers never
/// see how the simulator stores its attractors.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryContext<'a> {
    pub(crate) ut: f64,
    pub(crate) body: BodyId,
    pub(crate) position: Vector3D,
    pub(crate) self_attractor_index: Option<usize>,
    pub(crate) simulator: SimulatorId,
    pub(crate) epoch: u64,
    pub(crate) gravitational_constant: f64,
    pub(crate) attractors: &'a [AttractorState],
}

impl<'a> TrajectoryContext<'a> {
    /// Simulated universal time, s.
    pub fn ut(&self) -> f64 {
        self.ut
    }

    /// The body the acceleration is being computed for.
    pub fn body(&self) -> BodyId {
        self.body
    }

    /// Absolute position of the acting body.
    pub fn position(&self) -> Vector3D {
        self.position
    }

    /// Index of the acting body in the attractor list, if it is an attractor.
    pub fn self_attractor_index(&self) -> Option<usize> {
        self.self_attractor_index
    }

    pub fn attractor_count(&self) -> usize {
        self.attractors.len()
    }

    pub fn attractor(&self, index: usize) -> Option<&'a AttractorState> {
        self.attractors.get(index)
    }

    pub fn attractors(&self) -> impl Iterator<Item = (usize, &'a AttractorState)> {
        self.attractors.iter().enumerate()
    }

    pub fn self_attractor(&self) -> Option<&'a AttractorState> {
        self.self_attractor_index.and_then(|i| self.attractors.get(i))
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    pub fn simulator(&self) -> SimulatorId {
        self.simulator
    }

    /// Follow a cached handle, rejecting handles this run cannot honour.
    pub fn resolve(&self, handle: &AttractorHandle) -> Result<&'a AttractorState, ProviderError> {
        if handle.simulator != self.simulator {
            return Err(ProviderError::invalid(format!(
                "handle belongs to {}, queried from {}",
                handle.simulator, self.simulator
            )));
        }
        if handle.epoch != self.epoch {
            return Err(ProviderError::invalid(format!(
                "stale attractor handle (epoch {}, list is at epoch {})",
                handle.epoch, self.epoch
            )));
        }
        self.attractors.get(handle.index).ok_or_else(|| {
            ProviderError::invalid(format!(
                "attractor index {} out of range ({} attractors)",
                handle.index,
                self.attractors.len()
            ))
        })
    }
}
