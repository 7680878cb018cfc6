use log::debug;

use crate::error::SimError;
use crate::math::{QuaternionD, Vector3D};
use crate::physics::{
    AccelerationProvider, AttractorHandle, AttractorIndex, AttractorState, BodyId, SimulatorId,
    TrajectoryContext,
};

// ---------------------------------------------------------------------------
// Simulated body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimulatedBody {
    pub id: BodyId,
    pub position: Vector3D, // m, absolute
    pub velocity: Vector3D, // m/s, absolute
    pub rotation: QuaternionD,
    provider: AccelerationProvider,
}

impl SimulatedBody {
    /// The provider as bound to this body's simulator.
    pub fn provider(&self) -> &AccelerationProvider {
        &self.provider
    }
}

/// Attractor list seen through the binding API, before it is committed.
struct ListView<'a> {
    simulator: SimulatorId,
    epoch: u64,
    attractors: &'a [AttractorState],
}

impl AttractorIndex for ListView<'_> {
    fn simulator_id(&self) -> SimulatorId {
        self.simulator
    }

    fn attractor_handle(&self, id: BodyId) -> Option<AttractorHandle> {
        let index = self.attractors.iter().position(|a| a.id == id)?;
        Some(AttractorHandle {
            simulator: self.simulator,
            index,
            epoch: self.epoch,
        })
    }
}

// ---------------------------------------------------------------------------
// Trajectory simulator
// ---------------------------------------------------------------------------

/// One simulation run: UT, the ordered attractor list and the bodies moving in it.
///
/// Providers hold attractor indices, not references. The list carries an epoch
/// that is bumped whenever it is reorganised, and every body is re-bound at that
/// point; handles held anywhere else go stale and are refused on query.
#[derive(Debug, Clone)]
pub struct TrajectorySimulator {
    id: SimulatorId,
    ut: f64,
    gravitational_constant: f64,
    epoch: u64,
    attractors: Vec<AttractorState>,
    bodies: Vec<SimulatedBody>,
}

impl TrajectorySimulator {
    pub fn new(gravitational_constant: f64) -> Self {
        Self {
            id: SimulatorId::next(),
            ut: 0.0,
            gravitational_constant,
            epoch: 0,
            attractors: Vec::new(),
            bodies: Vec::new(),
        }
    }

    pub fn id(&self) -> SimulatorId {
        self.id
    }

    pub fn ut(&self) -> f64 {
        self.ut
    }

    /// Adopt the external clock's UT.
    pub fn set_ut(&mut self, ut: f64) {
        self.ut = ut;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    pub fn attractors(&self) -> &[AttractorState] {
        &self.attractors
    }

    pub fn attractor_index(&self, id: BodyId) -> Option<usize> {
        self.attractors.iter().position(|a| a.id == id)
    }

    pub fn bodies(&self) -> &[SimulatedBody] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&SimulatedBody> {
        self.bodies.iter().find(|b| b.id == id)
    }

    fn body_index(&self, id: BodyId) -> Result<usize, SimError> {
        self.bodies
            .iter()
            .position(|b| b.id == id)
            .ok_or(SimError::UnknownBody(id))
    }

    // -----------------------------------------------------------------------
    // Attractors
    // -----------------------------------------------------------------------

    /// Replace the attractor list and re-bind every body against it.
    ///
    /// Nothing changes if any body fails to bind.
    pub fn set_attractors(&mut self, attractors: Vec<AttractorState>) -> Result<(), SimError> {
        let epoch = self.epoch + 1;
        let view = ListView {
            simulator: self.id,
            epoch,
            attractors: &attractors,
        };
        let rebound = self
            .bodies
            .iter()
            .map(|b| {
                b.provider
                    .clone_for(b.id, &view)
                    .map_err(|source| SimError::Provider { body: b.id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (body, provider) in self.bodies.iter_mut().zip(rebound) {
            body.provider = provider;
        }
        self.attractors = attractors;
        self.epoch = epoch;
        debug!(
            "{}: attractor list replaced ({} entries), epoch {}",
            self.id,
            self.attractors.len(),
            self.epoch
        );
        Ok(())
    }

    /// Refresh an attractor's position without reorganising the list.
    pub fn update_attractor(&mut self, id: BodyId, position: Vector3D) -> Result<(), SimError> {
        let a = self
            .attractors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SimError::UnknownAttractor(id))?;
        a.position = position;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bodies
    // -----------------------------------------------------------------------

    /// Add a body; its provider is bound here, so bad configuration fails now.
    pub fn add_body(
        &mut self,
        id: BodyId,
        position: Vector3D,
        velocity: Vector3D,
        provider: &AccelerationProvider,
    ) -> Result<(), SimError> {
        if self.body(id).is_some() {
            return Err(SimError::DuplicateBody(id));
        }
        let provider = provider
            .clone_for(id, &*self)
            .map_err(|source| SimError::Provider { body: id, source })?;
        debug!("{}: added {} body {}", self.id, provider.name(), id);

        // A body that is also an attractor owns its listed position.
        if let Some(listed) = self.attractors.iter_mut().find(|a| a.id == id) {
            listed.position = position;
        }
        self.bodies.push(SimulatedBody {
            id,
            position,
            velocity,
            rotation: QuaternionD::identity(),
            provider,
        });
        Ok(())
    }

    pub fn remove_body(&mut self, id: BodyId) -> Result<SimulatedBody, SimError> {
        let index = self.body_index(id)?;
        Ok(self.bodies.remove(index))
    }

    pub fn set_rotation(&mut self, id: BodyId, rotation: QuaternionD) -> Result<(), SimError> {
        let index = self.body_index(id)?;
        self.bodies[index].rotation = rotation;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Fresh context for the body at `index` in [`Self::bodies`].
    pub fn context_for(&self, index: usize) -> Option<TrajectoryContext<'_>> {
        let body = self.bodies.get(index)?;
        Some(TrajectoryContext {
            ut: self.ut,
            body: body.id,
            position: body.position,
            self_attractor_index: self.attractor_index(body.id),
            simulator: self.id,
            epoch: self.epoch,
            gravitational_constant: self.gravitational_constant,
            attractors: &self.attractors,
        })
    }

    pub fn acceleration_of(&self, id: BodyId) -> Result<Vector3D, SimError> {
        let index = self.body_index(id)?;
        self.acceleration_at(index)
    }

    fn acceleration_at(&self, index: usize) -> Result<Vector3D, SimError> {
        let body = &self.bodies[index];
        let ctx = self.context_for(index).ok_or(SimError::UnknownBody(body.id))?;
        body.provider
            .get_acceleration(&ctx)
            .map_err(|source| SimError::Provider { body: body.id, source })
    }

    /// Accelerations for every body, in body order.
    pub fn accelerations(&self) -> Result<Vec<Vector3D>, SimError> {
        (0..self.bodies.len()).map(|i| self.acceleration_at(i)).collect()
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance absolute-position bookkeeping by `dt` (semi-implicit Euler).
    ///
    /// All accelerations are evaluated first; if any provider fails the state is
    /// left exactly as it was.
    pub fn step(&mut self, dt: f64) -> Result<(), SimError> {
        let accels = self.accelerations()?;

        for (body, a) in self.bodies.iter_mut().zip(&accels) {
            body.velocity += a * dt;
            body.position += body.velocity * dt;
        }
        self.ut += dt;

        // Bodies that are also attractors publish their new state.
        let published: Vec<(usize, Vector3D, f64)> = (0..self.bodies.len())
            .filter_map(|i| {
                let ctx = self.context_for(i)?;
                let slot = ctx.self_attractor_index()?;
                let mass = self.bodies[i].provider.get_mass(&ctx)?;
                Some((slot, self.bodies[i].position, mass))
            })
            .collect();
        for (slot, position, mass) in published {
            self.attractors[slot].position = position;
            self.attractors[slot].mass = mass;
        }
        Ok(())
    }

    /// Independent copy under a new identity, every provider re-bound to it.
    pub fn fork(&self) -> Result<TrajectorySimulator, SimError> {
        let mut fork = TrajectorySimulator {
            id: SimulatorId::next(),
            ut: self.ut,
            gravitational_constant: self.gravitational_constant,
            epoch: self.epoch,
            attractors: self.attractors.clone(),
            bodies: Vec::with_capacity(self.bodies.len()),
        };
        for body in &self.bodies {
            let provider = body
                .provider
                .clone_for(body.id, &fork)
                .map_err(|source| SimError::Provider { body: body.id, source })?;
            fork.bodies.push(SimulatedBody {
                provider,
                ..body.clone()
            });
        }
        debug!("{} forked from {}", fork.id, self.id);
        Ok(fork)
    }

    /// What-if preview: body positions after each of `steps` steps, run on a fork.
    pub fn predict(&self, steps: usize, dt: f64) -> Result<Vec<Vec<Vector3D>>, SimError> {
        let mut preview = self.fork()?;
        let mut samples = Vec::with_capacity(steps);
        for _ in 0..steps {
            preview.step(dt)?;
            samples.push(preview.bodies.iter().map(|b| b.position).collect());
        }
        Ok(samples)
    }
}

impl AttractorIndex for TrajectorySimulator {
    fn simulator_id(&self) -> SimulatorId {
        self.id
    }

    fn attractor_handle(&self, id: BodyId) -> Option<AttractorHandle> {
        let index = self.attractor_index(id)?;
        Some(AttractorHandle {
            simulator: self.id,
            index,
            epoch: self.epoch,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
