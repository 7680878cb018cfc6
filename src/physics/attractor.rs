use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::math::Vector3D;

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Stable identity of a simulated body or celestial attractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u32);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one simulator run. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulatorId(u64);

impl SimulatorId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SimulatorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SimulatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Attractor data and handles
// ---------------------------------------------------------------------------

/// A body contributing gravity: absolute position and mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractorState {
    pub id: BodyId,
    pub position: Vector3D, // m, absolute
    pub mass: f64,          // kg
}

impl AttractorState {
    pub fn new(id: BodyId, position: Vector3D, mass: f64) -> Self {
        Self { id, position, mass }
    }
}

/// Cached position of an attractor in one simulator's list.
///
/// `epoch` is the list generation the index was taken from. Any reorganisation
/// of the list bumps the epoch and invalidates every outstanding handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttractorHandle {
    pub simulator: SimulatorId,
    pub index: usize,
    pub epoch: u64,
}

/// Lookup from attractor identity to its index within one simulator run.
pub trait AttractorIndex {
    fn simulator_id(&self) -> SimulatorId;

    fn attractor_handle(&self, id: BodyId) -> Option<AttractorHandle>;
}
