pub mod attractor;
pub mod context;
pub mod gravity;
pub mod provider;

pub use attractor::{AttractorHandle, AttractorIndex, AttractorState, BodyId, SimulatorId};
pub use context::TrajectoryContext;
pub use provider::{AccelerationProvider, HierarchicalApprox, Maneuver, NBody, TwoBody};
