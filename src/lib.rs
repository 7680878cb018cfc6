pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod orbital;
pub mod physics;
pub mod scenario;
pub mod sim;

// Flat re-exports of the types most callers touch
pub mod prelude {
    pub use crate::config::{FloatingOriginConfig, RecenterMode, SimConfig, WorldConfig};
    pub use crate::error::{ConfigError, ProviderError, ScenarioError, SimError};
    pub use crate::frame::{FloatingOrigin, FrameSwitch, FrameSwitchListener, ReferenceFrame};
    pub use crate::math::{PrecisionExt, QuaternionD, QuaternionF, Vector3D, Vector3F};
    pub use crate::physics::{AccelerationProvider, AttractorState, BodyId, TrajectoryContext};
    pub use crate::scenario::Scenario;
    pub use crate::sim::{SimClock, TrajectorySimulator, World};
}
