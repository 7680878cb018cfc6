pub mod simulator;
pub mod world;

pub use simulator::{SimulatedBody, TrajectorySimulator};
pub use world::{BodyView, SimClock, TickReport, World};
