pub mod origin;
pub mod reference;
pub mod tracking;

pub use origin::{FloatingOrigin, FrameSwitch, FrameSwitchListener};
pub use reference::ReferenceFrame;
pub use tracking::{SceneNode, Trail};
