use std::collections::VecDeque;

use super::origin::{FrameSwitch, FrameSwitchListener};
use super::reference::ReferenceFrame;
use crate::math::{QuaternionD, QuaternionF, Vector3D, Vector3F};

// ---------------------------------------------------------------------------
// Scene node: cached local pose of one entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub local_position: Vector3F,
    pub local_rotation: QuaternionF,
}

impl SceneNode {
    pub fn new(frame: &ReferenceFrame, absolute: &Vector3D, rotation: &QuaternionD) -> Self {
        Self {
            local_position: frame.transform_position(absolute),
            local_rotation: frame.transform_rotation(rotation),
        }
    }

    /// Re-derive the cached pose from absolute truth.
    pub fn sync(&mut self, frame: &ReferenceFrame, absolute: &Vector3D) {
        self.local_position = frame.transform_position(absolute);
    }
}

impl FrameSwitchListener for SceneNode {
    fn on_frame_switch(&mut self, switch: &FrameSwitch) {
        self.local_position = switch.rebase_position(&self.local_position);
        self.local_rotation = switch.rebase_rotation(&self.local_rotation);
    }
}

// ---------------------------------------------------------------------------
// Trail: bounded history of local positions
// ---------------------------------------------------------------------------

/// Path history drawn behind a body, stored in local coordinates.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    samples: VecDeque<Vector3F>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest once full. No-op at capacity 0.
    pub fn push(&mut self, local: Vector3F) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(local);
    }

    pub fn samples(&self) -> impl Iterator<Item = &Vector3F> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Vector3F> {
        self.samples.back()
    }
}

impl FrameSwitchListener for Trail {
    fn on_frame_switch(&mut self, switch: &FrameSwitch) {
        for sample in self.samples.iter_mut() {
            *sample = switch.rebase_position(sample);
        }
    }
}
