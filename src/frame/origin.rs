use log::debug;

use super::reference::ReferenceFrame;
use crate::config::{FloatingOriginConfig, RecenterMode};
use crate::math::{widen, QuaternionF, Vector3D, Vector3F};

// ---------------------------------------------------------------------------
// Frame switch notification
// ---------------------------------------------------------------------------

/// The frames on either side of a floating-origin switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSwitch {
    pub old: ReferenceFrame,
    pub new: ReferenceFrame,
}

impl FrameSwitch {
    /// Re-express a local position cached under `old` in `new`.
    pub fn rebase_position(&self, local: &Vector3F) -> Vector3F {
        self.new
            .transform_position(&self.old.inverse_transform_position(local))
    }

    pub fn rebase_rotation(&self, local: &QuaternionF) -> QuaternionF {
        self.new
            .transform_rotation(&self.old.inverse_transform_rotation(local))
    }

    /// Absolute distance the origin moved.
    pub fn delta(&self) -> Vector3D {
        self.new.origin() - self.old.origin()
    }
}

/// Anything holding local positions that must follow a frame switch.
///
/// Called synchronously from inside the switch, before the tick moves on to
/// physics. Every cached local position must be rewritten before returning.
pub trait FrameSwitchListener {
    fn on_frame_switch(&mut self, switch: &FrameSwitch);
}

// ---------------------------------------------------------------------------
// Floating origin manager
// ---------------------------------------------------------------------------

/// Owner of the active reference frame for one simulated scene.
#[derive(Debug, Clone)]
pub struct FloatingOrigin {
    config: FloatingOriginConfig,
    current: ReferenceFrame,
    switches: u64,
}

impl FloatingOrigin {
    pub fn new(config: FloatingOriginConfig) -> Self {
        Self::with_frame(config, ReferenceFrame::Identity)
    }

    pub fn with_frame(config: FloatingOriginConfig, frame: ReferenceFrame) -> Self {
        Self {
            config,
            current: frame,
            switches: 0,
        }
    }

    pub fn current_frame(&self) -> ReferenceFrame {
        self.current
    }

    /// Number of switches performed so far.
    pub fn switch_count(&self) -> u64 {
        self.switches
    }

    /// True when any axis of `anchor_local` lies outside the threshold cube.
    pub fn needs_recenter(&self, anchor_local: &Vector3F) -> bool {
        anchor_local.iter().any(|c| c.abs() > self.config.threshold)
    }

    /// Absolute shift to apply for an anchor at `anchor_local`.
    pub fn recenter_delta(&self, anchor_local: &Vector3F) -> Vector3D {
        let local = widen(anchor_local);
        match self.config.recenter {
            RecenterMode::Anchor => local,
            RecenterMode::Grid => {
                let cell = self.config.threshold as f64;
                local.map(|c| (c / cell).trunc() * cell)
            }
        }
    }

    /// Per-tick threshold check.
    ///
    /// With no anchor the check is skipped. Otherwise, when the anchor has left
    /// the threshold cube, the shifted frame is installed and every listener is
    /// notified, in slice order, before this returns.
    pub fn update(
        &mut self,
        anchor_local: Option<Vector3F>,
        listeners: &mut [&mut dyn FrameSwitchListener],
    ) -> Option<FrameSwitch> {
        let anchor = anchor_local?;
        if !self.needs_recenter(&anchor) {
            return None;
        }
        let delta = self.recenter_delta(&anchor);
        let new = self.current.shift(&delta);
        Some(self.switch_frame(new, listeners))
    }

    /// Install `new` as the current frame and notify listeners.
    pub fn switch_frame(
        &mut self,
        new: ReferenceFrame,
        listeners: &mut [&mut dyn FrameSwitchListener],
    ) -> FrameSwitch {
        let switch = FrameSwitch {
            old: self.current,
            new,
        };
        self.current = new;
        self.switches += 1;
        debug!(
            "floating origin switch #{}: origin moved by {:?} to {:?}",
            self.switches,
            switch.delta().as_slice(),
            new.origin().as_slice()
        );
        for listener in listeners.iter_mut() {
            listener.on_frame_switch(&switch);
        }
        switch
    }
}

impl Default for FloatingOrigin {
    fn default() -> Self {
        Self::new(FloatingOriginConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        seen: Vec<FrameSwitch>,
        order: Vec<u32>,
        tag: u32,
    }

    impl FrameSwitchListener for Recorder {
        fn on_frame_switch(&mut self, switch: &FrameSwitch) {
            self.seen.push(*switch);
            self.order.push(self.tag);
        }
    }

    fn recorder(tag: u32) -> Recorder {
        Recorder { seen: vec![], order: vec![], tag }
    }

    #[test]
    fn no_anchor_never_shifts() {
        let mut origin = FloatingOrigin::default();
        let mut r = recorder(0);
        for _ in 0..10 {
            assert!(origin.update(None, &mut [&mut r]).is_none());
        }
        assert_eq!(origin.switch_count(), 0);
        assert!(r.seen.is_empty());
    }

    #[test]
    fn inside_threshold_does_not_shift() {
        let mut origin = FloatingOrigin::default();
        let anchor = Vector3F::new(10_000.0, -9_999.0, 0.0);
        assert!(origin.update(Some(anchor), &mut []).is_none());
        assert_eq!(origin.current_frame(), ReferenceFrame::Identity);
    }

    #[test]
    fn grid_recenter_keeps_remainder() {
        let mut origin = FloatingOrigin::default();
        let anchor = Vector3F::new(10_001.0, 0.0, 0.0);
        let switch = origin.update(Some(anchor), &mut []).expect("should shift");
        assert_eq!(origin.switch_count(), 1);
        let rebased = switch.rebase_position(&anchor);
        assert!((rebased - Vector3F::new(1.0, 0.0, 0.0)).norm() < 1e-4, "got {:?}", rebased);
    }

    #[test]
    fn grid_recenter_negative_axes() {
        let origin = FloatingOrigin::default();
        let delta = origin.recenter_delta(&Vector3F::new(-25_000.0, 4_000.0, 31_000.0));
        assert_eq!(delta, Vector3D::new(-20_000.0, 0.0, 30_000.0));
    }

    #[test]
    fn anchor_recenter_moves_onto_anchor() {
        let config = FloatingOriginConfig {
            recenter: RecenterMode::Anchor,
            ..Default::default()
        };
        let mut origin = FloatingOrigin::new(config);
        let anchor = Vector3F::new(0.0, 12_345.0, -5.0);
        let switch = origin.update(Some(anchor), &mut []).unwrap();
        assert!(switch.rebase_position(&anchor).norm() < 1e-3);
    }

    #[test]
    fn listeners_notified_in_order_with_old_and_new() {
        let mut origin = FloatingOrigin::default();
        let mut a = recorder(1);
        let mut b = recorder(2);
        let anchor = Vector3F::new(0.0, 0.0, 20_500.0);
        let switch = origin.update(Some(anchor), &mut [&mut a, &mut b]).unwrap();
        assert_eq!(a.seen, vec![switch]);
        assert_eq!(b.seen, vec![switch]);
        assert_eq!(switch.old, ReferenceFrame::Identity);
        assert_eq!(switch.new, origin.current_frame());
        assert_eq!(switch.delta(), Vector3D::new(0.0, 0.0, 20_000.0));
    }

    #[test]
    fn consecutive_switches_accumulate_origin() {
        let mut origin = FloatingOrigin::default();
        origin.update(Some(Vector3F::new(15_000.0, 0.0, 0.0)), &mut []);
        origin.update(Some(Vector3F::new(0.0, -12_000.0, 0.0)), &mut []);
        assert_eq!(origin.switch_count(), 2);
        assert_eq!(origin.current_frame().origin(), Vector3D::new(10_000.0, -10_000.0, 0.0));
    }
}
