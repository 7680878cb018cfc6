use log::{debug, warn};

use super::simulator::TrajectorySimulator;
use crate::config::WorldConfig;
use crate::error::SimError;
use crate::frame::{
    FloatingOrigin, FrameSwitch, FrameSwitchListener, ReferenceFrame, SceneNode, Trail,
};
use crate::math::{QuaternionD, Vector3D, Vector3F};
use crate::physics::{AccelerationProvider, AttractorState, BodyId};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time handed in by the external fixed-step scheduler for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub ut: f64, // s
    pub dt: f64, // s
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self { ut: 0.0, dt }
    }

    pub fn advance(&mut self) {
        self.ut += self.dt;
    }
}

// ---------------------------------------------------------------------------
// Per-body local view
// ---------------------------------------------------------------------------

/// Everything cached in local coordinates for one body.
#[derive(Debug, Clone)]
pub struct BodyView {
    pub id: BodyId,
    pub node: SceneNode,
    pub trail: Trail,
}

impl FrameSwitchListener for BodyView {
    fn on_frame_switch(&mut self, switch: &FrameSwitch) {
        self.node.on_frame_switch(switch);
        self.trail.on_frame_switch(switch);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub ut: f64,
    pub switch: Option<FrameSwitch>,
}

// ---------------------------------------------------------------------------
// World: simulation root
// ---------------------------------------------------------------------------

/// Root of one simulated scene.
///
/// Owns the floating origin and the trajectory simulator and is passed
/// explicitly to whatever needs coordinate transforms. [`World::tick`] fixes the
/// per-tick order: threshold check and synchronous notification, then physics,
/// then re-derivation of cached local state.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    origin: FloatingOrigin,
    simulator: TrajectorySimulator,
    views: Vec<BodyView>,
    anchor: Option<BodyId>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            origin: FloatingOrigin::new(config.origin.clone()),
            simulator: TrajectorySimulator::new(config.sim.gravitational_constant),
            views: Vec::new(),
            anchor: None,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn origin(&self) -> &FloatingOrigin {
        &self.origin
    }

    pub fn frame(&self) -> ReferenceFrame {
        self.origin.current_frame()
    }

    pub fn simulator(&self) -> &TrajectorySimulator {
        &self.simulator
    }

    pub fn views(&self) -> &[BodyView] {
        &self.views
    }

    pub fn view(&self, id: BodyId) -> Option<&BodyView> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn local_position(&self, id: BodyId) -> Option<Vector3F> {
        self.view(id).map(|v| v.node.local_position)
    }

    pub fn anchor(&self) -> Option<BodyId> {
        self.anchor
    }

    /// Choose the body the floating origin follows. `None` disables re-centering.
    pub fn set_anchor(&mut self, anchor: Option<BodyId>) -> Result<(), SimError> {
        if let Some(id) = anchor {
            if self.view(id).is_none() {
                return Err(SimError::UnknownBody(id));
            }
        }
        self.anchor = anchor;
        Ok(())
    }

    pub fn set_attractors(&mut self, attractors: Vec<AttractorState>) -> Result<(), SimError> {
        self.simulator.set_attractors(attractors)
    }

    pub fn update_attractor(&mut self, id: BodyId, position: Vector3D) -> Result<(), SimError> {
        self.simulator.update_attractor(id, position)
    }

    pub fn add_body(
        &mut self,
        id: BodyId,
        position: Vector3D,
        velocity: Vector3D,
        provider: &AccelerationProvider,
    ) -> Result<(), SimError> {
        self.simulator.add_body(id, position, velocity, provider)?;
        let frame = self.origin.current_frame();
        let rotation = self
            .simulator
            .body(id)
            .map(|b| b.rotation)
            .unwrap_or_else(QuaternionD::identity);
        let node = SceneNode::new(&frame, &position, &rotation);
        let mut trail = Trail::new(self.config.trail_length);
        trail.push(node.local_position);
        self.views.push(BodyView { id, node, trail });
        Ok(())
    }

    pub fn remove_body(&mut self, id: BodyId) -> Result<(), SimError> {
        self.simulator.remove_body(id)?;
        self.views.retain(|v| v.id != id);
        if self.anchor == Some(id) {
            self.anchor = None;
        }
        Ok(())
    }

    /// Centre the frame exactly on the anchor's absolute position.
    ///
    /// Used when a scene starts far from zero, before the first tick.
    /// `listeners` are notified after the world's own views, as in [`World::tick`].
    pub fn recenter(
        &mut self,
        listeners: &mut [&mut dyn FrameSwitchListener],
    ) -> Option<FrameSwitch> {
        let id = self.anchor?;
        let absolute = self.simulator.body(id)?.position;
        let switch = {
            let mut all = Self::subscribers(&mut self.views, listeners);
            self.origin.switch_frame(ReferenceFrame::offset(absolute), &mut all)
        };

        // Rebased poses carry the old frame's rounding; absolute truth is at hand.
        for view in self.views.iter_mut() {
            if let Some(body) = self.simulator.body(view.id) {
                view.node.sync(&switch.new, &body.position);
            }
        }
        Some(switch)
    }

    /// The world's views followed by external listeners, in notification order.
    fn subscribers<'a>(
        views: &'a mut [BodyView],
        listeners: &'a mut [&mut dyn FrameSwitchListener],
    ) -> Vec<&'a mut dyn FrameSwitchListener> {
        let mut all: Vec<&'a mut dyn FrameSwitchListener> = views
            .iter_mut()
            .map(|v| v as &mut dyn FrameSwitchListener)
            .collect();
        for l in listeners.iter_mut() {
            all.push(&mut **l);
        }
        all
    }

    /// Run one fixed step.
    ///
    /// `listeners` are notified of a frame switch after the world's own views,
    /// in slice order, and before any position is read for physics.
    pub fn tick(
        &mut self,
        clock: &SimClock,
        listeners: &mut [&mut dyn FrameSwitchListener],
    ) -> Result<TickReport, SimError> {
        let anchor_local = self.anchor.and_then(|id| self.local_position(id));

        let switch = {
            let mut all = Self::subscribers(&mut self.views, listeners);
            self.origin.update(anchor_local, &mut all)
        };
        if let Some(s) = &switch {
            debug!(
                "ut {:.3}: re-centred by {:?}, {} views rebased",
                clock.ut,
                s.delta().as_slice(),
                self.views.len() + listeners.len()
            );
        }

        self.simulator.set_ut(clock.ut);
        if let Err(e) = self.simulator.step(clock.dt) {
            warn!("ut {:.3}: tick aborted: {}", clock.ut, e);
            return Err(e);
        }

        let frame = self.origin.current_frame();
        for view in self.views.iter_mut() {
            if let Some(body) = self.simulator.body(view.id) {
                view.node.sync(&frame, &body.position);
                view.node.local_rotation = frame.transform_rotation(&body.rotation);
                view.trail.push(view.node.local_position);
            }
        }

        Ok(TickReport {
            ut: self.simulator.ut(),
            switch,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::physics::{Maneuver, TwoBody};

    const SHIP: BodyId = BodyId(10);

    /// Free-flying anchor ship (no parent, so no acceleration).
    fn moving_world(position: Vector3D, velocity: Vector3D) -> World {
        let mut world = World::new(WorldConfig {
            trail_length: 8,
            ..Default::default()
        });
        let free = AccelerationProvider::TwoBody(TwoBody::default());
        world.add_body(SHIP, position, velocity, &free).unwrap();
        world.set_anchor(Some(SHIP)).unwrap();
        world
    }

    fn drifting_world(position: Vector3D) -> World {
        moving_world(position, Vector3D::zeros())
    }

    #[test]
    fn anchor_past_threshold_shifts_once() {
        let mut world = drifting_world(Vector3D::new(10_001.0, 0.0, 0.0));
        let mut clock = SimClock::new(0.02);
        let report = world.tick(&clock, &mut []).unwrap();
        assert!(report.switch.is_some());
        assert_eq!(world.origin().switch_count(), 1);
        let local = world.local_position(SHIP).unwrap();
        assert!((local - Vector3F::new(1.0, 0.0, 0.0)).norm() < 1e-4, "got {:?}", local);

        clock.advance();
        let report = world.tick(&clock, &mut []).unwrap();
        assert!(report.switch.is_none());
        assert_eq!(world.origin().switch_count(), 1);
    }

    #[test]
    fn recenter_puts_anchor_at_zero() {
        let far = Vector3D::new(1.496e11, -3.0e9, 42.0);
        let mut world = drifting_world(far);
        let switch = world.recenter(&mut []).expect("anchor is set");
        assert_eq!(switch.new.origin(), far);
        assert_eq!(world.local_position(SHIP), Some(Vector3F::zeros()));
        world.set_anchor(None).unwrap();
        assert!(world.recenter(&mut []).is_none());
    }

    #[test]
    fn without_anchor_nothing_shifts() {
        let mut world = drifting_world(Vector3D::new(50_000.0, 0.0, 0.0));
        world.set_anchor(None).unwrap();
        let report = world.tick(&SimClock::new(0.02), &mut []).unwrap();
        assert!(report.switch.is_none());
        assert_eq!(world.frame(), ReferenceFrame::Identity);
    }

    #[test]
    fn removing_the_anchor_stops_recentering() {
        let mut world = drifting_world(Vector3D::new(50_000.0, 0.0, 0.0));
        world.remove_body(SHIP).unwrap();
        assert_eq!(world.anchor(), None);
        assert!(world.views().is_empty());
        assert!(world.tick(&SimClock::new(0.02), &mut []).unwrap().switch.is_none());
    }

    #[test]
    fn unknown_anchor_rejected() {
        let mut world = drifting_world(Vector3D::zeros());
        assert_eq!(world.set_anchor(Some(BodyId(99))), Err(SimError::UnknownBody(BodyId(99))));
    }

    #[test]
    fn trails_follow_the_switch() {
        let mut world = drifting_world(Vector3D::new(10_500.0, 0.0, 0.0));
        world.tick(&SimClock::new(0.02), &mut []).unwrap();
        let samples: Vec<Vector3F> = world.view(SHIP).unwrap().trail.samples().copied().collect();
        assert_eq!(samples.len(), 2);
        let last = world.view(SHIP).unwrap().trail.last().copied();
        assert_eq!(last, world.local_position(SHIP));
        for s in samples {
            assert!((s - Vector3F::new(500.0, 0.0, 0.0)).norm() < 1e-3, "stale sample {:?}", s);
        }
    }

    struct External {
        local: Vector3F,
        calls: usize,
    }

    impl FrameSwitchListener for External {
        fn on_frame_switch(&mut self, switch: &FrameSwitch) {
            self.local = switch.rebase_position(&self.local);
            self.calls += 1;
        }
    }

    #[test]
    fn external_listeners_rebased_before_tick_returns() {
        let mut world = drifting_world(Vector3D::new(0.0, 0.0, -30_000.0));
        let mut ext = External {
            local: Vector3F::new(0.0, 0.0, -29_000.0),
            calls: 0,
        };
        world.tick(&SimClock::new(0.02), &mut [&mut ext]).unwrap();
        assert_eq!(ext.calls, 1);
        assert!((ext.local - Vector3F::new(0.0, 0.0, 1_000.0)).norm() < 1e-3);
    }

    #[test]
    fn recenter_rebases_external_listeners() {
        let mut world = drifting_world(Vector3D::new(5_000.0, 0.0, 0.0));
        world.tick(&SimClock::new(0.02), &mut []).unwrap();
        assert_eq!(world.origin().switch_count(), 0);

        let mut ext = External {
            local: world.local_position(SHIP).unwrap(),
            calls: 0,
        };
        let switch = world.recenter(&mut [&mut ext]).expect("anchor is set");
        assert_eq!(switch.delta(), Vector3D::new(5_000.0, 0.0, 0.0));
        assert_eq!(ext.calls, 1);
        let node = world.local_position(SHIP).unwrap();
        assert!((ext.local - node).norm() < 1e-3, "external {:?} vs node {:?}", ext.local, node);
    }

    #[test]
    fn switch_is_decided_and_delivered_before_the_step() {
        // 20 m per tick: inside the cube before the first step, outside after it.
        let mut world =
            moving_world(Vector3D::new(9_990.0, 0.0, 0.0), Vector3D::new(1_000.0, 0.0, 0.0));
        let mut clock = SimClock::new(0.02);
        let mut ext = External {
            local: world.local_position(SHIP).unwrap(),
            calls: 0,
        };

        let report = world.tick(&clock, &mut [&mut ext]).unwrap();
        assert!(report.switch.is_none(), "threshold must be judged on the pre-step pose");
        assert_eq!(ext.calls, 0);
        assert!((world.simulator().body(SHIP).unwrap().position.x - 10_010.0).abs() < 1e-9);

        ext.local = world.local_position(SHIP).unwrap();
        clock.advance();
        world.tick(&clock, &mut [&mut ext]).unwrap();
        assert_eq!(ext.calls, 1);
        // The listener saw the pre-step pose (10 010 -> 10); the world has stepped on to 10 030.
        assert!((ext.local - Vector3F::new(10.0, 0.0, 0.0)).norm() < 1e-3, "got {:?}", ext.local);
        let node = world.local_position(SHIP).unwrap();
        assert!((node - Vector3F::new(30.0, 0.0, 0.0)).norm() < 1e-3, "got {:?}", node);
        assert!((world.simulator().ut() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn provider_failure_aborts_tick() {
        let mut world = drifting_world(Vector3D::zeros());
        let burn = AccelerationProvider::Maneuver(Maneuver {
            delta_v: Vector3D::new(1.0, 0.0, 0.0),
            start_ut: 0.0,
            duration: 1.0,
        });
        world.add_body(BodyId(11), Vector3D::zeros(), Vector3D::zeros(), &burn).unwrap();
        let err = world.tick(&SimClock::new(0.02), &mut []).unwrap_err();
        assert!(matches!(err, SimError::Provider { source: ProviderError::Unsupported(_), .. }));
    }

    #[test]
    fn local_positions_track_absolute_truth() {
        let mut world =
            moving_world(Vector3D::new(9_990.0, 0.0, 0.0), Vector3D::new(1_000.0, 0.0, 0.0));
        let mut clock = SimClock::new(0.02);
        for _ in 0..50 {
            world.tick(&clock, &mut []).unwrap();
            clock.advance();
            let absolute = world.simulator().body(SHIP).unwrap().position;
            let expected = world.frame().transform_position(&absolute);
            assert_eq!(world.local_position(SHIP).unwrap(), expected);
        }
        assert_eq!(world.origin().switch_count(), 1);
    }
}
