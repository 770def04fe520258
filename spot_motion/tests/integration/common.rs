//! Shared fixtures: the sample configuration wired to a simulation rig.

use spot_common::config::{ConfigLoader, SpotConfig};
use spot_common::event::ControlEvent;
use spot_common::joint::JointId;
use spot_common::messages::{AbortCommand, StatusMessage};
use spot_hal::{SimRig, SimulationDriver};
use spot_motion::angles::JointAngles;
use spot_motion::{MotionController, MotionError, MotionTiming, ServoMap};
use std::sync::mpsc::{sync_channel, Receiver};

const SAMPLE: &str = include_str!("../../../config/spot.toml");

/// Sample config with the servo delays removed.
pub fn sample_config() -> SpotConfig {
    let mut config = SpotConfig::from_toml(SAMPLE).unwrap();
    config.motion_controller.settle_delay_ms = 0;
    config.motion_controller.phase_delay_ms = 0;
    config
}

pub struct Robot {
    pub controller: MotionController,
    pub rig: SimRig,
    pub abort_rx: Receiver<AbortCommand>,
    pub status_rx: Receiver<StatusMessage>,
}

impl Robot {
    pub fn new(config: &SpotConfig) -> Self {
        Self::with_rig(config, SimRig::new()).unwrap()
    }

    pub fn with_rig(config: &SpotConfig, rig: SimRig) -> Result<Self, MotionError> {
        let map = ServoMap::from_config(&config.motion_controller)?;
        let (abort_tx, abort_rx) = sync_channel(10);
        let (status_tx, status_rx) = sync_channel(10);
        let controller = MotionController::new(
            map,
            Box::new(SimulationDriver::with_rig(rig.clone())),
            MotionTiming::from_config(&config.motion_controller),
            abort_tx,
            status_tx,
        )?;
        Ok(Self {
            controller,
            rig,
            abort_rx,
            status_rx,
        })
    }

    /// Press and release start.
    pub fn toggle(&mut self) {
        self.send(press_start());
        self.send(ControlEvent::NEUTRAL);
    }

    pub fn send(&mut self, event: ControlEvent) {
        self.controller.handle_event(&event).unwrap();
    }

    pub fn at_rest(&self) -> JointAngles {
        JointAngles::at_rest(self.controller.map())
    }

    /// Pulse currently on a joint's channel.
    pub fn pulse(&self, joint: JointId) -> Option<u16> {
        let config = self.controller.map().get(joint)?;
        self.rig.last_pulse(config.board, config.channel)
    }

    /// Pulse the map computes for a joint at `angle`.
    pub fn expected_pulse(&self, joint: JointId, angle: f32) -> Option<u16> {
        self.controller.map().get(joint)?.pulse_for_angle(angle)
    }
}

pub fn press_start() -> ControlEvent {
    ControlEvent {
        start: true,
        ..ControlEvent::NEUTRAL
    }
}
