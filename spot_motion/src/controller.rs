//! Motion controller: the event loop that owns every servo.
//!
//! One `MotionController` owns the servo map, the board manager, the joint
//! angle store and the activation state. It is driven from a single thread
//! by [`MotionController::run`], which blocks on the motion channel with the
//! inactivity timeout as its only suspension point.
//!
//! ```text
//!  motion channel ──► run() ──► handle_event ──► postures ──► JointAngles
//!        (cap 1)         │                                        │
//!                        ├─► abort channel      BoardManager ◄────┘ push_all
//!                        └─► status channel          │
//!                                                    ▼
//!                                               PWM boards
//! ```

use crate::angles::JointAngles;
use crate::boards::BoardManager;
use crate::error::{MotionError, WriteReport};
use crate::postures::{self, Lean, TwoPhase};
use crate::servo_map::ServoMap;
use crate::state::{
    ActivationEvent, ActivationState, ActivationStateMachine, StartButton, TransitionResult,
};
use spot_common::config::MotionControllerConfig;
use spot_common::event::ControlEvent;
use spot_common::hal::{BoardIndex, HalError, PwmDriver};
use spot_common::joint::JointId;
use spot_common::messages::{AbortCommand, Component, MotionMessage, StatusMessage};
use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing of the controller loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTiming {
    /// Idle time before an activated robot powers down.
    pub inactivity_timeout: Duration,
    /// Time the servos get to reach rest before the boards close.
    pub settle_delay: Duration,
    /// Pause between the rear and front halves of a two-phase posture.
    pub phase_delay: Duration,
}

impl MotionTiming {
    pub fn from_config(config: &MotionControllerConfig) -> Self {
        Self {
            inactivity_timeout: config.inactivity_timeout(),
            settle_delay: config.settle_delay(),
            phase_delay: config.phase_delay(),
        }
    }
}

/// Owner of all servo state. See the module docs.
pub struct MotionController {
    map: ServoMap,
    boards: BoardManager,
    angles: JointAngles,
    activation: ActivationStateMachine,
    start: StartButton,
    timing: MotionTiming,
    abort_tx: SyncSender<AbortCommand>,
    status_tx: SyncSender<StatusMessage>,
}

impl MotionController {
    /// Build the controller and probe the boards.
    ///
    /// The probe opens and closes every configured board and reports
    /// `motion_controller_1` / `motion_controller_2` on the status channel.
    ///
    /// # Errors
    ///
    /// `MotionError::Hardware` if board 1 does not pass the probe.
    pub fn new(
        map: ServoMap,
        driver: Box<dyn PwmDriver>,
        timing: MotionTiming,
        abort_tx: SyncSender<AbortCommand>,
        status_tx: SyncSender<StatusMessage>,
    ) -> Result<Self, MotionError> {
        let mut boards = BoardManager::new(driver, &map);
        let probe = boards.probe();

        let controller = Self {
            angles: JointAngles::at_rest(&map),
            map,
            boards,
            activation: ActivationStateMachine::new(),
            start: StartButton::default(),
            timing,
            abort_tx,
            status_tx,
        };

        controller.report(StatusMessage::new(
            Component::MotionController1,
            probe.board_1.into(),
        ));
        controller.report(StatusMessage::new(
            Component::MotionController2,
            probe.board_2.into(),
        ));

        if !probe.board_1 {
            return Err(MotionError::Hardware {
                board: BoardIndex::One,
                source: HalError::OpenFailed {
                    board: BoardIndex::One,
                    reason: "start-up probe failed".to_string(),
                },
            });
        }

        info!(
            driver = controller.boards.driver_name(),
            joints = controller.map.joints().count(),
            second_board = probe.board_2,
            "Motion controller initialized"
        );
        Ok(controller)
    }

    /// Current activation state.
    pub fn state(&self) -> ActivationState {
        self.activation.state()
    }

    /// Current joint targets.
    pub fn angles(&self) -> &JointAngles {
        &self.angles
    }

    /// Board manager, for inspection.
    pub fn boards(&self) -> &BoardManager {
        &self.boards
    }

    pub fn map(&self) -> &ServoMap {
        &self.map
    }

    pub fn timing(&self) -> MotionTiming {
        self.timing
    }

    /// Process messages until shutdown.
    ///
    /// Every exit path, including errors, leaves the boards closed.
    ///
    /// # Errors
    ///
    /// `MotionError::Hardware` if board 1 fails on activation,
    /// `MotionError::Disconnected` if every sender is dropped.
    pub fn run(&mut self, rx: &Receiver<MotionMessage>) -> Result<(), MotionError> {
        info!(
            timeout_s = self.timing.inactivity_timeout.as_secs_f32(),
            "Motion controller running, press START to enable the servos"
        );
        loop {
            match rx.recv_timeout(self.timing.inactivity_timeout) {
                Ok(MotionMessage::Event(event)) => {
                    if let Err(e) = self.handle_event(&event) {
                        self.shutdown();
                        return Err(e);
                    }
                }
                Ok(MotionMessage::Shutdown) => {
                    info!("Shutdown requested");
                    self.shutdown();
                    return Ok(());
                }
                Err(RecvTimeoutError::Timeout) => self.handle_timeout(),
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Motion channel closed");
                    self.shutdown();
                    return Err(MotionError::Disconnected);
                }
            }
        }
    }

    /// Handle one control snapshot.
    ///
    /// A rising edge of `start` toggles activation. While deactivated every
    /// other field is ignored. While activated the fields are dispatched to
    /// the posture primitives and every joint target is pushed.
    ///
    /// # Errors
    ///
    /// `MotionError::Hardware` if board 1 cannot be opened on activation.
    pub fn handle_event(&mut self, event: &ControlEvent) -> Result<(), MotionError> {
        if self.start.pressed(event.start) {
            if self.activation.is_activated() {
                self.power_down();
                self.send_abort(AbortCommand::Abort);
                self.transition(ActivationEvent::StartPressed);
                return Ok(());
            }
            self.power_up()?;
        }

        if !self.activation.is_activated() {
            debug!("Press START to enable the servos");
            return Ok(());
        }

        self.dispatch(event).log();
        Ok(())
    }

    /// Idle watchdog branch: rest, settle and release the boards.
    pub fn handle_timeout(&mut self) {
        info!(
            timeout_s = self.timing.inactivity_timeout.as_secs_f32(),
            "No input, shutting down the servos, press START to reactivate"
        );
        if self.activation.is_activated() {
            self.power_down();
            self.transition(ActivationEvent::IdleTimeout);
        }
    }

    /// Release the hardware before the process exits.
    pub fn shutdown(&mut self) {
        if self.activation.is_activated() {
            self.power_down();
            self.send_abort(AbortCommand::Abort);
            self.transition(ActivationEvent::Shutdown);
        } else {
            self.boards.deactivate();
        }
    }

    fn power_up(&mut self) -> Result<(), MotionError> {
        self.send_abort(AbortCommand::ActivateServos);

        if let Err(e) = self.boards.activate() {
            self.report(StatusMessage::not_ok(Component::MotionController1));
            self.send_abort(AbortCommand::Abort);
            self.activation.force_deactivated();
            return Err(e);
        }
        self.report(StatusMessage::new(
            Component::MotionController1,
            self.boards.is_open(BoardIndex::One).into(),
        ));
        self.report(StatusMessage::new(
            Component::MotionController2,
            self.boards.is_open(BoardIndex::Two).into(),
        ));

        self.boards.bind_servos(&self.map);
        postures::rest_position(&mut self.angles, &self.map);
        self.transition(ActivationEvent::StartPressed);
        Ok(())
    }

    fn power_down(&mut self) {
        postures::rest_position(&mut self.angles, &self.map);
        self.boards.push_all(&self.angles).log();
        thread::sleep(self.timing.settle_delay);
        let errors = self.boards.deactivate();
        if !errors.is_empty() {
            warn!(failed = errors.len(), "Boards did not all close cleanly");
        }
    }

    fn dispatch(&mut self, event: &ControlEvent) -> WriteReport {
        let mut report = WriteReport::default();
        let map = &self.map;

        if event.a {
            postures::rest_position(&mut self.angles, map);
        }
        if event.hat0y != 0.0 {
            postures::body_up_down(&mut self.angles, map, event.hat0y);
        }
        if event.hat0x != 0.0 {
            postures::body_left_right(&mut self.angles, map, event.hat0x);
        }
        if event.ry != 0.0 {
            postures::body_up_down_analog(&mut self.angles, map, event.ry);
        }
        if event.rx != 0.0 {
            postures::body_left_right_analog(&mut self.angles, map, event.rx);
        }
        if event.y {
            if let Some(posture) = postures::standing_posture(&self.map) {
                report.merge(self.apply_two_phase(posture));
            }
        }
        if event.b {
            if let Some(posture) = postures::lean(&self.map, Lean::Right) {
                report.merge(self.apply_two_phase(posture));
            }
        }
        if event.x {
            if let Some(posture) = postures::lean(&self.map, Lean::Left) {
                report.merge(self.apply_two_phase(posture));
            }
        }

        let map = &self.map;
        if event.tl {
            postures::arm_rotation(&mut self.angles, map, event.lx);
            postures::arm_lift(&mut self.angles, map, event.ly);
        }
        if event.tr {
            postures::arm_reach(&mut self.angles, map, event.ly);
            postures::arm_cam_tilt(&mut self.angles, map, event.ry);
        }

        // Every cycle, so hardware converges after a missed write.
        report.merge(self.boards.push_all(&self.angles));
        report
    }

    fn apply_two_phase(&mut self, posture: TwoPhase) -> WriteReport {
        let mut report = self.set_and_push(&posture.rear);
        thread::sleep(self.timing.phase_delay);
        report.merge(self.set_and_push(&posture.front));
        report
    }

    fn set_and_push(&mut self, targets: &[(JointId, f32)]) -> WriteReport {
        let joints: Vec<JointId> = targets.iter().map(|&(joint, _)| joint).collect();
        for &(joint, angle) in targets {
            self.angles.set(joint, angle);
        }
        self.boards.push(&joints, &self.angles)
    }

    fn transition(&mut self, event: ActivationEvent) {
        match self.activation.handle_event(event) {
            TransitionResult::Ok(state) => info!(?event, ?state, "Activation changed"),
            TransitionResult::Rejected(reason) => debug!(?event, reason, "Transition rejected"),
        }
    }

    fn send_abort(&self, command: AbortCommand) {
        notify(&self.abort_tx, command);
    }

    fn report(&self, status: StatusMessage) {
        notify(&self.status_tx, status);
    }
}

/// Non-blocking sideband send. The motion loop never waits on a slow
/// consumer.
fn notify<T: fmt::Display>(tx: &SyncSender<T>, message: T) {
    match tx.try_send(message) {
        Ok(()) => {}
        Err(TrySendError::Full(message)) => warn!(%message, "Sideband channel full, dropped"),
        Err(TrySendError::Disconnected(message)) => {
            debug!(%message, "Sideband receiver gone, dropped")
        }
    }
}
