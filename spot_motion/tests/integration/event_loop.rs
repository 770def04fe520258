//! Integration test: the blocking event loop.
//!
//! Runs `MotionController::run` on a worker thread and drives it through
//! the one-slot motion channel, as the process does.

use super::common::{press_start, sample_config, Robot};
use spot_common::config::SpotConfig;
use spot_common::event::ControlEvent;
use spot_common::messages::{AbortCommand, MotionMessage};
use spot_hal::SimRig;
use spot_motion::state::ActivationState;
use spot_motion::{MotionController, MotionError};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type Worker = JoinHandle<(MotionController, Result<(), MotionError>)>;

fn spawn(config: &SpotConfig) -> (SyncSender<MotionMessage>, Worker, SimRig, Receiver<AbortCommand>) {
    let Robot {
        mut controller,
        rig,
        abort_rx,
        ..
    } = Robot::new(config);
    let (tx, rx) = sync_channel(1);
    let worker = thread::spawn(move || {
        let result = controller.run(&rx);
        (controller, result)
    });
    (tx, worker, rig, abort_rx)
}

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn shutdown_message_releases_the_boards() {
    let (tx, worker, rig, abort_rx) = spawn(&sample_config());
    tx.send(press_start().into()).unwrap();
    tx.send(ControlEvent::NEUTRAL.into()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || rig.any_open()));

    tx.send(MotionMessage::Shutdown).unwrap();
    let (controller, result) = worker.join().unwrap();

    assert!(result.is_ok());
    assert_eq!(controller.state(), ActivationState::Deactivated);
    assert!(!rig.any_open());
    let aborts: Vec<AbortCommand> = abort_rx.try_iter().collect();
    assert_eq!(aborts, vec![AbortCommand::ActivateServos, AbortCommand::Abort]);
}

#[test]
fn idle_timeout_deactivates() {
    let mut config = sample_config();
    config.motion_controller.inactivity_timeout_ms = 100;
    let (tx, worker, rig, abort_rx) = spawn(&config);

    tx.send(press_start().into()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || rig.any_open()));

    // No more input: the watchdog powers down on its own.
    assert!(wait_until(Duration::from_secs(2), || !rig.any_open()));

    tx.send(MotionMessage::Shutdown).unwrap();
    let (controller, result) = worker.join().unwrap();
    assert!(result.is_ok());
    assert_eq!(controller.state(), ActivationState::Deactivated);

    // The watchdog leaves the enable line alone; only a start press aborts.
    let aborts: Vec<AbortCommand> = abort_rx.try_iter().collect();
    assert_eq!(aborts, vec![AbortCommand::ActivateServos]);

    // Last writes before closing were the rest pulses.
    let rest_writes = rig.writes().len();
    assert!(rest_writes >= 24, "activation and power-down both push rest");
}

#[test]
fn restart_after_idle_timeout() {
    let mut config = sample_config();
    config.motion_controller.inactivity_timeout_ms = 100;
    let (tx, worker, rig, _abort_rx) = spawn(&config);

    tx.send(press_start().into()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || rig.any_open()));
    assert!(wait_until(Duration::from_secs(2), || !rig.any_open()));

    tx.send(ControlEvent::NEUTRAL.into()).unwrap();
    tx.send(press_start().into()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || rig.any_open()));

    tx.send(MotionMessage::Shutdown).unwrap();
    let (_controller, result) = worker.join().unwrap();
    assert!(result.is_ok());
    assert!(!rig.any_open());
}

#[test]
fn dropped_senders_end_the_loop_with_boards_closed() {
    let (tx, worker, rig, _abort_rx) = spawn(&sample_config());
    tx.send(press_start().into()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || rig.any_open()));
    drop(tx);

    let (controller, result) = worker.join().unwrap();
    assert!(matches!(result, Err(MotionError::Disconnected)));
    assert_eq!(controller.state(), ActivationState::Deactivated);
    assert!(!rig.any_open());
}
