//! Integration test: termination signal and config failure handling.

use super::common::{press_start, sample_config, Robot};
use spot_common::event::ControlEvent;
use spot_common::messages::{AbortCommand, Component, MotionMessage, StatusMessage};
use spot_motion::lifecycle::{report_config_failure, shutdown_handler};
use spot_motion::state::ActivationState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;

#[test]
fn shutdown_handler_stops_input_and_queues_shutdown() {
    let (tx, rx) = sync_channel(1);
    let running = Arc::new(AtomicBool::new(true));

    let handler = shutdown_handler(tx, running.clone());
    handler();

    assert!(!running.load(Ordering::SeqCst));
    assert_eq!(rx.try_recv(), Ok(MotionMessage::Shutdown));
}

#[test]
fn signal_while_activated_powers_down() {
    let Robot {
        mut controller,
        rig,
        abort_rx,
        ..
    } = Robot::new(&sample_config());
    let (tx, rx) = sync_channel(1);
    let running = Arc::new(AtomicBool::new(true));
    let handler = shutdown_handler(tx.clone(), running.clone());

    let worker = thread::spawn(move || {
        let result = controller.run(&rx);
        (controller, result)
    });
    tx.send(press_start().into()).unwrap();
    tx.send(ControlEvent::NEUTRAL.into()).unwrap();

    // Blocks until the one-slot channel has room, as on the signal thread.
    handler();
    let (controller, result) = worker.join().unwrap();

    assert!(result.is_ok());
    assert!(!running.load(Ordering::SeqCst));
    assert_eq!(controller.state(), ActivationState::Deactivated);
    assert!(!rig.any_open());
    let aborts: Vec<AbortCommand> = abort_rx.try_iter().collect();
    assert_eq!(aborts, vec![AbortCommand::ActivateServos, AbortCommand::Abort]);
}

#[test]
fn config_failure_marks_both_motion_controllers() {
    let (status_tx, status_rx) = sync_channel(10);
    report_config_failure(&status_tx);

    let statuses: Vec<StatusMessage> = status_rx.try_iter().collect();
    assert_eq!(
        statuses,
        vec![
            StatusMessage::not_ok(Component::MotionController1),
            StatusMessage::not_ok(Component::MotionController2),
        ]
    );
}

#[test]
fn config_failure_report_never_blocks_on_a_full_queue() {
    let (status_tx, status_rx) = sync_channel(1);
    report_config_failure(&status_tx);
    assert_eq!(status_rx.try_iter().count(), 1);
}
