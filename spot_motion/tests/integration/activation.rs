//! Integration test: activation lifecycle.
//!
//! Start toggles, board discovery and the abort/status sideband traffic.

use super::common::{press_start, sample_config, Robot};
use spot_common::config::{ConfigLoader, SpotConfig};
use spot_common::event::ControlEvent;
use spot_common::hal::BoardIndex;
use spot_common::joint::JointId;
use spot_common::messages::{AbortCommand, Component, Health, StatusMessage};
use spot_motion::state::ActivationState;
use std::fs;
use tempfile::TempDir;

#[test]
fn startup_reports_both_boards() {
    let robot = Robot::new(&sample_config());
    let statuses: Vec<StatusMessage> = robot.status_rx.try_iter().collect();
    assert_eq!(
        statuses,
        vec![
            StatusMessage::ok(Component::MotionController1),
            StatusMessage::ok(Component::MotionController2),
        ]
    );
    assert!(!robot.rig.any_open());
    assert_eq!(robot.controller.state(), ActivationState::Deactivated);
}

#[test]
fn activation_writes_rest_to_every_leg() {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();

    assert_eq!(robot.controller.state(), ActivationState::Activated);
    assert_eq!(robot.controller.boards().board_count(), 2);
    for joint in JointId::LEGS {
        let rest = robot.controller.map().rest_angle(joint).unwrap();
        assert_eq!(robot.pulse(joint), robot.expected_pulse(joint, rest), "{joint}");
    }
    assert_eq!(robot.abort_rx.try_recv(), Ok(AbortCommand::ActivateServos));
}

#[test]
fn toggle_pairs_are_idempotent() {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();
    let first_count = robot.controller.boards().board_count();

    robot.send(ControlEvent {
        hat0y: -1.0,
        ..ControlEvent::NEUTRAL
    });
    assert_ne!(robot.controller.angles(), &robot.at_rest());

    robot.toggle();
    assert_eq!(robot.controller.state(), ActivationState::Deactivated);
    assert!(!robot.rig.any_open());

    robot.toggle();
    assert_eq!(robot.controller.state(), ActivationState::Activated);
    assert_eq!(robot.controller.angles(), &robot.at_rest());
    assert_eq!(robot.controller.boards().board_count(), first_count);

    let aborts: Vec<AbortCommand> = robot.abort_rx.try_iter().collect();
    assert_eq!(
        aborts,
        vec![
            AbortCommand::ActivateServos,
            AbortCommand::Abort,
            AbortCommand::ActivateServos,
        ]
    );
}

#[test]
fn start_is_edge_triggered() {
    let mut robot = Robot::new(&sample_config());
    for _ in 0..5 {
        robot.send(press_start());
        assert_eq!(robot.controller.state(), ActivationState::Activated);
    }
    robot.send(ControlEvent::NEUTRAL);
    assert_eq!(robot.controller.state(), ActivationState::Activated);
    robot.send(press_start());
    assert_eq!(robot.controller.state(), ActivationState::Deactivated);
}

#[test]
fn single_board_mode_when_second_board_is_absent() {
    let mut config = sample_config();
    config.motion_controller.boards.pca9685_2 = None;
    let mut robot = Robot::new(&config);

    let statuses: Vec<StatusMessage> = robot.status_rx.try_iter().collect();
    assert_eq!(
        statuses[1],
        StatusMessage::not_ok(Component::MotionController2)
    );

    robot.toggle();
    assert_eq!(robot.controller.state(), ActivationState::Activated);
    assert_eq!(robot.controller.boards().board_count(), 1);
    assert_eq!(robot.rig.open_count(BoardIndex::Two), 0);
}

#[test]
fn second_board_failure_degrades_and_reports() {
    let mut config = sample_config();
    config.motion_controller.arm_enabled = true;
    let mut robot = Robot::new(&config);
    robot.status_rx.try_iter().for_each(drop);

    robot.rig.fail_open(BoardIndex::Two, true);
    robot.toggle();

    assert_eq!(robot.controller.state(), ActivationState::Activated);
    assert_eq!(robot.controller.boards().board_count(), 1);
    let board_2: Vec<Health> = robot
        .status_rx
        .try_iter()
        .filter(|s| s.component == Component::MotionController2)
        .map(|s| s.health)
        .collect();
    assert_eq!(board_2, vec![Health::NotOk]);

    // Legs still move, the arm is silently unbound.
    assert!(robot.pulse(JointId::RearKneeLeft).is_some());
    assert_eq!(robot.pulse(JointId::ArmLift), None);
}

#[test]
fn first_board_failure_at_startup_is_fatal() {
    let rig = spot_hal::SimRig::new();
    rig.fail_open(BoardIndex::One, true);
    assert!(Robot::with_rig(&sample_config(), rig).is_err());
}

#[test]
fn config_file_on_disk_drives_the_robot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("spot.toml");
    fs::write(&path, include_str!("../../../config/spot.toml")).unwrap();

    let mut config = SpotConfig::load(&path).unwrap();
    config.validate().unwrap();
    config.motion_controller.settle_delay_ms = 0;

    let mut robot = Robot::new(&config);
    robot.toggle();
    assert_eq!(robot.controller.state(), ActivationState::Activated);
    assert_eq!(robot.rig.writes().len(), 12);
}
