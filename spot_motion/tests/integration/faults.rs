//! Integration test: faults that must not end a session.

use super::common::{sample_config, Robot};
use spot_common::config::ConfigError;
use spot_common::event::ControlEvent;
use spot_common::hal::BoardIndex;
use spot_common::joint::JointId;
use spot_motion::state::ActivationState;
use spot_motion::ServoMap;

#[test]
fn one_rejected_channel_does_not_stop_the_others() {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();
    robot.rig.clear_writes();

    let knee = *robot.controller.map().get(JointId::RearKneeRight).unwrap();
    robot.rig.reject_channel(knee.board, knee.channel);
    robot.send(ControlEvent {
        a: true,
        ..ControlEvent::NEUTRAL
    });

    let writes = robot.rig.writes();
    assert_eq!(writes.len(), 11);
    assert!(!writes.iter().any(|w| w.channel == knee.channel));
    assert_eq!(robot.controller.state(), ActivationState::Activated);

    // The next cycle converges once the channel accepts again.
    robot.rig.accept_all_channels();
    robot.send(ControlEvent::NEUTRAL);
    assert_eq!(
        robot.pulse(JointId::RearKneeRight),
        robot.expected_pulse(JointId::RearKneeRight, knee.rest_angle_deg)
    );
}

#[test]
fn repeated_moves_saturate_instead_of_failing() {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();
    let crouch = ControlEvent {
        hat0y: -1.0,
        ..ControlEvent::NEUTRAL
    };
    for _ in 0..40 {
        robot.send(crouch);
    }

    for (joint, angle) in robot.controller.angles().iter() {
        assert!((0.0..=180.0).contains(&angle), "{joint}: {angle}");
    }
    // Left ankles climb 15° per step, mirrored right ankles fall.
    assert_eq!(robot.controller.angles().get(JointId::RearAnkleLeft), Some(180.0));
    assert_eq!(robot.controller.angles().get(JointId::RearAnkleRight), Some(0.0));
}

#[test]
fn close_failure_still_closes_the_other_board() {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();
    robot.rig.fail_close(BoardIndex::One, true);
    robot.toggle();

    assert_eq!(robot.controller.state(), ActivationState::Deactivated);
    assert_eq!(robot.rig.close_attempts(BoardIndex::Two), 2);
    assert!(!robot.rig.is_open(BoardIndex::Two));
    assert!(!robot.controller.boards().is_active());
}

#[test]
fn missing_joint_is_a_config_error() {
    let mut config = sample_config();
    config.motion_controller.servos.remove("front_knee_left");
    assert!(matches!(
        ServoMap::from_config(&config.motion_controller),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn zero_boards_is_a_config_error() {
    let mut config = sample_config();
    config.motion_controller.boards.pca9685_1 = None;
    config.motion_controller.boards.pca9685_2 = None;
    assert!(ServoMap::from_config(&config.motion_controller).is_err());
}
