//! Integration test: posture primitives through the controller.
//!
//! Checks the angles stored and the pulses that reach the rig for the
//! rest, up/down, left/right and standing moves.

use super::common::{sample_config, Robot};
use spot_common::event::ControlEvent;
use spot_common::joint::{End, JointId, JointKind};
use spot_motion::angles::JointAngles;
use spot_motion::postures;

fn activated() -> Robot {
    let mut robot = Robot::new(&sample_config());
    robot.toggle();
    robot.rig.clear_writes();
    robot
}

fn shoulders(end: End) -> impl Iterator<Item = JointId> {
    JointId::LEGS
        .into_iter()
        .filter(move |j| j.kind() == JointKind::Shoulder && j.end() == Some(end))
}

#[test]
fn rest_is_idempotent_on_the_wire() {
    let mut robot = activated();
    let rest = ControlEvent {
        a: true,
        ..ControlEvent::NEUTRAL
    };

    robot.send(rest);
    let first = robot.rig.writes();
    robot.rig.clear_writes();
    robot.send(rest);
    let second = robot.rig.writes();

    assert_eq!(first.len(), 12);
    assert_eq!(first, second);
    for joint in JointId::LEGS {
        let rest = robot.controller.map().rest_angle(joint).unwrap();
        assert_eq!(robot.pulse(joint), robot.expected_pulse(joint, rest));
    }
}

#[test]
fn neutral_events_still_push_every_joint() {
    let mut robot = activated();
    robot.send(ControlEvent::NEUTRAL);
    robot.send(ControlEvent::NEUTRAL);
    assert_eq!(robot.rig.writes().len(), 24);
}

#[test]
fn body_up_down_zero_equals_rest() {
    let robot = activated();
    let map = robot.controller.map();
    let mut angles = JointAngles::at_rest(map);
    postures::body_up_down(&mut angles, map, -1.0);
    postures::body_up_down(&mut angles, map, -1.0);
    assert_ne!(angles, JointAngles::at_rest(map));

    postures::body_up_down(&mut angles, map, 0.0);
    assert_eq!(angles, JointAngles::at_rest(map));
}

#[test]
fn crouch_step_moves_knees_and_ankles() {
    let mut robot = activated();
    robot.send(ControlEvent {
        hat0y: -1.0,
        ..ControlEvent::NEUTRAL
    });

    let angles = robot.controller.angles();
    let rest = robot.at_rest();
    // Left side: knee -10, ankle +15. Right side mirrored.
    assert_eq!(
        angles.get(JointId::RearKneeLeft),
        rest.get(JointId::RearKneeLeft).map(|a| a - 10.0)
    );
    assert_eq!(
        angles.get(JointId::FrontKneeRight),
        rest.get(JointId::FrontKneeRight).map(|a| a + 10.0)
    );
    assert_eq!(
        angles.get(JointId::FrontAnkleLeft),
        rest.get(JointId::FrontAnkleLeft).map(|a| a + 15.0)
    );
    assert_eq!(
        angles.get(JointId::RearShoulderLeft),
        rest.get(JointId::RearShoulderLeft)
    );
}

#[test]
fn left_right_analog_hits_the_swing_limits() {
    let mut robot = activated();

    robot.send(ControlEvent {
        rx: -1.0,
        ..ControlEvent::NEUTRAL
    });
    for joint in shoulders(End::Rear) {
        assert_eq!(robot.controller.angles().get(joint), Some(30.0), "{joint}");
        assert_eq!(robot.pulse(joint), robot.expected_pulse(joint, 30.0));
    }
    for joint in shoulders(End::Front) {
        assert_eq!(robot.controller.angles().get(joint), Some(150.0), "{joint}");
    }

    robot.send(ControlEvent {
        rx: 1.0,
        ..ControlEvent::NEUTRAL
    });
    for joint in shoulders(End::Rear) {
        assert_eq!(robot.controller.angles().get(joint), Some(150.0), "{joint}");
    }
    for joint in shoulders(End::Front) {
        assert_eq!(robot.controller.angles().get(joint), Some(30.0), "{joint}");
    }
}

#[test]
fn standing_is_absolute() {
    let mut robot = activated();
    let stand = ControlEvent {
        y: true,
        ..ControlEvent::NEUTRAL
    };

    robot.send(stand);
    let once = robot.controller.angles().clone();
    robot.send(stand);
    assert_eq!(robot.controller.angles(), &once);

    // rear_knee_left rests at 81 in the sample: 81 - 50.
    assert_eq!(once.get(JointId::RearKneeLeft), Some(31.0));
    // rear_ankle_right rests at 160 in the sample: 160 - 70.
    assert_eq!(once.get(JointId::RearAnkleRight), Some(90.0));
}

#[test]
fn standing_discards_crouch_and_sway() {
    let stand = ControlEvent {
        y: true,
        ..ControlEvent::NEUTRAL
    };
    let mut fresh = activated();
    fresh.send(stand);

    let mut moved = activated();
    moved.send(ControlEvent {
        hat0y: -1.0,
        ..ControlEvent::NEUTRAL
    });
    moved.send(ControlEvent {
        rx: 1.0,
        ..ControlEvent::NEUTRAL
    });
    assert_ne!(moved.controller.angles(), fresh.controller.angles());
    moved.send(stand);

    assert_eq!(moved.controller.angles(), fresh.controller.angles());
}

#[test]
fn leans_turn_the_shoulders_opposite_ways() {
    let mut robot = activated();
    let stand = ControlEvent {
        y: true,
        ..ControlEvent::NEUTRAL
    };
    robot.send(stand);
    let standing = robot.controller.angles().clone();

    robot.send(ControlEvent {
        b: true,
        ..ControlEvent::NEUTRAL
    });
    let right = robot.controller.angles().clone();
    robot.send(ControlEvent {
        x: true,
        ..ControlEvent::NEUTRAL
    });
    let left = robot.controller.angles().clone();

    for joint in shoulders(End::Rear) {
        let s = standing.get(joint).unwrap();
        assert_eq!(right.get(joint), Some((s + 20.0).clamp(0.0, 180.0)));
        assert_eq!(left.get(joint), Some((s - 20.0).clamp(0.0, 180.0)));
    }
    for joint in [JointId::RearKneeLeft, JointId::FrontAnkleRight] {
        assert_eq!(right.get(joint), standing.get(joint));
        assert_eq!(left.get(joint), standing.get(joint));
    }
}
