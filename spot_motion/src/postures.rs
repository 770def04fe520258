//! Posture primitives.
//!
//! Each primitive transforms the joint angle store from one control input.
//! The numeric constants are the robot's physical calibration and are kept
//! exactly. Left and right servos are mounted mirrored, so a left-side delta
//! is multiplied by [`Side::mirror`] to get the same physical motion on
//! either side.
//!
//! Leg primitives do nothing when the legs are disabled, arm primitives do
//! nothing when the arm is disabled. Out-of-range results saturate in the
//! store.

use crate::angles::{JointAngles, clamp_angle};
use crate::servo_map::ServoMap;
use spot_common::joint::{End, JointId, JointKind, Side};

/// Knee step of the digital up/down move [deg].
const UP_DOWN_KNEE_STEP: f32 = 10.0;
/// Ankle step of the digital up/down move [deg].
const UP_DOWN_ANKLE_STEP: f32 = 15.0;
/// Shoulder step of the digital left/right move [deg].
const LEFT_RIGHT_SHOULDER_STEP: f32 = 5.0;

/// Angle each knee/ankle reaches at full analog crouch (`ry = -1`).
const CROUCH_MAX_ANGLES: [(JointId, f32); 8] = [
    (JointId::RearKneeLeft, 38.0),
    (JointId::RearAnkleLeft, 70.0),
    (JointId::RearKneeRight, 126.0),
    (JointId::RearAnkleRight, 102.0),
    (JointId::FrontKneeLeft, 57.0),
    (JointId::FrontAnkleLeft, 85.0),
    (JointId::FrontKneeRight, 130.0),
    (JointId::FrontAnkleRight, 120.0),
];

/// Shoulder angles at `rx = -1` and `rx = 1`, rear pair.
const REAR_SHOULDER_SWING: (f32, f32) = (30.0, 150.0);
/// Shoulder angles at `rx = -1` and `rx = 1`, front pair.
const FRONT_SHOULDER_SWING: (f32, f32) = (150.0, 30.0);

/// Extra shoulder rotation of a lean [deg].
const LEAN_SHOULDER: f32 = 20.0;

/// Linear map of `value` from `from` onto `to`, truncated toward zero.
pub fn map_range(from: (f32, f32), to: (f32, f32), value: f32) -> f32 {
    (to.0 + (value - from.0) * (to.1 - to.0) / (from.1 - from.0)).trunc()
}

/// Left-side standing offset of a leg joint, before mirroring.
fn standing_offset(joint: JointId) -> f32 {
    match (joint.end(), joint.kind()) {
        (Some(End::Rear), JointKind::Shoulder) => 10.0,
        (Some(End::Rear), JointKind::Knee) => -50.0,
        (Some(End::Rear), JointKind::Ankle) => 70.0,
        (Some(End::Front), JointKind::Shoulder) => -10.0,
        (Some(End::Front), JointKind::Knee) => -45.0,
        (Some(End::Front), JointKind::Ankle) => 65.0,
        _ => 0.0,
    }
}

#[inline]
fn mirror(joint: JointId) -> f32 {
    joint.side().map_or(1.0, Side::mirror)
}

/// Every driven joint back to its rest angle.
pub fn rest_position(angles: &mut JointAngles, map: &ServoMap) {
    angles.reset_to_rest(map);
}

/// Digital crouch/raise (`hat0y`). `raw < 0` bends knees by −10° and ankles
/// by +15° (left-side sense), `raw > 0` the opposite, `raw == 0` rests.
pub fn body_up_down(angles: &mut JointAngles, map: &ServoMap, raw: f32) {
    if !map.legs_enabled() {
        return;
    }
    if raw == 0.0 {
        rest_position(angles, map);
        return;
    }
    let direction = if raw < 0.0 { 1.0 } else { -1.0 };
    for joint in JointId::LEGS {
        let step = match joint.kind() {
            JointKind::Knee => -UP_DOWN_KNEE_STEP,
            JointKind::Ankle => UP_DOWN_ANKLE_STEP,
            _ => continue,
        };
        angles.apply_delta(joint, direction * mirror(joint) * step);
    }
}

/// Analog crouch (`ry`): each knee/ankle follows `ry` from its rest angle
/// at `1` to its crouch angle at `-1`.
pub fn body_up_down_analog(angles: &mut JointAngles, map: &ServoMap, raw: f32) {
    if !map.legs_enabled() {
        return;
    }
    for (joint, max_angle) in CROUCH_MAX_ANGLES {
        if let Some(rest) = map.rest_angle(joint) {
            angles.set(joint, map_range((1.0, -1.0), (rest, max_angle), raw));
        }
    }
}

/// Digital sway (`hat0x`). `raw < 0` turns rear shoulders by −5° and front
/// shoulders by +5°, `raw > 0` the opposite, `raw == 0` rests.
pub fn body_left_right(angles: &mut JointAngles, map: &ServoMap, raw: f32) {
    if !map.legs_enabled() {
        return;
    }
    if raw == 0.0 {
        rest_position(angles, map);
        return;
    }
    let direction = if raw < 0.0 { 1.0 } else { -1.0 };
    for joint in JointId::LEGS {
        let step = match (joint.kind(), joint.end()) {
            (JointKind::Shoulder, Some(End::Rear)) => -LEFT_RIGHT_SHOULDER_STEP,
            (JointKind::Shoulder, Some(End::Front)) => LEFT_RIGHT_SHOULDER_STEP,
            _ => continue,
        };
        angles.apply_delta(joint, direction * step);
    }
}

/// Analog sway (`rx`): rear shoulders swing 30°→150° and front shoulders
/// 150°→30° as `rx` goes from −1 to 1.
pub fn body_left_right_analog(angles: &mut JointAngles, map: &ServoMap, raw: f32) {
    if !map.legs_enabled() {
        return;
    }
    let rear = map_range((-1.0, 1.0), REAR_SHOULDER_SWING, raw);
    let front = map_range((-1.0, 1.0), FRONT_SHOULDER_SWING, raw);
    for joint in JointId::LEGS {
        match (joint.kind(), joint.end()) {
            (JointKind::Shoulder, Some(End::Rear)) => angles.set(joint, rear),
            (JointKind::Shoulder, Some(End::Front)) => angles.set(joint, front),
            _ => continue,
        };
    }
}

/// Direction of a lean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Left,
    Right,
}

/// A posture written rear pair first, then front pair.
///
/// Splitting the write halves the number of servos starting to move at
/// once, and with it the current spike.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoPhase {
    pub rear: Vec<(JointId, f32)>,
    pub front: Vec<(JointId, f32)>,
}

fn two_phase(map: &ServoMap, extra: impl Fn(JointId) -> f32) -> Option<TwoPhase> {
    if !map.legs_enabled() {
        return None;
    }
    let target = |joint: JointId| {
        map.rest_angle(joint).map(|rest| {
            let angle = rest + mirror(joint) * standing_offset(joint) + extra(joint);
            (joint, clamp_angle(angle))
        })
    };
    Some(TwoPhase {
        rear: JointId::REAR.into_iter().filter_map(target).collect(),
        front: JointId::FRONT.into_iter().filter_map(target).collect(),
    })
}

/// Standing posture: rest angles plus the standing offsets.
///
/// Built from the map alone. Any crouch or sway accumulated in the current
/// targets is discarded, so standing always lands on the same angles.
pub fn standing_posture(map: &ServoMap) -> Option<TwoPhase> {
    two_phase(map, |_| 0.0)
}

/// Standing posture with all shoulders turned 20° towards one side.
///
/// Absolute like [`standing_posture`]: the current targets play no part.
pub fn lean(map: &ServoMap, direction: Lean) -> Option<TwoPhase> {
    let sign = match direction {
        Lean::Right => 1.0,
        Lean::Left => -1.0,
    };
    two_phase(map, move |joint| match (joint.kind(), joint.end()) {
        (JointKind::Shoulder, Some(End::Rear)) => sign * LEAN_SHOULDER,
        (JointKind::Shoulder, Some(End::Front)) => -sign * LEAN_SHOULDER,
        _ => 0.0,
    })
}

fn set_arm_joint(angles: &mut JointAngles, map: &ServoMap, joint: JointId, target: f32) -> bool {
    if !map.arm_enabled() {
        return false;
    }
    match angles.get(joint) {
        Some(current) if current.trunc() != target.trunc() => {
            angles.set(joint, target);
            true
        }
        _ => false,
    }
}

/// Arm rotation from `lx`, over half the stick travel. Returns true if the
/// target changed.
pub fn arm_rotation(angles: &mut JointAngles, map: &ServoMap, raw: f32) -> bool {
    let target = map_range((-1.0, 1.0), (0.0, 180.0), raw / 2.0);
    set_arm_joint(angles, map, JointId::ArmRotation, target)
}

/// Arm lift from `ly`, over half the stick travel, inverted.
pub fn arm_lift(angles: &mut JointAngles, map: &ServoMap, raw: f32) -> bool {
    let target = map_range((-1.0, 1.0), (180.0, 0.0), raw / 2.0);
    set_arm_joint(angles, map, JointId::ArmLift, target)
}

/// Arm reach from `ly`, over half the stick travel, inverted.
pub fn arm_reach(angles: &mut JointAngles, map: &ServoMap, raw: f32) -> bool {
    let target = map_range((-1.0, 1.0), (180.0, 0.0), raw / 2.0);
    set_arm_joint(angles, map, JointId::ArmReach, target)
}

/// Camera tilt from `ry`, between 100° and 150°.
pub fn arm_cam_tilt(angles: &mut JointAngles, map: &ServoMap, raw: f32) -> bool {
    let target = map_range((-1.0, 1.0), (100.0, 150.0), raw);
    set_arm_joint(angles, map, JointId::ArmCamTilt, target)
}
