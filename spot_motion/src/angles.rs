//! Joint angle store.
//!
//! Current target angle of every driven joint. Writes saturate to the servo
//! actuation range instead of failing: analog-derived moves routinely
//! overshoot and the nearest reachable angle is the useful answer.

use crate::servo_map::ServoMap;
use spot_common::consts::{MAX_ANGLE_DEG, MIN_ANGLE_DEG};
use spot_common::joint::JointId;

/// Saturate an angle to [0, 180]. NaN maps to 0.
#[inline]
pub fn clamp_angle(angle: f32) -> f32 {
    if angle.is_nan() {
        MIN_ANGLE_DEG
    } else {
        angle.clamp(MIN_ANGLE_DEG, MAX_ANGLE_DEG)
    }
}

/// Target angles, indexed by `JointId`. Joints that are not driven hold no
/// angle and ignore writes.
#[derive(Debug, Clone, PartialEq)]
pub struct JointAngles {
    angles: [Option<f32>; JointId::COUNT],
}

impl JointAngles {
    /// Every driven joint at its rest angle.
    pub fn at_rest(map: &ServoMap) -> Self {
        let mut angles = Self {
            angles: [None; JointId::COUNT],
        };
        angles.reset_to_rest(map);
        angles
    }

    /// Current target of a joint.
    #[inline]
    pub fn get(&self, joint: JointId) -> Option<f32> {
        self.angles[joint.index()]
    }

    /// Store a clamped target. Returns the stored value, `None` if the joint
    /// is not driven.
    pub fn set(&mut self, joint: JointId, angle: f32) -> Option<f32> {
        let slot = self.angles[joint.index()].as_mut()?;
        *slot = clamp_angle(angle);
        Some(*slot)
    }

    /// `set(joint, get(joint) + delta)`.
    pub fn apply_delta(&mut self, joint: JointId, delta: f32) -> Option<f32> {
        let current = self.get(joint)?;
        self.set(joint, current + delta)
    }

    /// Every driven joint back to its configured rest angle.
    pub fn reset_to_rest(&mut self, map: &ServoMap) {
        for joint in JointId::ALL {
            self.angles[joint.index()] = map.rest_angle(joint).map(clamp_angle);
        }
    }

    /// Driven joints and their targets, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, f32)> + '_ {
        JointId::ALL
            .into_iter()
            .filter_map(|j| self.get(j).map(|a| (j, a)))
    }
}
