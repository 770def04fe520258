//! Joint identities and leg geometry.
//!
//! Twelve leg joints (rear/front × left/right × shoulder/knee/ankle) plus
//! four optional arm joints. A `JointId` is a stable index into every
//! per-joint table in the workspace.

use std::fmt;
use std::str::FromStr;

/// One rotational degree of freedom, actuated by one servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointId {
    RearShoulderLeft,
    RearKneeLeft,
    RearAnkleLeft,
    RearShoulderRight,
    RearKneeRight,
    RearAnkleRight,
    FrontShoulderLeft,
    FrontKneeLeft,
    FrontAnkleLeft,
    FrontShoulderRight,
    FrontKneeRight,
    FrontAnkleRight,
    ArmRotation,
    ArmLift,
    ArmReach,
    ArmCamTilt,
}

/// Body side of a leg joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign applied to a left-side delta to obtain the same physical motion
    /// on this side. Left and right servos are mounted with opposite
    /// rotational sense.
    #[inline]
    pub const fn mirror(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }
}

/// Rear or front pair of legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Rear,
    Front,
}

/// Mechanical role of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Shoulder,
    Knee,
    Ankle,
    Arm,
}

impl JointId {
    /// Number of joints, legs and arm.
    pub const COUNT: usize = 16;

    /// All joints in table order.
    pub const ALL: [JointId; Self::COUNT] = [
        Self::RearShoulderLeft,
        Self::RearKneeLeft,
        Self::RearAnkleLeft,
        Self::RearShoulderRight,
        Self::RearKneeRight,
        Self::RearAnkleRight,
        Self::FrontShoulderLeft,
        Self::FrontKneeLeft,
        Self::FrontAnkleLeft,
        Self::FrontShoulderRight,
        Self::FrontKneeRight,
        Self::FrontAnkleRight,
        Self::ArmRotation,
        Self::ArmLift,
        Self::ArmReach,
        Self::ArmCamTilt,
    ];

    /// The twelve leg joints.
    pub const LEGS: [JointId; 12] = [
        Self::RearShoulderLeft,
        Self::RearKneeLeft,
        Self::RearAnkleLeft,
        Self::RearShoulderRight,
        Self::RearKneeRight,
        Self::RearAnkleRight,
        Self::FrontShoulderLeft,
        Self::FrontKneeLeft,
        Self::FrontAnkleLeft,
        Self::FrontShoulderRight,
        Self::FrontKneeRight,
        Self::FrontAnkleRight,
    ];

    /// Rear leg joints, written first in a two-phase posture.
    pub const REAR: [JointId; 6] = [
        Self::RearShoulderLeft,
        Self::RearKneeLeft,
        Self::RearAnkleLeft,
        Self::RearShoulderRight,
        Self::RearKneeRight,
        Self::RearAnkleRight,
    ];

    /// Front leg joints, written second in a two-phase posture.
    pub const FRONT: [JointId; 6] = [
        Self::FrontShoulderLeft,
        Self::FrontKneeLeft,
        Self::FrontAnkleLeft,
        Self::FrontShoulderRight,
        Self::FrontKneeRight,
        Self::FrontAnkleRight,
    ];

    /// The four arm joints.
    pub const ARM: [JointId; 4] = [
        Self::ArmRotation,
        Self::ArmLift,
        Self::ArmReach,
        Self::ArmCamTilt,
    ];

    /// Position in per-joint tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Configuration key (`[motion_controller.servos.<key>]`).
    pub const fn key(self) -> &'static str {
        match self {
            Self::RearShoulderLeft => "rear_shoulder_left",
            Self::RearKneeLeft => "rear_knee_left",
            Self::RearAnkleLeft => "rear_ankle_left",
            Self::RearShoulderRight => "rear_shoulder_right",
            Self::RearKneeRight => "rear_knee_right",
            Self::RearAnkleRight => "rear_ankle_right",
            Self::FrontShoulderLeft => "front_shoulder_left",
            Self::FrontKneeLeft => "front_knee_left",
            Self::FrontAnkleLeft => "front_ankle_left",
            Self::FrontShoulderRight => "front_shoulder_right",
            Self::FrontKneeRight => "front_knee_right",
            Self::FrontAnkleRight => "front_ankle_right",
            Self::ArmRotation => "arm_rotation",
            Self::ArmLift => "arm_lift",
            Self::ArmReach => "arm_reach",
            Self::ArmCamTilt => "arm_cam_tilt",
        }
    }

    /// Older configuration key, still accepted when loading.
    pub const fn legacy_key(self) -> Option<&'static str> {
        match self {
            Self::RearKneeLeft => Some("rear_leg_left"),
            Self::RearAnkleLeft => Some("rear_feet_left"),
            Self::RearKneeRight => Some("rear_leg_right"),
            Self::RearAnkleRight => Some("rear_feet_right"),
            Self::FrontKneeLeft => Some("front_leg_left"),
            Self::FrontAnkleLeft => Some("front_feet_left"),
            Self::FrontKneeRight => Some("front_leg_right"),
            Self::FrontAnkleRight => Some("front_feet_right"),
            Self::ArmReach => Some("arm_range"),
            _ => None,
        }
    }

    /// Mechanical role.
    pub const fn kind(self) -> JointKind {
        match self {
            Self::RearShoulderLeft
            | Self::RearShoulderRight
            | Self::FrontShoulderLeft
            | Self::FrontShoulderRight => JointKind::Shoulder,
            Self::RearKneeLeft | Self::RearKneeRight | Self::FrontKneeLeft | Self::FrontKneeRight => {
                JointKind::Knee
            }
            Self::RearAnkleLeft
            | Self::RearAnkleRight
            | Self::FrontAnkleLeft
            | Self::FrontAnkleRight => JointKind::Ankle,
            Self::ArmRotation | Self::ArmLift | Self::ArmReach | Self::ArmCamTilt => JointKind::Arm,
        }
    }

    /// Body side, `None` for arm joints.
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::RearShoulderLeft
            | Self::RearKneeLeft
            | Self::RearAnkleLeft
            | Self::FrontShoulderLeft
            | Self::FrontKneeLeft
            | Self::FrontAnkleLeft => Some(Side::Left),
            Self::RearShoulderRight
            | Self::RearKneeRight
            | Self::RearAnkleRight
            | Self::FrontShoulderRight
            | Self::FrontKneeRight
            | Self::FrontAnkleRight => Some(Side::Right),
            _ => None,
        }
    }

    /// Rear or front pair, `None` for arm joints.
    pub const fn end(self) -> Option<End> {
        match self.index() {
            0..=5 => Some(End::Rear),
            6..=11 => Some(End::Front),
            _ => None,
        }
    }

    /// True for the twelve leg joints.
    #[inline]
    pub const fn is_leg(self) -> bool {
        !matches!(self.kind(), JointKind::Arm)
    }

    /// Look a joint up by its current or legacy configuration key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|j| j.key() == key || j.legacy_key() == Some(key))
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown joint key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown joint '{0}'")]
pub struct UnknownJoint(pub String);

impl FromStr for JointId {
    type Err = UnknownJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownJoint(s.to_string()))
    }
}
