//! Servo map: joint → (board, channel, pulse range, rest angle).
//!
//! Built once from `[motion_controller]` and read-only afterwards. Building
//! the map is where the wiring is validated as a whole: every joint of an
//! enabled subsystem present, boards referenced actually configured, and no
//! channel shared by two joints.

use spot_common::config::{
    self, BoardConfig, ConfigError, MotionControllerConfig, ServoConfig,
};
use spot_common::hal::BoardIndex;
use spot_common::joint::JointId;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Resolved wiring and calibration of one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointConfig {
    pub board: BoardIndex,
    pub channel: u8,
    pub min_pulse_us: u16,
    pub max_pulse_us: u16,
    pub rest_angle_deg: f32,
}

impl JointConfig {
    fn from_servo(board: BoardIndex, servo: &ServoConfig) -> Self {
        Self {
            board,
            channel: servo.channel,
            min_pulse_us: servo.min_pulse,
            max_pulse_us: servo.max_pulse,
            rest_angle_deg: servo.rest_angle,
        }
    }

    /// Pulse width for an angle: linear over [0, 180] onto the pulse range.
    /// `None` outside [0, 180].
    pub fn pulse_for_angle(&self, angle_deg: f32) -> Option<u16> {
        config::pulse_for_angle(self.min_pulse_us, self.max_pulse_us, angle_deg)
    }
}

/// Table of every configured joint plus the board settings.
#[derive(Debug, Clone)]
pub struct ServoMap {
    joints: [Option<JointConfig>; JointId::COUNT],
    boards: [Option<BoardConfig>; 2],
    legs_enabled: bool,
    arm_enabled: bool,
}

impl ServoMap {
    /// Build and validate the map.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` if no board is configured, a joint of
    /// an enabled subsystem has no entry, an entry is out of range, a joint
    /// is wired to an unconfigured board, or two joints share a channel.
    pub fn from_config(config: &MotionControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let boards = BoardIndex::ALL.map(|idx| config.boards.get(idx).cloned());
        let mut joints = [None; JointId::COUNT];
        let mut channels: HashMap<(BoardIndex, u8), JointId> = HashMap::new();

        let enabled = JointId::ALL.into_iter().filter(|j| {
            if j.is_leg() {
                config.legs_enabled
            } else {
                config.arm_enabled
            }
        });

        for joint in enabled {
            let servo = config.servo(joint).ok_or_else(|| {
                ConfigError::ValidationError(format!("missing servo entry for {joint}"))
            })?;
            servo.validate(joint.key())?;

            let board = BoardIndex::from_number(servo.board).ok_or_else(|| {
                ConfigError::ValidationError(format!("{joint}: board must be 1 or 2"))
            })?;
            if boards[board.slot()].is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "{joint} is wired to {board}, which is not configured"
                )));
            }
            if let Some(other) = channels.insert((board, servo.channel), joint) {
                return Err(ConfigError::ValidationError(format!(
                    "{joint} and {other} share channel {} on {board}",
                    servo.channel
                )));
            }

            joints[joint.index()] = Some(JointConfig::from_servo(board, servo));
        }

        for key in config.servos.keys() {
            if JointId::from_key(key).is_none() {
                warn!(key = %key, "Ignoring servo entry for unknown joint");
            }
        }

        let map = Self {
            joints,
            boards,
            legs_enabled: config.legs_enabled,
            arm_enabled: config.arm_enabled,
        };
        debug!(
            joints = map.joints().count(),
            boards = config.boards.configured_count(),
            "Servo map built"
        );
        Ok(map)
    }

    /// Configuration of a joint.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` if the joint belongs to a disabled
    /// subsystem.
    pub fn resolve(&self, joint: JointId) -> Result<&JointConfig, ConfigError> {
        self.get(joint).ok_or_else(|| {
            ConfigError::ValidationError(format!("{joint} is not configured"))
        })
    }

    /// Configuration of a joint, `None` if it is not driven.
    #[inline]
    pub fn get(&self, joint: JointId) -> Option<&JointConfig> {
        self.joints[joint.index()].as_ref()
    }

    /// Rest angle of a joint, `None` if it is not driven.
    pub fn rest_angle(&self, joint: JointId) -> Option<f32> {
        self.get(joint).map(|c| c.rest_angle_deg)
    }

    /// Every driven joint, in table order.
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &JointConfig)> {
        JointId::ALL
            .into_iter()
            .filter_map(|j| self.get(j).map(|c| (j, c)))
    }

    /// Settings of a board, `None` if the board is not configured.
    pub fn board(&self, index: BoardIndex) -> Option<&BoardConfig> {
        self.boards[index.slot()].as_ref()
    }

    /// Whether a second board is configured.
    pub fn has_second_board(&self) -> bool {
        self.board(BoardIndex::Two).is_some()
    }

    /// Whether the twelve leg joints are driven.
    pub fn legs_enabled(&self) -> bool {
        self.legs_enabled
    }

    /// Whether the four arm joints are driven.
    pub fn arm_enabled(&self) -> bool {
        self.arm_enabled
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use spot_common::config::{BoardsConfig, SpotConfig};
    use spot_common::config::ConfigLoader;
    use std::collections::BTreeMap;

    /// Legs on board 1 channels 0..11, arm on board 2 channels 0..3, all
    /// resting at 90°.
    pub(crate) fn test_config(second_board: bool, arm_enabled: bool) -> MotionControllerConfig {
        let mut servos = BTreeMap::new();
        for (i, joint) in JointId::LEGS.into_iter().enumerate() {
            servos.insert(joint.key().to_string(), servo(1, i as u8, 90.0));
        }
        for (i, joint) in JointId::ARM.into_iter().enumerate() {
            servos.insert(joint.key().to_string(), servo(2, i as u8, 90.0));
        }
        MotionControllerConfig {
            legs_enabled: true,
            arm_enabled,
            inactivity_timeout_ms: 60_000,
            settle_delay_ms: 0,
            phase_delay_ms: 0,
            boards: BoardsConfig {
                pca9685_1: Some(board(0x40)),
                pca9685_2: second_board.then(|| board(0x41)),
            },
            servos,
        }
    }

    fn board(address: u16) -> BoardConfig {
        BoardConfig {
            address,
            reference_clock_speed: 25_000_000,
            frequency: 50,
        }
    }

    fn servo(board: u8, channel: u8, rest_angle: f32) -> ServoConfig {
        ServoConfig {
            board,
            channel,
            min_pulse: 500,
            max_pulse: 2500,
            rest_angle,
        }
    }

    #[test]
    fn legs_only_map() {
        let map = ServoMap::from_config(&test_config(false, false)).unwrap();
        assert_eq!(map.joints().count(), 12);
        assert!(!map.has_second_board());
        assert!(map.get(JointId::ArmLift).is_none());
        assert!(map.resolve(JointId::ArmLift).is_err());

        let knee = map.resolve(JointId::RearKneeLeft).unwrap();
        assert_eq!(knee.board, BoardIndex::One);
        assert_eq!(knee.channel, 1);
        assert_eq!(knee.rest_angle_deg, 90.0);
    }

    #[test]
    fn arm_needs_its_board() {
        let err = ServoMap::from_config(&test_config(false, true)).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("pca9685_2")));

        let map = ServoMap::from_config(&test_config(true, true)).unwrap();
        assert_eq!(map.joints().count(), 16);
        assert_eq!(map.resolve(JointId::ArmCamTilt).unwrap().board, BoardIndex::Two);
    }

    #[test]
    fn missing_joint_is_rejected() {
        let mut config = test_config(false, false);
        config.servos.remove("front_ankle_right");
        let err = ServoMap::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("front_ankle_right")));
    }

    #[test]
    fn legacy_keys_resolve() {
        let mut config = test_config(false, false);
        let entry = config.servos.remove("rear_ankle_left").unwrap();
        config.servos.insert("rear_feet_left".to_string(), entry);
        let map = ServoMap::from_config(&config).unwrap();
        assert_eq!(map.resolve(JointId::RearAnkleLeft).unwrap().channel, 2);
    }

    #[test]
    fn shared_channel_is_rejected() {
        let mut config = test_config(false, false);
        config
            .servos
            .insert("front_knee_left".to_string(), servo(1, 0, 90.0));
        let err = ServoMap::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("share channel")));
    }

    #[test]
    fn out_of_range_entries_are_rejected() {
        let mut config = test_config(false, false);
        config
            .servos
            .insert("rear_knee_left".to_string(), servo(3, 1, 90.0));
        assert!(ServoMap::from_config(&config).is_err());

        let mut config = test_config(false, false);
        config
            .servos
            .insert("rear_knee_left".to_string(), servo(1, 1, 200.0));
        assert!(ServoMap::from_config(&config).is_err());
    }

    #[test]
    fn zero_boards_is_rejected() {
        let mut config = test_config(false, false);
        config.boards = BoardsConfig::default();
        assert!(ServoMap::from_config(&config).is_err());
    }

    #[test]
    fn non_numeric_pulse_fails_to_load() {
        let text = r#"
[shared]
service_name = "t"

[motion_controller.boards.pca9685_1]
address = 0x40

[motion_controller.servos.rear_knee_left]
board = 1
channel = 1
min_pulse = "500"
max_pulse = 2500
rest_angle = 90
"#;
        assert!(matches!(
            SpotConfig::from_toml(text),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn pulse_interpolation() {
        let map = ServoMap::from_config(&test_config(false, false)).unwrap();
        let knee = map.resolve(JointId::RearKneeLeft).unwrap();
        assert_eq!(knee.pulse_for_angle(0.0), Some(500));
        assert_eq!(knee.pulse_for_angle(45.0), Some(1000));
        assert_eq!(knee.pulse_for_angle(180.0), Some(2500));
        assert_eq!(knee.pulse_for_angle(181.0), None);
    }

    #[test]
    fn resolved_joints_agree_with_their_servo_entries() {
        let config = test_config(true, true);
        let map = ServoMap::from_config(&config).unwrap();
        for (key, servo) in &config.servos {
            let joint: JointId = key.parse().unwrap();
            let resolved = map.resolve(joint).unwrap();
            for angle in [0.0, 33.3, 90.0, 179.9, 180.0] {
                assert_eq!(
                    resolved.pulse_for_angle(angle),
                    servo.pulse_for_angle(angle),
                    "{key} at {angle}"
                );
            }
        }
    }
}
