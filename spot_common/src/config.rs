//! Configuration loading traits and types.
//!
//! This module provides a standardized way to load TOML configuration files
//! across the Spot binaries, and the schema of `spot.toml`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use spot_common::config::{ConfigLoader, ConfigError, SpotConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = SpotConfig::load(Path::new("spot.toml"))?;
//!     config.validate()?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! service_name = "spot-motion"
//!
//! [motion_controller]
//! legs_enabled = true
//! arm_enabled = false
//!
//! [motion_controller.boards.pca9685_1]
//! address = 0x40
//!
//! [motion_controller.servos.rear_shoulder_left]
//! board = 1
//! channel = 0
//! min_pulse = 500
//! max_pulse = 2500
//! rest_angle = 87
//! ```

use crate::consts::{
    DEFAULT_INACTIVITY_TIMEOUT_MS, DEFAULT_PHASE_DELAY_MS, DEFAULT_PWM_FREQUENCY,
    DEFAULT_REFERENCE_CLOCK_SPEED, DEFAULT_SETTLE_DELAY_MS, CHANNELS_PER_BOARD, MAX_ANGLE_DEG,
    MIN_ANGLE_DEG,
};
use crate::hal::BoardIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
///
/// This enum represents all possible errors that can occur when loading
/// configuration files.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed (syntax or value types).
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields shared across the Spot binaries.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "spot-motion"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax or a value type is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

fn default_true() -> bool {
    true
}

fn default_inactivity_timeout_ms() -> u64 {
    DEFAULT_INACTIVITY_TIMEOUT_MS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_phase_delay_ms() -> u64 {
    DEFAULT_PHASE_DELAY_MS
}

fn default_reference_clock_speed() -> u32 {
    DEFAULT_REFERENCE_CLOCK_SPEED
}

fn default_frequency() -> u32 {
    DEFAULT_PWM_FREQUENCY
}

/// Root of `spot.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotConfig {
    /// Service identity and log level.
    pub shared: SharedConfig,

    /// Boards, servos and motion timing.
    pub motion_controller: MotionControllerConfig,

    /// Servo-enable output line.
    #[serde(default)]
    pub abort_controller: AbortControllerConfig,
}

impl SpotConfig {
    /// Validate the sections that can be checked without building a servo map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.motion_controller.validate()
    }
}

/// `[motion_controller]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionControllerConfig {
    /// Drive the twelve leg servos.
    #[serde(default = "default_true")]
    pub legs_enabled: bool,

    /// Drive the four arm servos.
    #[serde(default)]
    pub arm_enabled: bool,

    /// Idle time before an activated controller powers down [ms].
    #[serde(default = "default_inactivity_timeout_ms")]
    pub inactivity_timeout_ms: u64,

    /// Wait after moving to rest, before releasing the boards [ms].
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause between the rear and front halves of a posture [ms].
    #[serde(default = "default_phase_delay_ms")]
    pub phase_delay_ms: u64,

    /// PWM driver boards.
    #[serde(default)]
    pub boards: BoardsConfig,

    /// Per-joint servo wiring and calibration, keyed by joint name.
    #[serde(default)]
    pub servos: BTreeMap<String, ServoConfig>,
}

impl MotionControllerConfig {
    /// Inactivity timeout as a `Duration`.
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }

    /// Settle delay as a `Duration`.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Phase delay as a `Duration`.
    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    /// Validate timing and board presence.
    ///
    /// # Validation Rules
    /// 1. `inactivity_timeout_ms` > 0
    /// 2. board 1 is configured
    /// 3. at least one of legs/arm is enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inactivity_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "inactivity_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.boards.configured_count() == 0 {
            return Err(ConfigError::ValidationError(
                "no PWM board configured (motion_controller.boards.pca9685_1 missing)".to_string(),
            ));
        }
        if !self.legs_enabled && !self.arm_enabled {
            return Err(ConfigError::ValidationError(
                "neither legs nor arm are enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Servo entry for a joint, accepting the legacy key as a fallback.
    pub fn servo(&self, joint: crate::joint::JointId) -> Option<&ServoConfig> {
        if let Some(servo) = self.servos.get(joint.key()) {
            return Some(servo);
        }
        let legacy = joint.legacy_key()?;
        let servo = self.servos.get(legacy)?;
        tracing::debug!(joint = %joint, legacy, "servo configured under legacy key");
        Some(servo)
    }
}

/// `[motion_controller.boards]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardsConfig {
    /// Mandatory first board.
    #[serde(default)]
    pub pca9685_1: Option<BoardConfig>,

    /// Optional second board. Absent (or address 0) means single-board mode.
    #[serde(default)]
    pub pca9685_2: Option<BoardConfig>,
}

impl BoardsConfig {
    /// Configuration of a board, `None` if it is absent or has address 0.
    pub fn get(&self, index: BoardIndex) -> Option<&BoardConfig> {
        let board = match index {
            BoardIndex::One => self.pca9685_1.as_ref(),
            BoardIndex::Two => self.pca9685_2.as_ref(),
        };
        board.filter(|b| b.address != 0)
    }

    /// Number of boards present in the configuration (0, 1 or 2).
    pub fn configured_count(&self) -> usize {
        BoardIndex::ALL
            .iter()
            .filter(|&&idx| self.get(idx).is_some())
            .count()
    }
}

/// One PWM driver board on the I2C bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// I2C address (hex literal allowed, e.g. `0x40`).
    pub address: u16,

    /// Oscillator frequency used to compute the prescaler [Hz].
    #[serde(default = "default_reference_clock_speed")]
    pub reference_clock_speed: u32,

    /// PWM output frequency [Hz].
    #[serde(default = "default_frequency")]
    pub frequency: u32,
}

/// Wiring and calibration of one servo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Owning board, 1 or 2.
    pub board: u8,

    /// PWM channel on the board, 0..=15.
    pub channel: u8,

    /// Pulse width at 0° [µs].
    pub min_pulse: u16,

    /// Pulse width at 180° [µs].
    pub max_pulse: u16,

    /// Calibrated neutral angle [deg].
    pub rest_angle: f32,
}

impl ServoConfig {
    /// Validate a single servo entry.
    ///
    /// # Validation Rules
    /// 1. `board` ∈ {1, 2}
    /// 2. `channel` < 16
    /// 3. `min_pulse` < `max_pulse`
    /// 4. `rest_angle` ∈ [0, 180]
    pub fn validate(&self, key: &str) -> Result<(), ConfigError> {
        if BoardIndex::from_number(self.board).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "{key}: board must be 1 or 2, got {}",
                self.board
            )));
        }
        if self.channel >= CHANNELS_PER_BOARD {
            return Err(ConfigError::ValidationError(format!(
                "{key}: channel {} out of range 0..={}",
                self.channel,
                CHANNELS_PER_BOARD - 1
            )));
        }
        if self.min_pulse >= self.max_pulse {
            return Err(ConfigError::ValidationError(format!(
                "{key}: min_pulse ({}) must be below max_pulse ({})",
                self.min_pulse, self.max_pulse
            )));
        }
        if !(MIN_ANGLE_DEG..=MAX_ANGLE_DEG).contains(&self.rest_angle) {
            return Err(ConfigError::ValidationError(format!(
                "{key}: rest_angle {} outside [{MIN_ANGLE_DEG}, {MAX_ANGLE_DEG}]",
                self.rest_angle
            )));
        }
        Ok(())
    }

    /// Pulse width for an angle on this servo, see [`pulse_for_angle`].
    pub fn pulse_for_angle(&self, angle_deg: f32) -> Option<u16> {
        pulse_for_angle(self.min_pulse, self.max_pulse, angle_deg)
    }
}

/// Pulse width for an angle, interpolated linearly from [0, 180] onto
/// `[min_pulse, max_pulse]`. Returns `None` outside the actuation range.
pub fn pulse_for_angle(min_pulse: u16, max_pulse: u16, angle_deg: f32) -> Option<u16> {
    if !(MIN_ANGLE_DEG..=MAX_ANGLE_DEG).contains(&angle_deg) {
        return None;
    }
    let span = f32::from(max_pulse.saturating_sub(min_pulse));
    let pulse = f32::from(min_pulse) + span * angle_deg / MAX_ANGLE_DEG;
    Some(pulse.round() as u16)
}

/// `[abort_controller]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbortControllerConfig {
    /// BCM pin wired to the boards' output-enable input.
    #[serde(default)]
    pub gpio_port: Option<u8>,
}
