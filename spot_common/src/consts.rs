//! System-wide constants for the Spot workspace.
//!
//! Single source of truth for queue sizes, default timings and servo limits.

/// Capacity of the motion-command channel. A full channel blocks the
/// producer instead of queueing stale commands.
pub const MOTION_QUEUE_CAPACITY: usize = 1;

/// Capacity of the abort coordinator channel.
pub const ABORT_QUEUE_CAPACITY: usize = 10;

/// Capacity of the status display channel.
pub const STATUS_QUEUE_CAPACITY: usize = 10;

/// Idle time after which an activated controller powers the servos down.
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 60_000;

/// Time the servos get to reach rest before the boards are released.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Pause between the rear and front halves of a two-phase posture write.
pub const DEFAULT_PHASE_DELAY_MS: u64 = 50;

/// Lowest commandable servo angle in degrees.
pub const MIN_ANGLE_DEG: f32 = 0.0;

/// Highest commandable servo angle in degrees (servo actuation range).
pub const MAX_ANGLE_DEG: f32 = 180.0;

/// Number of PWM channels on one driver board.
pub const CHANNELS_PER_BOARD: u8 = 16;

/// Maximum number of driver boards on the bus.
pub const MAX_BOARDS: usize = 2;

/// PCA9685 internal oscillator frequency in Hz.
pub const DEFAULT_REFERENCE_CLOCK_SPEED: u32 = 25_000_000;

/// Standard analog servo refresh rate in Hz.
pub const DEFAULT_PWM_FREQUENCY: u32 = 50;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/spot/spot.toml";
