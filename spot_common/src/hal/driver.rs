//! PWM driver trait and error types.
//!
//! This module defines:
//! - `PwmDriver` trait - Interface for pluggable board backends
//! - `PwmBoard` trait - One opened board
//! - `OutputLine` trait - Digital output gating servo power
//! - `HalError` enum - Error types for HAL operations
//! - `DriverFactory` type alias - Factory function type

use crate::config::BoardConfig;
use crate::hal::types::BoardIndex;
use thiserror::Error;

/// Error types for HAL operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Driver not found in the registry
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Board could not be initialized
    #[error("Failed to open {board}: {reason}")]
    OpenFailed { board: BoardIndex, reason: String },

    /// Operation on a board that is not open
    #[error("{0} is closed")]
    BoardClosed(BoardIndex),

    /// Channel number beyond the board's outputs
    #[error("Channel {0} does not exist")]
    InvalidChannel(u8),

    /// Pulse width the board cannot produce at its frequency
    #[error("Pulse {pulse_us} µs out of range on channel {channel}")]
    PulseOutOfRange { channel: u8, pulse_us: u16 },

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn PwmDriver>;

/// Trait defining the interface for PWM drivers.
///
/// A driver knows how to bring up one kind of servo board. The motion
/// controller opens boards through it on activation and drops them on
/// deactivation.
///
/// # Lifecycle
///
/// 1. `open()` - Called on every activation, once per configured board
/// 2. `PwmBoard::set_channel_pulse()` - Called for each joint write
/// 3. `PwmBoard::close()` - Called on deactivation and on drop
pub trait PwmDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation", "pca9685").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize a board and set its PWM frequency.
    ///
    /// # Errors
    /// Return `HalError::OpenFailed` if the board does not respond.
    fn open(&self, board: BoardIndex, config: &BoardConfig)
    -> Result<Box<dyn PwmBoard>, HalError>;
}

/// One opened servo board.
pub trait PwmBoard: Send {
    /// Which board this is.
    fn index(&self) -> BoardIndex;

    /// Set the high time of one channel's pulse, in microseconds.
    fn set_channel_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<(), HalError>;

    /// Stop all outputs and release the bus. Idempotent.
    fn close(&mut self) -> Result<(), HalError>;

    /// Whether the board is still open.
    fn is_open(&self) -> bool;
}

/// Digital output wired to the boards' output-enable input.
///
/// High powers the servos, low cuts them.
pub trait OutputLine: Send {
    /// Drive the line high.
    fn set_high(&mut self) -> Result<(), HalError>;

    /// Drive the line low.
    fn set_low(&mut self) -> Result<(), HalError>;
}
