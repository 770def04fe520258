//! Prelude module for common re-exports.
//!
//! This module provides convenient re-exports of commonly used types
//! so that consumers can do `use spot_common::prelude::*;` and get
//! the most important types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use spot_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    BoardConfig, ConfigError, ConfigLoader, MotionControllerConfig, ServoConfig, SharedConfig,
    SpotConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_ANGLE_DEG, MIN_ANGLE_DEG};

// ─── Joints & Input ─────────────────────────────────────────────────
pub use crate::event::ControlEvent;
pub use crate::joint::{End, JointId, JointKind, Side};

// ─── Channels ───────────────────────────────────────────────────────
pub use crate::messages::{AbortCommand, Component, Health, MotionMessage, StatusMessage};

// ─── HAL ────────────────────────────────────────────────────────────
pub use crate::hal::{BoardIndex, HalError, OutputLine, PwmBoard, PwmDriver};
