//! # Spot Motion
//!
//! Motion-control core of the SpotMicro quadruped. Reads remote controller
//! snapshots, keeps a target angle for every joint, and writes those angles
//! to the PWM boards while the robot is activated.
//!
//! ## Layers
//!
//! 1. **ServoMap**: joint → board, channel, pulse range, rest angle
//! 2. **BoardManager**: board lifecycle and per-joint writes
//! 3. **JointAngles**: clamped target per joint
//! 4. **postures**: pure transforms of the targets
//! 5. **MotionController**: event loop, activation and idle watchdog
//!
//! The controller is the only owner of servo state. Everything else talks to
//! it through bounded channels: control events in, abort commands and status
//! reports out (see [`sideband`] and [`input`]).

pub mod angles;
pub mod boards;
pub mod controller;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod postures;
pub mod servo_map;
pub mod sideband;
pub mod state;

pub use controller::{MotionController, MotionTiming};
pub use error::{MotionError, WriteError, WriteReport};
pub use servo_map::ServoMap;
