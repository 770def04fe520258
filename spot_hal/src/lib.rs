//! # Spot HAL Library
//!
//! PWM board drivers for the SpotMicro controller.
//!
//! Drivers implement the `PwmDriver` trait defined in
//! `spot_common::hal::driver`. The motion controller picks one by name from a
//! [`DriverRegistry`] at startup and opens boards through it on every
//! activation.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations (`simulation`, `pca9685`)
//! - [`gpio`] - Servo-enable line on a sysfs GPIO pin (feature `gpio`)
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   spot_motion (BoardManager)               │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │ open / set_channel_pulse / close
//!                             ▼
//!                   ┌────────────────────┐
//!                   │  PwmDriver trait   │ ◄── DriverRegistry
//!                   └─────────┬──────────┘
//!               ┌─────────────┴─────────────┐
//!               ▼                           ▼
//!      ┌────────────────┐          ┌────────────────┐
//!      │  simulation    │          │  pca9685       │
//!      │  (SimRig)      │          │  (/dev/i2c-1)  │
//!      └────────────────┘          └────────────────┘
//! ```

#![warn(missing_docs)]

pub mod driver_registry;
pub mod drivers;
#[cfg(feature = "gpio")]
pub mod gpio;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{SimOutputLine, SimRig, SimulationDriver};
