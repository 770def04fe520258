//! PWM driver seam.
//!
//! This module defines the trait pair every servo board backend implements
//! (`PwmDriver` opens boards, `PwmBoard` drives channels) and the board
//! identifiers shared by the configuration and the motion controller.

pub mod driver;
pub mod types;

pub use driver::{DriverFactory, HalError, OutputLine, PwmBoard, PwmDriver};
pub use types::BoardIndex;
