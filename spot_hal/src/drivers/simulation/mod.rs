//! Simulation driver module.
//!
//! This module provides a software rig standing in for the PWM boards and
//! the servo-enable line, for development and testing without hardware.

mod driver;
mod rig;

pub use driver::{SimBoard, SimOutputLine, SimulationDriver};
pub use rig::{DEFAULT_HISTORY_LIMIT, PulseWrite, SimRig};

use spot_common::hal::driver::PwmDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn PwmDriver> {
    Box::new(SimulationDriver::new())
}
