//! PWM driver implementations.
//!
//! This module contains all driver implementations:
//!
//! - [`simulation`] - In-memory rig for development and testing
//! - [`pca9685`] - PCA9685 boards over Linux I2C (register maths always
//!   built, the bus driver behind the `pca9685` feature)
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `PwmDriver` trait from `spot_common::hal::driver`
//! 3. Register the driver in [`register_all_drivers`]

pub mod pca9685;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers into `registry`.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);

    #[cfg(feature = "pca9685")]
    registry.register("pca9685", pca9685::create_driver);
}
