//! PCA9685 16-channel PWM controller.
//!
//! Register access goes through the `pwm-pca9685` crate. [`timing`] turns
//! the configured frequency and pulse widths into prescaler and counter
//! values and is always built; the I2C driver needs the `pca9685` feature.

pub mod timing;

#[cfg(feature = "pca9685")]
mod driver;

#[cfg(feature = "pca9685")]
pub use driver::{Pca9685Board, Pca9685Driver, create_driver};
