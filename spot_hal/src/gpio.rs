//! Servo-enable line on a sysfs GPIO pin.

use embedded_hal::digital::OutputPin;
use linux_embedded_hal::SysfsPin;
use linux_embedded_hal::sysfs_gpio::Direction;
use spot_common::hal::driver::{HalError, OutputLine};
use tracing::debug;

/// Output line driving the boards' output-enable input through sysfs.
pub struct SysfsOutputLine {
    pin: SysfsPin,
    number: u8,
}

impl SysfsOutputLine {
    /// Export BCM pin `number` and configure it as an output.
    pub fn open(number: u8) -> Result<Self, HalError> {
        let pin = SysfsPin::new(u64::from(number));
        pin.export()
            .and_then(|()| pin.set_direction(Direction::Out))
            .map_err(|e| HalError::CommunicationError(format!("GPIO {number}: {e}")))?;
        debug!(pin = number, "GPIO exported as output");
        Ok(Self { pin, number })
    }

    fn drive(&mut self, high: bool) -> Result<(), HalError> {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| HalError::CommunicationError(format!("GPIO {}: {e:?}", self.number)))
    }
}

impl OutputLine for SysfsOutputLine {
    fn set_high(&mut self) -> Result<(), HalError> {
        self.drive(true)
    }

    fn set_low(&mut self) -> Result<(), HalError> {
        self.drive(false)
    }
}
