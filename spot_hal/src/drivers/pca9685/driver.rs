//! PCA9685 driver over Linux I2C.

use super::timing::{prescale, pulse_ticks};
use linux_embedded_hal::I2cdev;
use pwm_pca9685::{Channel, OutputDriver, Pca9685};
use spot_common::config::BoardConfig;
use spot_common::consts::CHANNELS_PER_BOARD;
use spot_common::hal::BoardIndex;
use spot_common::hal::driver::{HalError, PwmBoard, PwmDriver};
use std::fmt::Debug;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// I2C bus of the Raspberry Pi header.
const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Factory function to create a PCA9685 driver on the default bus.
pub fn create_driver() -> Box<dyn PwmDriver> {
    Box::new(Pca9685Driver::new())
}

/// Opens PCA9685 boards on one I2C bus.
pub struct Pca9685Driver {
    bus: PathBuf,
}

impl Pca9685Driver {
    /// Driver on `/dev/i2c-1`.
    pub fn new() -> Self {
        Self::with_bus(DEFAULT_I2C_BUS)
    }

    /// Driver on another bus device.
    pub fn with_bus(bus: impl Into<PathBuf>) -> Self {
        Self { bus: bus.into() }
    }
}

impl Default for Pca9685Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmDriver for Pca9685Driver {
    fn name(&self) -> &'static str {
        "pca9685"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn open(
        &self,
        board: BoardIndex,
        config: &BoardConfig,
    ) -> Result<Box<dyn PwmBoard>, HalError> {
        let open_failed = |reason: String| HalError::OpenFailed { board, reason };

        let address = u8::try_from(config.address)
            .ok()
            .filter(|a| *a < 0x80)
            .ok_or_else(|| open_failed(format!("invalid I2C address {:#x}", config.address)))?;
        let prescale = prescale(config.reference_clock_speed, config.frequency).ok_or_else(|| {
            open_failed(format!(
                "{} Hz not reachable from a {} Hz oscillator",
                config.frequency, config.reference_clock_speed
            ))
        })?;

        let bus = I2cdev::new(&self.bus)
            .map_err(|e| open_failed(format!("{}: {e:?}", self.bus.display())))?;
        let mut pwm = Pca9685::new(bus, address).map_err(|e| open_failed(format!("{e:?}")))?;
        pwm.set_output_driver(OutputDriver::TotemPole)
            .and_then(|()| pwm.set_prescale(prescale))
            .and_then(|()| pwm.enable())
            .map_err(|e| open_failed(format!("{e:?}")))?;

        let handle = Pca9685Board {
            index: board,
            pwm,
            frequency: config.frequency,
            open: true,
        };

        info!(
            %board,
            address = format_args!("{address:#04x}"),
            frequency = config.frequency,
            prescale,
            "PCA9685 initialized"
        );
        Ok(Box::new(handle))
    }
}

/// One initialized PCA9685.
pub struct Pca9685Board {
    index: BoardIndex,
    pwm: Pca9685<I2cdev>,
    frequency: u32,
    open: bool,
}

impl Pca9685Board {
    fn bus_error(&self, e: impl Debug) -> HalError {
        HalError::CommunicationError(format!("{}: {e:?}", self.index))
    }
}

/// Counter channel for an output number.
fn channel_for(channel: u8) -> Option<Channel> {
    Some(match channel {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    })
}

impl PwmBoard for Pca9685Board {
    fn index(&self) -> BoardIndex {
        self.index
    }

    fn set_channel_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<(), HalError> {
        if !self.open {
            return Err(HalError::BoardClosed(self.index));
        }
        let output = channel_for(channel)
            .filter(|_| channel < CHANNELS_PER_BOARD)
            .ok_or(HalError::InvalidChannel(channel))?;
        let off = pulse_ticks(pulse_us, self.frequency)
            .ok_or(HalError::PulseOutOfRange { channel, pulse_us })?;
        self.pwm
            .set_channel_on_off(output, 0, off)
            .map_err(|e| self.bus_error(e))
    }

    fn close(&mut self) -> Result<(), HalError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let outputs = self.pwm.set_channel_full_off(Channel::All);
        let sleep = self.pwm.disable();
        match outputs.and(sleep).map_err(|e| self.bus_error(e)) {
            Ok(()) => {
                debug!(board = %self.index, "PCA9685 outputs off, oscillator asleep");
                Ok(())
            }
            Err(e) => {
                warn!(board = %self.index, error = %e, "PCA9685 did not shut down cleanly");
                Err(e)
            }
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
