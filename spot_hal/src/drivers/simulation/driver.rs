//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements `PwmDriver` on top of a [`SimRig`]. Its
//! boards enforce the same rules as the hardware: no writes while closed,
//! 16 channels, and no pulse at or beyond the PWM period.

use super::rig::{PulseWrite, SimRig};
use spot_common::config::BoardConfig;
use spot_common::consts::CHANNELS_PER_BOARD;
use spot_common::hal::driver::{HalError, OutputLine, PwmBoard, PwmDriver};
use spot_common::hal::BoardIndex;
use tracing::{debug, trace, warn};

/// Simulation driver implementing the PwmDriver trait.
pub struct SimulationDriver {
    rig: SimRig,
}

impl SimulationDriver {
    /// Create a driver with a private rig.
    pub fn new() -> Self {
        Self::with_rig(SimRig::new())
    }

    /// Create a driver on a shared rig.
    pub fn with_rig(rig: SimRig) -> Self {
        Self { rig }
    }

    /// Handle onto the driver's rig.
    pub fn rig(&self) -> &SimRig {
        &self.rig
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PwmDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn open(
        &self,
        board: BoardIndex,
        config: &BoardConfig,
    ) -> Result<Box<dyn PwmBoard>, HalError> {
        if config.frequency == 0 {
            return Err(HalError::OpenFailed {
                board,
                reason: "PWM frequency must be greater than 0".to_string(),
            });
        }
        if !self.rig.try_open(board) {
            warn!(%board, address = config.address, "simulated board does not respond");
            return Err(HalError::OpenFailed {
                board,
                reason: format!("no device at address {:#04x}", config.address),
            });
        }

        debug!(
            %board,
            address = config.address,
            frequency = config.frequency,
            "Simulated board opened"
        );
        Ok(Box::new(SimBoard {
            index: board,
            rig: self.rig.clone(),
            period_us: 1_000_000 / config.frequency,
            open: true,
        }))
    }
}

/// A simulated board handle.
pub struct SimBoard {
    index: BoardIndex,
    rig: SimRig,
    period_us: u32,
    open: bool,
}

impl PwmBoard for SimBoard {
    fn index(&self) -> BoardIndex {
        self.index
    }

    fn set_channel_pulse(&mut self, channel: u8, pulse_us: u16) -> Result<(), HalError> {
        if !self.open {
            return Err(HalError::BoardClosed(self.index));
        }
        if channel >= CHANNELS_PER_BOARD {
            return Err(HalError::InvalidChannel(channel));
        }
        if u32::from(pulse_us) >= self.period_us || self.rig.is_rejected(self.index, channel) {
            return Err(HalError::PulseOutOfRange { channel, pulse_us });
        }

        trace!(board = %self.index, channel, pulse_us, "pulse");
        self.rig.record(PulseWrite {
            board: self.index,
            channel,
            pulse_us,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), HalError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        if self.rig.try_close(self.index) {
            debug!(board = %self.index, "Simulated board closed");
            Ok(())
        } else {
            Err(HalError::CommunicationError(format!(
                "{} did not acknowledge sleep",
                self.index
            )))
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Simulated servo-enable line.
pub struct SimOutputLine {
    rig: SimRig,
}

impl SimOutputLine {
    /// Create a line on a shared rig.
    pub fn new(rig: SimRig) -> Self {
        Self { rig }
    }
}

impl OutputLine for SimOutputLine {
    fn set_high(&mut self) -> Result<(), HalError> {
        self.rig.drive_line(true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), HalError> {
        self.rig.drive_line(false);
        Ok(())
    }
}
