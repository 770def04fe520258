//! Board activation manager.
//!
//! Owns the PWM board handles. Boards are opened on activation, servo
//! channels are bound once the boards are up, and every angle write goes
//! through here. Board 1 is mandatory. Board 2 is optional and a failure to
//! open it only degrades the robot to single-board mode.

use crate::angles::JointAngles;
use crate::error::{MotionError, WriteError, WriteReport};
use crate::servo_map::{JointConfig, ServoMap};
use spot_common::config::BoardConfig;
use spot_common::hal::{BoardIndex, HalError, PwmBoard, PwmDriver};
use spot_common::joint::JointId;
use tracing::{debug, info, warn};

/// Lifecycle of the board set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardState {
    Inactive,
    Active,
}

/// Result of the start-up hardware probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// Board 1 opened and closed cleanly.
    pub board_1: bool,
    /// Board 2 opened and closed cleanly. False when not configured.
    pub board_2: bool,
}

/// Owns up to two open boards and the joint → channel bindings.
pub struct BoardManager {
    driver: Box<dyn PwmDriver>,
    configs: [Option<BoardConfig>; 2],
    boards: [Option<Box<dyn PwmBoard>>; 2],
    bindings: [Option<JointConfig>; JointId::COUNT],
}

impl BoardManager {
    /// Manager for the boards in `map`, opened through `driver`.
    pub fn new(driver: Box<dyn PwmDriver>, map: &ServoMap) -> Self {
        Self {
            driver,
            configs: BoardIndex::ALL.map(|idx| map.board(idx).cloned()),
            boards: [None, None],
            bindings: [None; JointId::COUNT],
        }
    }

    /// Name of the underlying driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BoardState {
        if self.boards.iter().any(Option::is_some) {
            BoardState::Active
        } else {
            BoardState::Inactive
        }
    }

    /// Whether at least one board is open.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state() == BoardState::Active
    }

    /// Number of open boards (0 when inactive).
    pub fn board_count(&self) -> usize {
        self.boards.iter().filter(|b| b.is_some()).count()
    }

    /// Whether one board is open.
    pub fn is_open(&self, index: BoardIndex) -> bool {
        self.boards[index.slot()].is_some()
    }

    /// Open, then close, every configured board to report hardware health.
    pub fn probe(&mut self) -> ProbeReport {
        let mut healthy = [false; 2];
        for idx in BoardIndex::ALL {
            let Some(config) = &self.configs[idx.slot()] else {
                continue;
            };
            healthy[idx.slot()] = match self.driver.open(idx, config) {
                Ok(mut board) => match board.close() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(board = %idx, error = %e, "Probe: board did not close");
                        false
                    }
                },
                Err(e) => {
                    warn!(board = %idx, error = %e, "Probe: board did not open");
                    false
                }
            };
        }
        ProbeReport {
            board_1: healthy[0],
            board_2: healthy[1],
        }
    }

    /// Open board 1, and board 2 if configured.
    ///
    /// Returns the number of open boards. Calling it while active is a no-op.
    ///
    /// # Errors
    ///
    /// `MotionError::Hardware` if board 1 cannot be opened. Board 2 failing
    /// is logged and leaves the manager in single-board mode.
    pub fn activate(&mut self) -> Result<usize, MotionError> {
        if self.is_active() {
            debug!("Boards already active");
            return Ok(self.board_count());
        }

        let Some(config) = &self.configs[BoardIndex::One.slot()] else {
            return Err(MotionError::Hardware {
                board: BoardIndex::One,
                source: HalError::OpenFailed {
                    board: BoardIndex::One,
                    reason: "not configured".to_string(),
                },
            });
        };
        let first = self
            .driver
            .open(BoardIndex::One, config)
            .map_err(|source| MotionError::Hardware {
                board: BoardIndex::One,
                source,
            })?;
        self.boards[BoardIndex::One.slot()] = Some(first);

        if let Some(config) = &self.configs[BoardIndex::Two.slot()] {
            match self.driver.open(BoardIndex::Two, config) {
                Ok(second) => self.boards[BoardIndex::Two.slot()] = Some(second),
                Err(e) => warn!(
                    error = %e,
                    "Second board unavailable, continuing with one board"
                ),
            }
        }

        let count = self.board_count();
        info!(boards = count, driver = self.driver.name(), "Boards activated");
        Ok(count)
    }

    /// Bind every joint whose board is open. Returns the number bound.
    ///
    /// Joints on a board that failed to open stay unbound and their writes
    /// report `WriteError::NotBound`.
    pub fn bind_servos(&mut self, map: &ServoMap) -> usize {
        let mut bound = 0;
        for (joint, config) in map.joints() {
            if self.is_open(config.board) {
                self.bindings[joint.index()] = Some(*config);
                bound += 1;
            } else {
                self.bindings[joint.index()] = None;
                debug!(%joint, board = %config.board, "Joint left unbound");
            }
        }
        debug!(bound, "Servo channels bound");
        bound
    }

    /// Close every open board, board 1 first.
    ///
    /// Every close is attempted even if an earlier one fails. Bindings are
    /// dropped. Returns the close errors, empty on a clean shutdown.
    pub fn deactivate(&mut self) -> Vec<HalError> {
        self.bindings = [None; JointId::COUNT];
        let mut errors = Vec::new();
        for idx in BoardIndex::ALL {
            let Some(mut board) = self.boards[idx.slot()].take() else {
                continue;
            };
            match board.close() {
                Ok(()) => debug!(board = %idx, "Board closed"),
                Err(e) => {
                    warn!(board = %idx, error = %e, "Board close failed");
                    errors.push(e);
                }
            }
        }
        if errors.is_empty() {
            info!("Boards deactivated");
        }
        errors
    }

    /// Push one joint's angle to its channel.
    pub fn write_channel(&mut self, joint: JointId, angle: f32) -> Result<(), WriteError> {
        let binding = self.bindings[joint.index()].ok_or(WriteError::NotBound(joint))?;
        let board = self.boards[binding.board.slot()]
            .as_mut()
            .filter(|b| b.is_open())
            .ok_or(WriteError::BoardClosed {
                joint,
                board: binding.board,
            })?;
        let pulse = binding
            .pulse_for_angle(angle)
            .ok_or(WriteError::OutOfRange { joint, angle })?;

        board
            .set_channel_pulse(binding.channel, pulse)
            .map_err(|e| match e {
                HalError::PulseOutOfRange { .. } | HalError::InvalidChannel(_) => {
                    WriteError::OutOfRange { joint, angle }
                }
                HalError::BoardClosed(board) => WriteError::BoardClosed { joint, board },
                source => WriteError::Hardware { joint, source },
            })
    }

    /// Push the listed joints. Joints without a target are skipped.
    pub fn push(&mut self, joints: &[JointId], angles: &JointAngles) -> WriteReport {
        let mut report = WriteReport::default();
        for &joint in joints {
            if let Some(angle) = angles.get(joint) {
                report.record(joint, self.write_channel(joint, angle));
            }
        }
        report
    }

    /// Push every driven joint. A failed write never stops the others.
    pub fn push_all(&mut self, angles: &JointAngles) -> WriteReport {
        let mut report = WriteReport::default();
        for (joint, angle) in angles.iter() {
            report.record(joint, self.write_channel(joint, angle));
        }
        report
    }
}

impl Drop for BoardManager {
    fn drop(&mut self) {
        if self.is_active() {
            warn!("Board manager dropped while active, closing boards");
            self.deactivate();
        }
    }
}
