//! Motion controller errors.
//!
//! `MotionError` ends the controller loop. `WriteError` is per joint and per
//! cycle: it is collected into a [`WriteReport`] and logged, never propagated.

use spot_common::config::ConfigError;
use spot_common::hal::{BoardIndex, HalError};
use spot_common::joint::JointId;
use thiserror::Error;
use tracing::warn;

/// Fatal controller errors.
#[derive(Debug, Error)]
pub enum MotionError {
    /// Missing or malformed joint/board configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A mandatory board could not be brought up.
    #[error("{board} unavailable: {source}")]
    Hardware {
        board: BoardIndex,
        #[source]
        source: HalError,
    },

    /// Every sender of the motion channel is gone.
    #[error("motion command channel disconnected")]
    Disconnected,
}

/// Failure to push one joint's angle to its servo.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    /// The joint has no channel binding (its board is not open).
    #[error("{0} is not bound to a servo channel")]
    NotBound(JointId),

    /// The owning board was closed.
    #[error("{joint}: {board} is closed")]
    BoardClosed { joint: JointId, board: BoardIndex },

    /// The angle maps to a pulse the servo or board cannot produce.
    #[error("{joint}: {angle}° cannot be reached")]
    OutOfRange { joint: JointId, angle: f32 },

    /// Bus or device failure.
    #[error("{joint}: {source}")]
    Hardware {
        joint: JointId,
        #[source]
        source: HalError,
    },
}

impl WriteError {
    /// Joint the write was for.
    pub fn joint(&self) -> JointId {
        match self {
            Self::NotBound(joint)
            | Self::BoardClosed { joint, .. }
            | Self::OutOfRange { joint, .. }
            | Self::Hardware { joint, .. } => *joint,
        }
    }
}

/// Outcome of a batch of joint writes.
#[derive(Debug, Default)]
pub struct WriteReport {
    written: Vec<JointId>,
    failures: Vec<WriteError>,
}

impl WriteReport {
    /// Record one write result.
    pub fn record(&mut self, joint: JointId, result: Result<(), WriteError>) {
        match result {
            Ok(()) => self.written.push(joint),
            Err(e) => self.failures.push(e),
        }
    }

    /// Append another report.
    pub fn merge(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.failures.extend(other.failures);
    }

    /// Joints written successfully, in write order.
    pub fn written(&self) -> &[JointId] {
        &self.written
    }

    /// Failed writes, in write order.
    pub fn failures(&self) -> &[WriteError] {
        &self.failures
    }

    /// True if every write succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Log all failures as one warning.
    pub fn log(&self) {
        if self.is_clean() {
            return;
        }
        let details: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        warn!(
            failed = self.failures.len(),
            written = self.written.len(),
            details = %details.join("; "),
            "Likely a servo could not reach the assigned position"
        );
    }
}
