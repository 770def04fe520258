//! Board identifiers.

use std::fmt;

/// One of the two PWM driver boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BoardIndex {
    /// Mandatory board (`pca9685_1`).
    One,
    /// Optional board (`pca9685_2`).
    Two,
}

impl BoardIndex {
    /// Both boards, in activation order.
    pub const ALL: [BoardIndex; 2] = [Self::One, Self::Two];

    /// Board from its 1-based configuration number.
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// 1-based configuration number.
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// 0-based slot in per-board tables.
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BoardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pca9685_{}", self.number())
    }
}
