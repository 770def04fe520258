//! Shared simulation state.
//!
//! A `SimRig` is a cheap handle onto one simulated robot. Every board the
//! driver opens and every output line shares it, so a test can keep a clone
//! to inspect writes and inject faults while the controller owns the boards.
//!
//! Write and line histories are bounded rings so a long session on the
//! simulation driver runs in constant memory. The last pulse per channel is
//! kept separately and never evicted.

use parking_lot::Mutex;
use spot_common::hal::BoardIndex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// One recorded `set_channel_pulse` call that reached the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWrite {
    /// Board written to
    pub board: BoardIndex,
    /// Channel on that board
    pub channel: u8,
    /// Pulse width [µs]
    pub pulse_us: u16,
}

#[derive(Debug, Default)]
struct BoardSlot {
    open: bool,
    opens: u32,
    close_attempts: u32,
    fail_open: bool,
    fail_close: bool,
}

/// Entries kept in each history ring unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

#[derive(Debug)]
struct RigState {
    boards: [BoardSlot; 2],
    writes: VecDeque<PulseWrite>,
    pulses: HashMap<(BoardIndex, u8), u16>,
    rejected: HashSet<(BoardIndex, u8)>,
    line: Option<bool>,
    line_history: VecDeque<bool>,
    history_limit: usize,
}

impl RigState {
    fn with_history_limit(history_limit: usize) -> Self {
        Self {
            boards: Default::default(),
            writes: VecDeque::new(),
            pulses: HashMap::new(),
            rejected: HashSet::new(),
            line: None,
            line_history: VecDeque::new(),
            history_limit,
        }
    }
}

impl Default for RigState {
    fn default() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }
}

fn push_bounded<T>(ring: &mut VecDeque<T>, limit: usize, item: T) {
    if limit == 0 {
        return;
    }
    while ring.len() >= limit {
        ring.pop_front();
    }
    ring.push_back(item);
}

/// Handle onto a simulated robot.
#[derive(Debug, Clone, Default)]
pub struct SimRig {
    inner: Arc<Mutex<RigState>>,
}

impl SimRig {
    /// Create a rig with both boards closed and no faults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rig keeping at most `limit` writes and line levels.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RigState::with_history_limit(limit))),
        }
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Recorded writes in order, oldest dropped past the history limit.
    pub fn writes(&self) -> Vec<PulseWrite> {
        self.inner.lock().writes.iter().copied().collect()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.inner.lock().writes.clear();
    }

    /// Most recent pulse written to a channel.
    pub fn last_pulse(&self, board: BoardIndex, channel: u8) -> Option<u16> {
        self.inner.lock().pulses.get(&(board, channel)).copied()
    }

    /// Whether a board is currently open.
    pub fn is_open(&self, board: BoardIndex) -> bool {
        self.inner.lock().boards[board.slot()].open
    }

    /// Whether any board is open.
    pub fn any_open(&self) -> bool {
        self.inner.lock().boards.iter().any(|b| b.open)
    }

    /// Successful opens of a board.
    pub fn open_count(&self, board: BoardIndex) -> u32 {
        self.inner.lock().boards[board.slot()].opens
    }

    /// Close attempts on a board, failed ones included.
    pub fn close_attempts(&self, board: BoardIndex) -> u32 {
        self.inner.lock().boards[board.slot()].close_attempts
    }

    /// Current servo-enable line level, `None` before the first write.
    pub fn line(&self) -> Option<bool> {
        self.inner.lock().line
    }

    /// Levels driven onto the servo-enable line, in order.
    pub fn line_history(&self) -> Vec<bool> {
        self.inner.lock().line_history.iter().copied().collect()
    }

    // ─── Fault injection ────────────────────────────────────────────

    /// Make the next opens of `board` fail (or succeed again).
    pub fn fail_open(&self, board: BoardIndex, fail: bool) {
        self.inner.lock().boards[board.slot()].fail_open = fail;
    }

    /// Make closes of `board` fail (or succeed again).
    pub fn fail_close(&self, board: BoardIndex, fail: bool) {
        self.inner.lock().boards[board.slot()].fail_close = fail;
    }

    /// Reject every pulse written to one channel.
    pub fn reject_channel(&self, board: BoardIndex, channel: u8) {
        self.inner.lock().rejected.insert((board, channel));
    }

    /// Accept writes on every channel again.
    pub fn accept_all_channels(&self) {
        self.inner.lock().rejected.clear();
    }

    // ─── Driver side ────────────────────────────────────────────────

    pub(super) fn try_open(&self, board: BoardIndex) -> bool {
        let mut state = self.inner.lock();
        let slot = &mut state.boards[board.slot()];
        if slot.fail_open {
            return false;
        }
        slot.open = true;
        slot.opens += 1;
        true
    }

    pub(super) fn try_close(&self, board: BoardIndex) -> bool {
        let mut state = self.inner.lock();
        let slot = &mut state.boards[board.slot()];
        slot.close_attempts += 1;
        if slot.fail_close {
            return false;
        }
        slot.open = false;
        true
    }

    pub(super) fn is_rejected(&self, board: BoardIndex, channel: u8) -> bool {
        self.inner.lock().rejected.contains(&(board, channel))
    }

    pub(super) fn record(&self, write: PulseWrite) {
        let mut state = self.inner.lock();
        state.pulses.insert((write.board, write.channel), write.pulse_us);
        let limit = state.history_limit;
        push_bounded(&mut state.writes, limit, write);
    }

    pub(super) fn drive_line(&self, level: bool) {
        let mut state = self.inner.lock();
        state.line = Some(level);
        let limit = state.history_limit;
        push_bounded(&mut state.line_history, limit, level);
    }
}
