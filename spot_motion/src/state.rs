//! Activation state machine.
//!
//! DEACTIVATED ⇄ ACTIVATED, driven by the start button, the idle timeout and
//! shutdown. The machine only decides; the controller performs the board
//! and servo side effects around each transition.

/// Whether the servos are powered and driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    #[default]
    Deactivated,
    Activated,
}

/// Result of an activation transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition succeeded, new state.
    Ok(ActivationState),
    /// Transition rejected, with the reason.
    Rejected(&'static str),
}

/// Event that can trigger an activation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationEvent {
    /// Rising edge of the start button.
    StartPressed,
    /// No input for the inactivity timeout.
    IdleTimeout,
    /// Process is stopping.
    Shutdown,
}

/// Holds the current activation state.
#[derive(Debug, Clone, Default)]
pub struct ActivationStateMachine {
    state: ActivationState,
}

impl ActivationStateMachine {
    /// Create a new state machine in Deactivated state.
    pub const fn new() -> Self {
        Self {
            state: ActivationState::Deactivated,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> ActivationState {
        self.state
    }

    /// Whether servo writes are allowed.
    #[inline]
    pub const fn is_activated(&self) -> bool {
        matches!(self.state, ActivationState::Activated)
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: ActivationEvent) -> TransitionResult {
        use ActivationEvent::*;
        use ActivationState::*;

        let next = match (self.state, event) {
            (Deactivated, StartPressed) => Activated,
            (Activated, StartPressed) => Deactivated,
            (Activated, IdleTimeout) => Deactivated,
            (Activated, Shutdown) => Deactivated,
            (Deactivated, IdleTimeout) => return TransitionResult::Rejected("already deactivated"),
            (Deactivated, Shutdown) => return TransitionResult::Rejected("already deactivated"),
        };

        self.state = next;
        TransitionResult::Ok(next)
    }

    /// Force Deactivated, e.g. after a failed activation.
    #[inline]
    pub fn force_deactivated(&mut self) {
        self.state = ActivationState::Deactivated;
    }
}

/// Rising-edge detector for the start button.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartButton {
    previous: bool,
}

impl StartButton {
    /// Feed the button level from one event. True on a press, false while
    /// held or released.
    pub fn pressed(&mut self, level: bool) -> bool {
        let edge = level && !self.previous;
        self.previous = level;
        edge
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
