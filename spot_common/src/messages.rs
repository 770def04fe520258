//! Inter-thread messages.
//!
//! The motion controller owns three channels: motion commands in, abort
//! commands out and status reports out. The sideband payloads keep the
//! plain-text tokens the display and the servo-enable line expect.

use crate::event::ControlEvent;
use std::fmt;

/// Message on the motion-command channel.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionMessage {
    /// New remote controller snapshot.
    Event(ControlEvent),
    /// Stop the controller loop.
    Shutdown,
}

impl From<ControlEvent> for MotionMessage {
    fn from(event: ControlEvent) -> Self {
        Self::Event(event)
    }
}

/// Command for the abort coordinator, which drives the servo-enable line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCommand {
    /// Assert servo power before the boards are opened.
    ActivateServos,
    /// Cut servo power.
    Abort,
}

impl AbortCommand {
    /// Wire token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::ActivateServos => "activate_servos",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for AbortCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Subsystem reported on the status channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// First PWM board.
    MotionController1,
    /// Second PWM board.
    MotionController2,
    /// Servo-enable line.
    AbortController,
    /// Remote controller input.
    RemoteController,
}

impl Component {
    /// All components, in display order.
    pub const ALL: [Component; 4] = [
        Self::MotionController1,
        Self::MotionController2,
        Self::AbortController,
        Self::RemoteController,
    ];

    /// Wire name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MotionController1 => "motion_controller_1",
            Self::MotionController2 => "motion_controller_2",
            Self::AbortController => "abort_controller",
            Self::RemoteController => "remote_controller_connected",
        }
    }
}

/// Health of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    NotOk,
}

impl Health {
    /// Wire token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "NOK",
        }
    }
}

impl From<bool> for Health {
    fn from(ok: bool) -> Self {
        if ok { Self::Ok } else { Self::NotOk }
    }
}

/// One status report, rendered as `"<component> <OK|NOK>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub component: Component,
    pub health: Health,
}

impl StatusMessage {
    pub const fn new(component: Component, health: Health) -> Self {
        Self { component, health }
    }

    pub const fn ok(component: Component) -> Self {
        Self::new(component, Health::Ok)
    }

    pub const fn not_ok(component: Component) -> Self {
        Self::new(component, Health::NotOk)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.component.name(), self.health.token())
    }
}
