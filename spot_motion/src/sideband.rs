//! Sideband workers: abort coordinator and status display.
//!
//! Both run on their own named thread and consume one bounded channel each.
//! They stop when every sender of their channel is dropped.

use parking_lot::Mutex;
use spot_common::hal::OutputLine;
use spot_common::messages::{AbortCommand, Component, Health, StatusMessage};
use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, info_span, warn};

// ─── Abort coordinator ──────────────────────────────────────────────

/// Drives the servo-enable line from `activate_servos` / `abort` commands.
pub struct AbortCoordinator {
    line: Box<dyn OutputLine>,
    status_tx: SyncSender<StatusMessage>,
}

impl AbortCoordinator {
    pub fn new(line: Box<dyn OutputLine>, status_tx: SyncSender<StatusMessage>) -> Self {
        Self { line, status_tx }
    }

    /// Assert the line, then follow commands until the channel closes. The
    /// line is left low on exit.
    pub fn run(mut self, rx: Receiver<AbortCommand>) {
        let healthy = self.apply(AbortCommand::ActivateServos);
        self.report(healthy);
        info!("Abort controller started");

        for command in rx.iter() {
            debug!(%command, "Abort command");
            if !self.apply(command) {
                self.report(false);
            }
        }

        self.apply(AbortCommand::Abort);
        info!("Abort controller stopped");
    }

    fn apply(&mut self, command: AbortCommand) -> bool {
        let result = match command {
            AbortCommand::ActivateServos => self.line.set_high(),
            AbortCommand::Abort => self.line.set_low(),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(%command, error = %e, "Servo-enable line not driven");
                false
            }
        }
    }

    fn report(&self, healthy: bool) {
        let status = StatusMessage::new(Component::AbortController, healthy.into());
        if let Err(e) = self.status_tx.try_send(status) {
            debug!(error = %e, "Status not delivered");
        }
    }
}

// ─── Status display ─────────────────────────────────────────────────

/// Latest health per component, shared with whoever renders it.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<BTreeMap<Component, Health>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a report. Returns true if the component's health changed.
    pub fn update(&self, status: StatusMessage) -> bool {
        let previous = self.inner.lock().insert(status.component, status.health);
        previous != Some(status.health)
    }

    /// Last reported health, `None` if the component never reported.
    pub fn get(&self, component: Component) -> Option<Health> {
        self.inner.lock().get(&component).copied()
    }

    /// One line with every component, `-` for those not reported yet.
    pub fn summary(&self) -> String {
        let health = self.inner.lock();
        Component::ALL
            .iter()
            .map(|c| {
                let token = health.get(c).map_or("-", |h| h.token());
                format!("{}={token}", c.name())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Consumes status reports and logs the summary when it changes.
pub struct StatusDisplay {
    board: StatusBoard,
}

impl StatusDisplay {
    pub fn new(board: StatusBoard) -> Self {
        Self { board }
    }

    pub fn run(self, rx: Receiver<StatusMessage>) {
        for status in rx.iter() {
            if self.board.update(status) {
                info!(%status, summary = %self.board.summary(), "Status changed");
            }
        }
        debug!("Status display stopped");
    }
}

// ─── Threads ────────────────────────────────────────────────────────

/// Run the abort coordinator on the `abort_controller` thread.
pub fn spawn_abort_coordinator(
    coordinator: AbortCoordinator,
    rx: Receiver<AbortCommand>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("abort_controller".to_string())
        .spawn(move || info_span!("abort_controller").in_scope(|| coordinator.run(rx)))
}

/// Run the status display on the `status_display` thread.
pub fn spawn_status_display(
    display: StatusDisplay,
    rx: Receiver<StatusMessage>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("status_display".to_string())
        .spawn(move || info_span!("status_display").in_scope(|| display.run(rx)))
}
