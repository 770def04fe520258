//! Process edges: termination signals and startup config failures.

use spot_common::messages::{Component, MotionMessage, StatusMessage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use tracing::info;

/// Callback for SIGINT, SIGTERM and SIGHUP.
///
/// Stops the input reader and queues `Shutdown`, so the controller leaves
/// its loop through the same power-down path as every other exit. Runs on
/// the signal thread, where blocking on the one-slot channel is fine; the
/// send only fails once the controller is gone.
pub fn shutdown_handler(
    motion_tx: SyncSender<MotionMessage>,
    running: Arc<AtomicBool>,
) -> impl Fn() + Send + 'static {
    move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
        let _ = motion_tx.send(MotionMessage::Shutdown);
    }
}

/// Install [`shutdown_handler`] for the termination signals.
pub fn install_shutdown_handler(
    motion_tx: SyncSender<MotionMessage>,
    running: Arc<AtomicBool>,
) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(shutdown_handler(motion_tx, running))
}

/// Mark both motion controllers NOK after an unusable config.
pub fn report_config_failure(status_tx: &SyncSender<StatusMessage>) {
    for component in [Component::MotionController1, Component::MotionController2] {
        let _ = status_tx.try_send(StatusMessage::not_ok(component));
    }
}
