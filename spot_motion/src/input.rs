//! Control input source.
//!
//! Reads newline-delimited JSON `ControlEvent` records, as emitted by the
//! gamepad decoder, and forwards them onto the motion channel.

use spot_common::event::ControlEvent;
use spot_common::messages::{Component, MotionMessage, StatusMessage};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, info_span, warn};

/// Forward every well-formed event from `reader` until EOF, a read error,
/// `running` going false, or the motion channel closing.
///
/// Sends block: the motion channel holds one message, so the reader is
/// paced by the controller. Returns the number of events forwarded.
pub fn forward_events<R: BufRead>(
    reader: R,
    motion_tx: &SyncSender<MotionMessage>,
    status_tx: &SyncSender<StatusMessage>,
    running: &AtomicBool,
) -> usize {
    let _ = status_tx.try_send(StatusMessage::ok(Component::RemoteController));
    info!("Remote controller connected");

    let mut forwarded = 0;
    for (lineno, line) in reader.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Input read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event = match ControlEvent::from_json(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = lineno + 1, error = %e, "Skipping malformed event");
                continue;
            }
        };
        if motion_tx.send(MotionMessage::Event(event)).is_err() {
            debug!("Motion channel closed");
            break;
        }
        forwarded += 1;
    }

    let _ = status_tx.try_send(StatusMessage::not_ok(Component::RemoteController));
    info!(forwarded, "Remote controller disconnected");
    forwarded
}

/// Read events from stdin on the `remote_controller` thread.
pub fn spawn_stdin_reader(
    motion_tx: SyncSender<MotionMessage>,
    status_tx: SyncSender<StatusMessage>,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<usize>> {
    thread::Builder::new()
        .name("remote_controller".to_string())
        .spawn(move || {
            info_span!("remote_controller").in_scope(|| {
                forward_events(io::stdin().lock(), &motion_tx, &status_tx, &running)
            })
        })
}
