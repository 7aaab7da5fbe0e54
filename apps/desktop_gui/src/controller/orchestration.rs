//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues a command for the backend worker. Failures come back as a
/// user-facing message rather than a panic; the worker thread owns
/// the only receiver, so a disconnect means it died at startup.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), String> {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err("command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => {
            Err("backend worker unavailable; restart the application".to_string())
        }
    }
}
