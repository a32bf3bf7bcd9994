//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFailure {
    QueueFull,
    Disconnected,
}

impl DispatchFailure {
    pub fn message(self) -> &'static str {
        match self {
            DispatchFailure::QueueFull => "UI command queue is full; please retry",
            DispatchFailure::Disconnected => {
                "Backend command processor disconnected (possible startup/runtime failure)"
            }
        }
    }
}

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) -> Result<(), DispatchFailure> {
    let cmd_name = match &cmd {
        BackendCommand::Predict { .. } => "predict",
        BackendCommand::Probe => "probe",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => {
            *status = DispatchFailure::QueueFull.message().to_string();
            Err(DispatchFailure::QueueFull)
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = DispatchFailure::Disconnected.message().to_string();
            Err(DispatchFailure::Disconnected)
        }
    }
}
