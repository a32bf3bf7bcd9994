//! Backend commands queued from UI to backend worker.

use shared::domain::{ParameterSet, SubmissionId};

pub enum BackendCommand {
    Predict {
        submission: SubmissionId,
        snapshot: ParameterSet,
    },
    Probe,
}
