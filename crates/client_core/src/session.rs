//! Submit lifecycle for one form session.
//!
//! `SessionController` is the only owner of session state. Every transition is
//! a plain method so the lifecycle can be driven without a UI:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──resolve──▶ Resolved(outcome)
//!   ▲ edit            edit                   │ edit, submit ──▶ Submitting
//! ```

use shared::{
    domain::{ParameterKey, ParameterSet, SubmissionId},
    error::ParameterError,
    protocol::PredictionOutcome,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{store::ParameterStore, PredictionService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Submitting { submission: SubmissionId },
    Resolved(PredictionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("submission {0} is still in flight")]
    AlreadySubmitting(SubmissionId),
}

/// Snapshot handed to the prediction client for one accepted submit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSubmission {
    pub id: SubmissionId,
    pub snapshot: ParameterSet,
}

/// Blocking prompt shown after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub message: &'static str,
}

pub const CONNECTION_ERROR: Notification = Notification {
    title: "Connection error",
    message: "Could not reach the prediction server. Check your connection and try again.",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

pub const POTABLE_COLOR: Rgb = Rgb::from_hex(0x4CAF50);
pub const NOT_POTABLE_COLOR: Rgb = Rgb::from_hex(0xFF5722);
pub const ERROR_COLOR: Rgb = Rgb::from_hex(0xFF9800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomePresentation {
    pub headline: &'static str,
    pub description: Option<&'static str>,
    pub color: Rgb,
}

impl OutcomePresentation {
    pub fn for_outcome(outcome: &PredictionOutcome) -> Self {
        match outcome {
            PredictionOutcome::Potable => Self {
                headline: "Potable water",
                description: Some("The water meets potability standards"),
                color: POTABLE_COLOR,
            },
            PredictionOutcome::NotPotable => Self {
                headline: "Non-potable water",
                description: Some("The water does not meet potability standards"),
                color: NOT_POTABLE_COLOR,
            },
            PredictionOutcome::InvalidResponse { .. } | PredictionOutcome::TransportError { .. } => {
                Self {
                    headline: "Prediction error",
                    description: None,
                    color: ERROR_COLOR,
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct SessionController {
    store: ParameterStore,
    phase: SessionPhase,
    next_submission: u64,
    notification: Option<Notification>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        let mut store = ParameterStore::new();
        store.reset();
        Self {
            store,
            phase: SessionPhase::Idle,
            next_submission: 1,
            notification: None,
        }
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitting { .. })
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        match self.phase {
            SessionPhase::Submitting { submission } => Some(submission),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&PredictionOutcome> {
        match &self.phase {
            SessionPhase::Resolved(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn presentation(&self) -> Option<OutcomePresentation> {
        self.outcome().map(OutcomePresentation::for_outcome)
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn acknowledge_notification(&mut self) {
        self.notification = None;
    }

    /// Edits one parameter. Allowed in every phase; an in-flight request keeps
    /// its own snapshot.
    pub fn edit(&mut self, key: ParameterKey, value: f64) -> Result<f64, ParameterError> {
        self.store.update(key, value)
    }

    /// Starts a submission. Rejected while another one is in flight.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitRejected> {
        if let SessionPhase::Submitting { submission } = self.phase {
            warn!(submission = submission.0, "ignoring submit while a request is in flight");
            return Err(SubmitRejected::AlreadySubmitting(submission));
        }

        let id = SubmissionId(self.next_submission);
        self.next_submission += 1;
        self.phase = SessionPhase::Submitting { submission: id };
        self.notification = None;
        info!(submission = id.0, "submitting parameters for prediction");

        Ok(PendingSubmission {
            id,
            snapshot: self.store.snapshot(),
        })
    }

    /// Records the outcome of the in-flight submission. Returns `false` and
    /// changes nothing when `submission` is not the one in flight.
    pub fn resolve(&mut self, submission: SubmissionId, outcome: PredictionOutcome) -> bool {
        if self.in_flight() != Some(submission) {
            warn!(submission = submission.0, "dropping stale prediction outcome");
            return false;
        }

        match &outcome {
            PredictionOutcome::Potable | PredictionOutcome::NotPotable => {
                info!(submission = submission.0, score = ?outcome.score(), "submission resolved");
            }
            PredictionOutcome::InvalidResponse { reason }
            | PredictionOutcome::TransportError { reason } => {
                warn!(submission = submission.0, "submission failed: {reason}");
            }
        }

        if outcome.raises_notification() {
            self.notification = Some(CONNECTION_ERROR);
        }
        self.phase = SessionPhase::Resolved(outcome);
        true
    }

    /// Runs a whole submission against `service`: begin, predict, resolve.
    pub async fn submit_with<S>(&mut self, service: &S) -> Result<PredictionOutcome, SubmitRejected>
    where
        S: PredictionService + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = service.predict(&pending.snapshot).await;
        self.resolve(pending.id, outcome.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn transport_error() -> PredictionOutcome {
        PredictionOutcome::TransportError {
            reason: "prediction service returned HTTP 500 Internal Server Error".into(),
        }
    }

    #[test]
    fn submit_then_resolve_moves_through_phases() {
        let mut session = SessionController::new();
        assert_eq!(session.phase(), &SessionPhase::Idle);

        let pending = session.begin_submit().expect("submit");
        assert!(session.is_submitting());
        assert_eq!(session.outcome(), None);
        assert_eq!(pending.snapshot, ParameterSet::defaults());

        assert!(session.resolve(pending.id, PredictionOutcome::Potable));
        assert!(!session.is_submitting());
        assert_eq!(session.outcome(), Some(&PredictionOutcome::Potable));
        assert_eq!(session.notification(), None);
    }

    #[test]
    fn double_submit_is_rejected_while_in_flight() {
        let mut session = SessionController::new();
        let pending = session.begin_submit().expect("first submit");
        assert_eq!(
            session.begin_submit(),
            Err(SubmitRejected::AlreadySubmitting(pending.id))
        );
        assert_eq!(session.in_flight(), Some(pending.id));
    }

    #[test]
    fn edits_during_submission_do_not_touch_snapshot() {
        let mut session = SessionController::new();
        let pending = session.begin_submit().expect("submit");
        session.edit(ParameterKey::Ph, 3.2).expect("edit");
        assert_eq!(pending.snapshot.get(ParameterKey::Ph), 7.0);
        assert_eq!(session.store().get(ParameterKey::Ph), 3.2);
    }

    #[test]
    fn result_stays_visible_after_edits_and_clears_on_resubmit() {
        let mut session = SessionController::new();
        let first = session.begin_submit().expect("submit");
        session.resolve(first.id, PredictionOutcome::NotPotable);

        session.edit(ParameterKey::Turbidity, 1.0).expect("edit");
        assert_eq!(session.outcome(), Some(&PredictionOutcome::NotPotable));

        let second = session.begin_submit().expect("resubmit");
        assert_ne!(first.id, second.id);
        assert_eq!(session.outcome(), None);
        assert_eq!(second.snapshot.get(ParameterKey::Turbidity), 1.0);
    }

    #[test]
    fn stale_resolution_is_ignored() {
        let mut session = SessionController::new();
        let first = session.begin_submit().expect("submit");
        session.resolve(first.id, PredictionOutcome::Potable);
        let second = session.begin_submit().expect("resubmit");

        assert!(!session.resolve(first.id, PredictionOutcome::NotPotable));
        assert_eq!(session.in_flight(), Some(second.id));
        assert!(!session.resolve(SubmissionId(99), PredictionOutcome::Potable));
    }

    #[test]
    fn transport_error_raises_notification_but_invalid_response_does_not() {
        let mut session = SessionController::new();
        let pending = session.begin_submit().expect("submit");
        session.resolve(pending.id, transport_error());
        assert_eq!(session.notification(), Some(&CONNECTION_ERROR));
        assert_eq!(
            session.presentation().map(|p| p.color),
            Some(ERROR_COLOR)
        );

        session.acknowledge_notification();
        assert_eq!(session.notification(), None);

        let pending = session.begin_submit().expect("retry");
        session.resolve(
            pending.id,
            PredictionOutcome::InvalidResponse {
                reason: "response is missing the potability field".into(),
            },
        );
        assert_eq!(session.notification(), None);
        assert_eq!(
            session.presentation(),
            Some(OutcomePresentation {
                headline: "Prediction error",
                description: None,
                color: ERROR_COLOR,
            })
        );
    }

    #[test]
    fn new_submit_clears_pending_notification() {
        let mut session = SessionController::new();
        let pending = session.begin_submit().expect("submit");
        session.resolve(pending.id, transport_error());
        session.begin_submit().expect("retry");
        assert_eq!(session.notification(), None);
    }

    #[test]
    fn presentation_maps_scores_to_colors() {
        assert_eq!(
            OutcomePresentation::for_outcome(&PredictionOutcome::Potable).color,
            Rgb(0x4C, 0xAF, 0x50)
        );
        assert_eq!(
            OutcomePresentation::for_outcome(&PredictionOutcome::NotPotable).color,
            Rgb(0xFF, 0x57, 0x22)
        );
    }

    #[derive(Debug, Clone)]
    enum Step {
        Edit(usize, f64),
        Submit,
        ResolveInFlight(u8),
        ResolveStale,
        Acknowledge,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0usize..9, -1.0e5f64..1.0e5).prop_map(|(i, v)| Step::Edit(i, v)),
            Just(Step::Submit),
            (0u8..4).prop_map(Step::ResolveInFlight),
            Just(Step::ResolveStale),
            Just(Step::Acknowledge),
        ]
    }

    fn outcome_for(kind: u8) -> PredictionOutcome {
        match kind {
            0 => PredictionOutcome::Potable,
            1 => PredictionOutcome::NotPotable,
            2 => PredictionOutcome::InvalidResponse {
                reason: "bad shape".into(),
            },
            _ => transport_error(),
        }
    }

    proptest! {
        #[test]
        fn submitting_and_outcome_are_mutually_exclusive(
            steps in proptest::collection::vec(step(), 1..80),
        ) {
            let mut session = SessionController::new();
            for step in steps {
                match step {
                    Step::Edit(index, value) => {
                        let _ = session.edit(ParameterKey::ALL[index], value);
                    }
                    Step::Submit => {
                        let was_submitting = session.is_submitting();
                        prop_assert_eq!(session.begin_submit().is_err(), was_submitting);
                    }
                    Step::ResolveInFlight(kind) => {
                        if let Some(id) = session.in_flight() {
                            prop_assert!(session.resolve(id, outcome_for(kind)));
                        }
                    }
                    Step::ResolveStale => {
                        let before = session.phase().clone();
                        prop_assert!(!session.resolve(SubmissionId(0), PredictionOutcome::Potable));
                        prop_assert_eq!(session.phase(), &before);
                    }
                    Step::Acknowledge => session.acknowledge_notification(),
                }
                prop_assert!(!(session.is_submitting() && session.outcome().is_some()));
                if session.notification().is_some() {
                    let after_transport_error = matches!(
                        session.outcome(),
                        Some(PredictionOutcome::TransportError { .. })
                    );
                    prop_assert!(after_transport_error);
                }
            }
        }
    }
}
