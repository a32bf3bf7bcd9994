//! Backend-to-UI events and error modeling for the desktop controller.

use shared::{domain::SubmissionId, protocol::PredictionOutcome};

pub enum UiEvent {
    Info(String),
    PredictionResolved {
        submission: SubmissionId,
        outcome: PredictionOutcome,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Prediction,
    Probe,
}

pub fn classify_startup_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("failed to build backend runtime") {
        "Backend worker startup failure; restart the app and retry.".to_string()
    } else if lower.contains("failed to build prediction client") {
        "Could not initialize the HTTP client; check TLS/system configuration.".to_string()
    } else {
        format!("Startup error: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("not json")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("reach")
            || message_lower.contains("http")
            || message_lower.contains("dns")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unreachable_service_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::Probe,
            "failed to reach prediction service: error sending request",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(err.context(), UiErrorContext::Probe);
    }

    #[test]
    fn classifies_bad_payload_as_validation() {
        let err = UiError::from_message(
            UiErrorContext::Probe,
            "invalid prediction response: response body is not JSON: expected value",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err_label(err.category()), "Validation");
    }

    #[test]
    fn startup_failures_get_actionable_text() {
        assert_eq!(
            classify_startup_failure("failed to build backend runtime: os error 24"),
            "Backend worker startup failure; restart the app and retry."
        );
        assert!(classify_startup_failure("something else").starts_with("Startup error:"));
    }
}
