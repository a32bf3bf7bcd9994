use thiserror::Error;

use crate::domain::ParameterKey;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("rejected NaN value for parameter {key}")]
    NotANumber { key: ParameterKey },
}

/// Why a successful HTTP response could not be read as a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseShapeError {
    #[error("response body is not JSON: {0}")]
    NotJson(String),
    #[error("response body is not a JSON object")]
    NotAnObject,
    #[error("response is missing the potability field")]
    MissingPotability,
    #[error("potability is not numeric: {0}")]
    NonNumericPotability(String),
    #[error("potability score {0} is neither 0 nor 1")]
    ScoreOutOfRange(f64),
}
