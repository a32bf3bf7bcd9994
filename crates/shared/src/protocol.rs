use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{ParameterKey, ParameterSet},
    error::ResponseShapeError,
};

/// JSON body of `POST /predict`. Exactly the nine canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub ph: f64,
    pub hardness: f64,
    pub solids: f64,
    pub chloramines: f64,
    pub sulfate: f64,
    pub conductivity: f64,
    pub organic_carbon: f64,
    pub trihalomethanes: f64,
    pub turbidity: f64,
}

impl From<&ParameterSet> for PredictRequest {
    fn from(set: &ParameterSet) -> Self {
        Self {
            ph: set.get(ParameterKey::Ph),
            hardness: set.get(ParameterKey::Hardness),
            solids: set.get(ParameterKey::Solids),
            chloramines: set.get(ParameterKey::Chloramines),
            sulfate: set.get(ParameterKey::Sulfate),
            conductivity: set.get(ParameterKey::Conductivity),
            organic_carbon: set.get(ParameterKey::OrganicCarbon),
            trihalomethanes: set.get(ParameterKey::Trihalomethanes),
            turbidity: set.get(ParameterKey::Turbidity),
        }
    }
}

/// Body of `GET /` on the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBanner {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Potability {
    NotPotable,
    Potable,
}

impl Potability {
    pub fn from_score(score: f64) -> Option<Self> {
        if score == 1.0 {
            Some(Self::Potable)
        } else if score == 0.0 {
            Some(Self::NotPotable)
        } else {
            None
        }
    }

    pub fn score(self) -> u8 {
        match self {
            Self::NotPotable => 0,
            Self::Potable => 1,
        }
    }
}

/// Reads the `potability` score out of a prediction response body.
pub fn parse_prediction_body(body: &[u8]) -> Result<Potability, ResponseShapeError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| ResponseShapeError::NotJson(err.to_string()))?;
    let object = value.as_object().ok_or(ResponseShapeError::NotAnObject)?;
    let score = object
        .get("potability")
        .ok_or(ResponseShapeError::MissingPotability)?;
    let score = score
        .as_f64()
        .ok_or_else(|| ResponseShapeError::NonNumericPotability(score.to_string()))?;
    Potability::from_score(score).ok_or(ResponseShapeError::ScoreOutOfRange(score))
}

/// Classified result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionOutcome {
    Potable,
    NotPotable,
    /// The service answered, but not with a usable `potability` score.
    InvalidResponse { reason: String },
    /// The request never produced a successful response.
    TransportError { reason: String },
}

impl PredictionOutcome {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidResponse { .. } | Self::TransportError { .. }
        )
    }

    /// Only transport failures interrupt the user with a blocking prompt.
    pub fn raises_notification(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            Self::Potable => Some(1),
            Self::NotPotable => Some(0),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::InvalidResponse { reason } | Self::TransportError { reason } => Some(reason),
            _ => None,
        }
    }
}

impl From<Potability> for PredictionOutcome {
    fn from(value: Potability) -> Self {
        match value {
            Potability::Potable => Self::Potable,
            Potability::NotPotable => Self::NotPotable,
        }
    }
}
