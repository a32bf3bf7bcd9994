use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, StatusCode};
use shared::{
    domain::ParameterSet,
    error::ResponseShapeError,
    protocol::{parse_prediction_body, Potability, PredictRequest, PredictionOutcome, ServiceBanner},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub mod config;
pub mod session;
pub mod slider;
pub mod store;

pub use config::{load_settings, ClientSettings};
pub use session::{
    Notification, OutcomePresentation, PendingSubmission, Rgb, SessionController, SessionPhase,
    SubmitRejected,
};
pub use slider::{PointerInput, SliderState, SliderTrack};
pub use store::ParameterStore;

const JSON_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("failed to reach prediction service: {0}")]
    Request(#[source] reqwest::Error),
    #[error("prediction service returned HTTP {status}")]
    Status { status: StatusCode },
    #[error("failed to read prediction response: {0}")]
    Body(#[source] reqwest::Error),
    #[error("invalid prediction response: {0}")]
    Shape(#[from] ResponseShapeError),
    #[error("cannot derive service root from {endpoint}: {source}")]
    ProbeUrl {
        endpoint: Url,
        source: url::ParseError,
    },
}

impl PredictError {
    /// The single place where request failures become user-visible outcomes.
    pub fn into_outcome(self) -> PredictionOutcome {
        let reason = self.to_string();
        match self {
            PredictError::Shape(_) => PredictionOutcome::InvalidResponse { reason },
            _ => PredictionOutcome::TransportError { reason },
        }
    }
}

/// Anything that can turn a parameter snapshot into an outcome.
///
/// Implementations classify every failure themselves; the returned future
/// always resolves to one of the four outcomes.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, snapshot: &ParameterSet) -> PredictionOutcome;
}

#[async_trait]
impl<T> PredictionService for Arc<T>
where
    T: PredictionService + ?Sized,
{
    async fn predict(&self, snapshot: &ParameterSet) -> PredictionOutcome {
        (**self).predict(snapshot).await
    }
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, PredictError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(PredictError::ClientBuild)?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn try_predict(&self, snapshot: &ParameterSet) -> Result<Potability, PredictError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, JSON_MIME)
            .json(&PredictRequest::from(snapshot))
            .send()
            .await
            .map_err(PredictError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Status { status });
        }

        let body = response.bytes().await.map_err(PredictError::Body)?;
        Ok(parse_prediction_body(&body)?)
    }

    /// Fetches the banner served at the root of the prediction service.
    pub async fn probe(&self) -> Result<ServiceBanner, PredictError> {
        let root = self
            .endpoint
            .join("/")
            .map_err(|source| PredictError::ProbeUrl {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        let response = self
            .http
            .get(root)
            .header(ACCEPT, JSON_MIME)
            .send()
            .await
            .map_err(PredictError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictError::Status { status });
        }

        let body = response.bytes().await.map_err(PredictError::Body)?;
        serde_json::from_slice(&body)
            .map_err(|err| PredictError::Shape(ResponseShapeError::NotJson(err.to_string())))
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, snapshot: &ParameterSet) -> PredictionOutcome {
        info!(endpoint = %self.endpoint, "requesting potability prediction");
        match self.try_predict(snapshot).await {
            Ok(potability) => {
                info!(score = potability.score(), "prediction received");
                potability.into()
            }
            Err(err) => {
                warn!("prediction failed: {err}");
                err.into_outcome()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
