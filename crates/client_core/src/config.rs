use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PREDICT_ENDPOINT: &str = "https://water-potability-1-vdzg.onrender.com/predict";

const ENDPOINT_ENV: &str = "APP__PREDICT_ENDPOINT";
const REQUEST_TIMEOUT_ENV: &str = "APP__REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid prediction endpoint '{raw}': {source}")]
    InvalidEndpoint {
        raw: String,
        source: url::ParseError,
    },
    #[error("prediction endpoint must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: Url,
    /// `None` leaves timeouts to the transport.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_PREDICT_ENDPOINT).expect("default endpoint is a valid URL"),
            request_timeout: None,
        }
    }
}

impl ClientSettings {
    pub fn with_endpoint(endpoint: &str) -> Result<Self, SettingsError> {
        Ok(Self {
            endpoint: parse_endpoint(endpoint)?,
            ..Self::default()
        })
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url, SettingsError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| SettingsError::InvalidEndpoint {
        raw: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::UnsupportedScheme(other.to_string())),
    }
}

pub fn load_settings() -> ClientSettings {
    settings_from_lookup(|name| std::env::var(name).ok())
}

/// Applies overrides from `lookup` on top of the defaults. Invalid values are
/// logged and ignored.
pub fn settings_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(v) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
        match parse_endpoint(&v) {
            Ok(endpoint) => settings.endpoint = endpoint,
            Err(err) => tracing::warn!("ignoring {ENDPOINT_ENV}: {err}"),
        }
    }

    if let Some(v) = lookup(REQUEST_TIMEOUT_ENV) {
        match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => settings.request_timeout = Some(Duration::from_secs(secs)),
            _ => tracing::warn!("ignoring {REQUEST_TIMEOUT_ENV}={v}: expected a positive integer"),
        }
    }

    settings
}
