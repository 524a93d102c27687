//! Error taxonomy for the meteorological risk pipeline.
//!
//! Every failure is surfaced to the orchestrating caller as a typed variant.
//! Only transport-level weather fetch failures are ever retried; nothing is
//! replaced with a default probability.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    /// Provider unreachable, timed out, or answered with a retryable status.
    #[error("weather fetch failed: {message}")]
    WeatherFetch {
        message: String,
        /// `true` when a further attempt could succeed (connect error,
        /// timeout, HTTP 429 or 5xx).
        transient: bool,
    },

    /// Provider answered, but a required field is missing or malformed.
    #[error("incomplete weather observation: {field}: {reason}")]
    IncompleteObservation { field: &'static str, reason: String },

    /// A formula produced a non-finite or out-of-domain value.
    #[error("numeric domain error in {stage}: {detail}")]
    NumericDomain { stage: &'static str, detail: String },

    /// Feature vector shape or order does not match the artifact contract.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("invalid coordinates: latitude={latitude}, longitude={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// Artifact file could not be read or parsed.
    #[error("artifact error ({path}): {message}")]
    Artifact { path: String, message: String },

    #[error("config error: {0}")]
    Config(String),
}

impl RiskError {
    pub(crate) fn numeric(stage: &'static str, detail: impl Into<String>) -> Self {
        RiskError::NumericDomain {
            stage,
            detail: detail.into(),
        }
    }

    pub(crate) fn missing(field: &'static str) -> Self {
        RiskError::IncompleteObservation {
            field,
            reason: "missing or null".into(),
        }
    }

    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        RiskError::IncompleteObservation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the retry policy may attempt the operation again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RiskError::WeatherFetch {
                transient: true,
                ..
            }
        )
    }
}

/// Fail with [`RiskError::NumericDomain`] unless `value` is finite.
#[inline]
pub(crate) fn ensure_finite(stage: &'static str, name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::numeric(stage, format!("{name} is {value}")))
    }
}
