//! Meteorological risk evaluation
//!
//! One evaluation runs fetch, index chain, feature build, scaling and
//! classification in that order. Any failure aborts the evaluation with the
//! typed error of the stage that failed; there is no fallback probability.

use crate::config::{BaselineConfig, RiskConfig};
use crate::core_types::{Coordinates, WeatherObservation};
use crate::error::{Result, RiskError};
use crate::fwi::{CarriedIndices, FireIndexEngine, FireIndices};
use crate::model::{ArtifactCell, FeatureVector, FeatureVectorBuilder, ModelArtifacts};
use crate::weather::{OpenMeteoClient, WeatherProvider};
use chrono::Datelike;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Binary risk status and the confidence shown next to it
///
/// `status` is 1 iff the probability is strictly greater than 0.5.
/// `confidence` is `max(p, 1 - p)` as a percentage, rounded half-to-even,
/// so it never drops below 50.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskVerdict {
    pub status: u8,
    pub confidence: u8,
}

impl RiskVerdict {
    /// Fails with [`RiskError::NumericDomain`] unless `probability` is a
    /// finite value in [0, 1].
    pub fn from_probability(probability: f64) -> Result<Self> {
        let p = checked_probability("probability", probability)?;
        Ok(Self {
            status: u8::from(p > 0.5),
            confidence: percent(p.max(1.0 - p)),
        })
    }

    /// Verdict over the mean of two independent probabilities
    ///
    /// Used when the weather score is combined with the satellite score.
    pub fn average(a: f64, b: f64) -> Result<Self> {
        let a = checked_probability("first probability", a)?;
        let b = checked_probability("second probability", b)?;
        Self::from_probability((a + b) / 2.0)
    }
}

/// Raw probability as a whole percentage for alert reports
///
/// Unlike [`RiskVerdict::confidence`] this is not folded around 0.5.
pub fn alert_percentage(probability: f64) -> Result<u8> {
    checked_probability("probability", probability).map(percent)
}

fn checked_probability(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(RiskError::numeric(
            "verdict",
            format!("{name} {value} is not within [0, 1]"),
        ))
    }
}

fn percent(fraction: f64) -> u8 {
    (fraction * 100.0).round_ties_even() as u8
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub status: u8,
    pub confidence: u8,
    pub observation: WeatherObservation,
    pub indices: FireIndices,
}

/// Orchestrates weather fetch, index chain and classification
pub struct MeteorologicalRiskService {
    provider: Arc<dyn WeatherProvider>,
    artifacts: Arc<ModelArtifacts>,
    baseline: BaselineConfig,
}

impl MeteorologicalRiskService {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        artifacts: Arc<ModelArtifacts>,
        baseline: BaselineConfig,
    ) -> Self {
        Self {
            provider,
            artifacts,
            baseline,
        }
    }

    /// Open-Meteo provider plus artifacts loaded once through `cell`.
    pub fn from_config(config: &RiskConfig, cell: &ArtifactCell) -> Result<Self> {
        let provider = OpenMeteoClient::new(&config.weather)?;
        let artifacts = cell.get_or_load(|| {
            ModelArtifacts::load(
                &config.artifacts.scaler_path,
                &config.artifacts.classifier_path,
            )
        })?;
        Ok(Self::new(Arc::new(provider), artifacts, config.baseline))
    }

    /// Wildfire probability for a point, using baseline carried indices
    pub async fn evaluate_meteorological_risk(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<RiskAssessment> {
        let coords = Coordinates::new(latitude, longitude)?;
        self.evaluate_with(coords, None).await
    }

    /// Evaluate with explicit prior-day state
    ///
    /// Without `carried`, the configured baseline codes are used for the
    /// month of the observation's local timestamp, or the host's local month
    /// when the provider did not report one.
    pub async fn evaluate_with(
        &self,
        coords: Coordinates,
        carried: Option<CarriedIndices>,
    ) -> Result<RiskAssessment> {
        let observation = self.provider.fetch_current(coords).await?;
        observation.validate()?;

        let carried =
            carried.unwrap_or_else(|| self.baseline.carried(evaluation_month(&observation)));
        let indices = FireIndexEngine::compute(&observation, &carried)?;
        let probability = self.classify(&FeatureVectorBuilder::build(&observation, &indices))?;
        let verdict = RiskVerdict::from_probability(probability)?;

        info!(
            lat = coords.latitude(),
            lon = coords.longitude(),
            provider = self.provider.name(),
            fwi = indices.fwi,
            probability,
            status = verdict.status,
            "meteorological risk evaluated"
        );

        Ok(RiskAssessment {
            probability,
            status: verdict.status,
            confidence: verdict.confidence,
            observation,
            indices,
        })
    }

    /// Scale and classify a prepared feature vector.
    pub fn classify(&self, features: &FeatureVector) -> Result<f64> {
        let scaled = self.artifacts.scaler().transform(features)?;
        let probability = self.artifacts.classifier().predict(&scaled)?;
        debug!(
            model = self.artifacts.classifier().name(),
            probability, "classified feature vector"
        );
        Ok(probability)
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }
}

fn evaluation_month(observation: &WeatherObservation) -> u8 {
    observation
        .local_month()
        .unwrap_or_else(|| chrono::Local::now().month() as u8)
}
