//! Wildfire Meteorological Risk Core
//!
//! Estimates wildfire risk at a point from current weather. The Canadian
//! Fire Weather Index chain (FFMC, DMC, DC, ISI, BUI, FWI) is computed from a
//! single observation, combined with the raw weather into a ten-feature
//! vector, standardized, and scored by a pretrained binary classifier.
//!
//! ## Layout
//!
//! - [`fwi`]: the index formulas and the [`FireIndexEngine`] driver
//! - [`model`]: feature vector, scaler, classifier and artifact lifecycle
//! - [`weather`]: provider trait, Open-Meteo client, retry and cache
//! - [`service`]: [`MeteorologicalRiskService`] orchestration and verdicts
//! - [`config`]: TOML plus environment configuration

pub mod config;
pub mod core_types;
pub mod error;
pub mod fwi;
pub mod model;
pub mod service;
pub mod weather;

pub use config::{ArtifactConfig, BaselineConfig, RiskConfig, WeatherConfig};
pub use core_types::{Coordinates, WeatherObservation};
pub use error::{Result, RiskError};
pub use fwi::{CarriedIndices, FireIndexEngine, FireIndices};
pub use model::{
    ArtifactCell, DenseClassifier, FeatureVector, FeatureVectorBuilder, ModelArtifacts,
    RiskClassifier, ScaledFeatures, StandardScaler, FEATURE_COUNT, FEATURE_NAMES,
};
pub use service::{alert_percentage, MeteorologicalRiskService, RiskAssessment, RiskVerdict};
pub use weather::{OpenMeteoClient, RetryPolicy, WeatherProvider};
