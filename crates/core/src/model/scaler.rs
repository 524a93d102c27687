//! Frozen standardization transform
//!
//! Applies `z = (x - mean) / scale` per feature using parameters fitted at
//! training time. The artifact is JSON:
//!
//! ```json
//! {
//!   "feature_names": ["Temperature", "RH", "Ws", "Rain", "FFMC", "DMC", "DC", "ISI", "BUI", "FWI"],
//!   "mean":  [..10 values..],
//!   "scale": [..10 values..]
//! }
//! ```
//!
//! A zero scale marks a constant training feature; it is centred but not
//! divided.

use super::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature values after standardization, ready for the classifier
///
/// Only [`StandardScaler::transform`] creates these, so a classifier never
/// sees a vector that skipped schema validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatures {
    values: Vec<f64>,
}

impl ScaledFeatures {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Standardization parameters; deserializing checks them like [`StandardScaler::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerFile")]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// On-disk layout before validation
#[derive(Debug, Deserialize)]
struct ScalerFile {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl TryFrom<ScalerFile> for StandardScaler {
    type Error = RiskError;

    fn try_from(file: ScalerFile) -> Result<Self> {
        Self::new(file.feature_names, file.mean, file.scale)
    }
}

impl StandardScaler {
    /// Build from fitted parameters and check them against the schema.
    pub fn new(feature_names: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            feature_names,
            mean,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Mean 0, scale 1 for every canonical feature
    pub fn identity() -> Self {
        Self {
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ScalerFile = serde_json::from_str(json).map_err(|e| RiskError::Artifact {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        Self::try_from(file)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RiskError::Artifact {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: ScalerFile = serde_json::from_str(&contents).map_err(|e| RiskError::Artifact {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::try_from(file)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// Schema must be the canonical ten features in order, with one finite
    /// mean and one finite, non-negative scale per feature.
    fn validate(&self) -> Result<()> {
        if self.mean.len() != self.feature_names.len() || self.scale.len() != self.feature_names.len() {
            return Err(RiskError::SchemaMismatch(format!(
                "scaler has {} names, {} means, {} scales",
                self.feature_names.len(),
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(RiskError::SchemaMismatch(format!(
                "scaler fitted on {} features, model expects {FEATURE_COUNT}",
                self.feature_names.len()
            )));
        }
        for (position, (name, wanted)) in self.feature_names.iter().zip(FEATURE_NAMES).enumerate() {
            if name != wanted {
                return Err(RiskError::SchemaMismatch(format!(
                    "scaler feature {position} is '{name}', expected '{wanted}'"
                )));
            }
        }
        let bad = self
            .mean
            .iter()
            .chain(&self.scale)
            .any(|v| !v.is_finite())
            || self.scale.iter().any(|s| *s < 0.0);
        if bad {
            return Err(RiskError::SchemaMismatch(
                "scaler parameters must be finite with non-negative scale".into(),
            ));
        }
        Ok(())
    }

    /// Standardize `features` after checking count and order.
    pub fn transform(&self, features: &FeatureVector) -> Result<ScaledFeatures> {
        features.validate_schema(&self.feature_names)?;
        let mut values = Vec::with_capacity(features.len());
        for ((name, x), (mean, scale)) in features
            .names()
            .iter()
            .zip(features.values())
            .zip(self.mean.iter().zip(&self.scale))
        {
            if !x.is_finite() {
                return Err(RiskError::NumericDomain {
                    stage: "scaler",
                    detail: format!("feature '{name}' is {x}"),
                });
            }
            let divisor = if *scale == 0.0 { 1.0 } else { *scale };
            values.push((x - mean) / divisor);
        }
        Ok(ScaledFeatures { values })
    }
}
