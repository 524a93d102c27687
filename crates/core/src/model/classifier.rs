//! Frozen binary classifier producing a wildfire probability
//!
//! The production model is a small dense feed-forward network. Its trained
//! weights are exported as JSON:
//!
//! ```json
//! {
//!   "name": "meteorological-v1",
//!   "input_features": 10,
//!   "layers": [
//!     { "weights": [[..10..], ..], "bias": [..], "activation": "relu" },
//!     { "weights": [[..]],         "bias": [b],  "activation": "sigmoid" }
//!   ]
//! }
//! ```
//!
//! `weights` is row-major with one row per output unit. Inference is a pure
//! read of the loaded matrices, so one instance can be shared freely.

use super::features::FEATURE_COUNT;
use super::scaler::ScaledFeatures;
use crate::error::{Result, RiskError};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interface for pretrained wildfire classifiers
pub trait RiskClassifier: Send + Sync {
    /// Probability (0.0 to 1.0) that the location is under wildfire risk
    fn predict(&self, features: &ScaledFeatures) -> Result<f64>;

    /// Model name for logs
    fn name(&self) -> &str;

    /// Number of features the model was trained on
    fn input_width(&self) -> usize {
        FEATURE_COUNT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Linear,
}

impl Activation {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }
}

/// One dense layer as stored in the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerArtifact {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

/// Serialized network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub input_features: usize,
    pub layers: Vec<LayerArtifact>,
}

fn default_model_name() -> String {
    "dense-classifier".to_string()
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: DMatrix<f64>,
    bias: DVector<f64>,
    activation: Activation,
}

/// Dense feed-forward network ending in a single sigmoid unit
#[derive(Debug, Clone)]
pub struct DenseClassifier {
    name: String,
    input_width: usize,
    layers: Vec<DenseLayer>,
}

impl DenseClassifier {
    /// Convert and validate an artifact
    ///
    /// The input width must equal the feature schema, each layer must
    /// consume the previous layer's output, and the network must end in one
    /// sigmoid unit. Violations are [`RiskError::SchemaMismatch`].
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        if artifact.input_features != FEATURE_COUNT {
            return Err(RiskError::SchemaMismatch(format!(
                "classifier expects {} inputs, feature schema has {FEATURE_COUNT}",
                artifact.input_features
            )));
        }
        if artifact.layers.is_empty() {
            return Err(RiskError::SchemaMismatch("classifier has no layers".into()));
        }

        let mut width = artifact.input_features;
        let mut layers = Vec::with_capacity(artifact.layers.len());
        for (index, layer) in artifact.layers.into_iter().enumerate() {
            let rows = layer.weights.len();
            if rows == 0 || layer.bias.len() != rows {
                return Err(RiskError::SchemaMismatch(format!(
                    "layer {index}: {rows} weight rows, {} biases",
                    layer.bias.len()
                )));
            }
            if let Some(row) = layer.weights.iter().position(|r| r.len() != width) {
                return Err(RiskError::SchemaMismatch(format!(
                    "layer {index} row {row}: expected {width} weights, got {}",
                    layer.weights[row].len()
                )));
            }
            let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
            if flat.iter().chain(&layer.bias).any(|v| !v.is_finite()) {
                return Err(RiskError::SchemaMismatch(format!(
                    "layer {index} has non-finite parameters"
                )));
            }
            layers.push(DenseLayer {
                weights: DMatrix::from_row_slice(rows, width, &flat),
                bias: DVector::from_vec(layer.bias),
                activation: layer.activation,
            });
            width = rows;
        }

        let last = layers.last().map(|l| (l.bias.len(), l.activation));
        if last != Some((1, Activation::Sigmoid)) {
            return Err(RiskError::SchemaMismatch(
                "classifier must end in a single sigmoid unit".into(),
            ));
        }

        Ok(Self {
            name: artifact.name,
            input_width: FEATURE_COUNT,
            layers,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let artifact: ClassifierArtifact = serde_json::from_str(json).map_err(|e| RiskError::Artifact {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        Self::from_artifact(artifact)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RiskError::Artifact {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let artifact: ClassifierArtifact =
            serde_json::from_str(&contents).map_err(|e| RiskError::Artifact {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_artifact(artifact)
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl RiskClassifier for DenseClassifier {
    fn predict(&self, features: &ScaledFeatures) -> Result<f64> {
        if features.len() != self.input_width {
            return Err(RiskError::SchemaMismatch(format!(
                "classifier expects {} inputs, got {}",
                self.input_width,
                features.len()
            )));
        }

        let mut activations = DVector::from_column_slice(features.as_slice());
        for layer in &self.layers {
            let activation = layer.activation;
            activations = (&layer.weights * &activations + &layer.bias).map(|x| activation.apply(x));
        }

        let probability = activations[0];
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(RiskError::NumericDomain {
                stage: "classifier",
                detail: format!("probability {probability} outside [0, 1]"),
            });
        }
        Ok(probability)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> usize {
        self.input_width
    }
}
