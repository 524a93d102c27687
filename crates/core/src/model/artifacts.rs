//! Process-wide pretrained artifacts
//!
//! The scaler and classifier are loaded once, never mutated, and shared by
//! reference across concurrent evaluations. [`ArtifactCell`] owns the
//! load-once lifecycle explicitly so services receive artifacts as a plain
//! dependency and tests can pass stubs instead of model files.

use super::classifier::{DenseClassifier, RiskClassifier};
use super::scaler::StandardScaler;
use crate::error::{Result, RiskError};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Scaler and classifier validated against each other
#[derive(Clone)]
pub struct ModelArtifacts {
    scaler: StandardScaler,
    classifier: Arc<dyn RiskClassifier>,
}

impl ModelArtifacts {
    /// Pair a scaler with a classifier; their widths must agree.
    pub fn new(scaler: StandardScaler, classifier: Arc<dyn RiskClassifier>) -> Result<Self> {
        if scaler.width() != classifier.input_width() {
            return Err(RiskError::SchemaMismatch(format!(
                "scaler produces {} features, classifier '{}' expects {}",
                scaler.width(),
                classifier.name(),
                classifier.input_width()
            )));
        }
        Ok(Self { scaler, classifier })
    }

    /// Load both artifacts from JSON files.
    pub fn load(scaler_path: &Path, classifier_path: &Path) -> Result<Self> {
        let scaler = StandardScaler::load(scaler_path)?;
        let classifier = DenseClassifier::load(classifier_path)?;
        info!(
            scaler = %scaler_path.display(),
            classifier = %classifier_path.display(),
            model = classifier.name(),
            layers = classifier.depth(),
            "loaded meteorological model artifacts"
        );
        Self::new(scaler, Arc::new(classifier))
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &dyn RiskClassifier {
        self.classifier.as_ref()
    }
}

impl fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("scaler", &self.scaler)
            .field("classifier", &self.classifier.name())
            .finish()
    }
}

/// Load-once holder for [`ModelArtifacts`]
///
/// A failed load is not remembered; the next caller tries again. If two
/// callers race on the first load, both succeed and share whichever value
/// was stored first.
#[derive(Debug, Default)]
pub struct ArtifactCell {
    cell: OnceLock<Arc<ModelArtifacts>>,
}

impl ArtifactCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<ModelArtifacts>> {
        self.cell.get().cloned()
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<ModelArtifacts>>
    where
        F: FnOnce() -> Result<ModelArtifacts>,
    {
        if let Some(artifacts) = self.cell.get() {
            return Ok(Arc::clone(artifacts));
        }
        let loaded = Arc::new(load()?);
        match self.cell.set(Arc::clone(&loaded)) {
            Ok(()) => Ok(loaded),
            Err(_) => Ok(self.cell.get().map_or(loaded, Arc::clone)),
        }
    }
}
