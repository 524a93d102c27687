//! Feature assembly, standardization and classification

pub mod artifacts;
pub mod classifier;
pub mod features;
pub mod scaler;

pub use artifacts::{ArtifactCell, ModelArtifacts};
pub use classifier::{Activation, ClassifierArtifact, DenseClassifier, LayerArtifact, RiskClassifier};
pub use features::{FeatureVector, FeatureVectorBuilder, FEATURE_COUNT, FEATURE_NAMES};
pub use scaler::{ScaledFeatures, StandardScaler};
