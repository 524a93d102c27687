//! Ordered feature vector consumed by the scaler and classifier
//!
//! The trained model expects exactly ten features in a fixed order. A vector
//! in the wrong order is not an error numerically, the prediction is simply
//! wrong, so names travel with the values and are checked at every boundary.

use crate::core_types::WeatherObservation;
use crate::error::{Result, RiskError};
use crate::fwi::FireIndices;

/// Training schema of the meteorological classifier
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Temperature",
    "RH",
    "Ws",
    "Rain",
    "FFMC",
    "DMC",
    "DC",
    "ISI",
    "BUI",
    "FWI",
];

pub const FEATURE_COUNT: usize = 10;

/// Named, ordered, unscaled feature values
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair names with values; the two lists must be the same length.
    pub fn from_parts(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(RiskError::SchemaMismatch(format!(
                "{} feature names for {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check count first, then order, against `expected`.
    pub fn validate_schema<S: AsRef<str>>(&self, expected: &[S]) -> Result<()> {
        if self.len() != expected.len() {
            return Err(RiskError::SchemaMismatch(format!(
                "expected {} features, got {}",
                expected.len(),
                self.len()
            )));
        }
        for (position, (actual, wanted)) in self.names.iter().zip(expected).enumerate() {
            if actual != wanted.as_ref() {
                return Err(RiskError::SchemaMismatch(format!(
                    "feature {position} is '{actual}', expected '{}'",
                    wanted.as_ref()
                )));
            }
        }
        Ok(())
    }
}

/// Assembles the canonical vector from an observation and its indices
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureVectorBuilder;

impl FeatureVectorBuilder {
    pub fn build(obs: &WeatherObservation, indices: &FireIndices) -> FeatureVector {
        let values = vec![
            *obs.temperature,
            *obs.relative_humidity,
            *obs.wind_speed,
            *obs.rain,
            indices.ffmc,
            indices.dmc,
            indices.dc,
            indices.isi,
            indices.bui,
            indices.fwi,
        ];
        FeatureVector {
            names: FEATURE_NAMES.iter().map(|name| (*name).to_string()).collect(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_indices() -> FireIndices {
        FireIndices {
            ffmc: 88.0,
            dmc: 6.0,
            dc: 31.0,
            isi: 5.5,
            bui: 8.1,
            fwi: 0.5,
        }
    }

    #[test]
    fn test_builder_order() {
        let obs = WeatherObservation::new(20.0, 40.0, 10.0, 1.0).unwrap();
        let fv = FeatureVectorBuilder::build(&obs, &sample_indices());
        assert_eq!(fv.len(), FEATURE_COUNT);
        assert_eq!(fv.values(), &[20.0, 40.0, 10.0, 1.0, 88.0, 6.0, 31.0, 5.5, 8.1, 0.5]);
        fv.validate_schema(&FEATURE_NAMES).unwrap();
    }

    #[test]
    fn test_short_vector_rejected() {
        let names: Vec<String> = FEATURE_NAMES[..9].iter().map(|s| s.to_string()).collect();
        let fv = FeatureVector::from_parts(names, vec![0.0; 9]).unwrap();
        let err = fv.validate_schema(&FEATURE_NAMES).unwrap_err();
        assert!(matches!(err, RiskError::SchemaMismatch(msg) if msg.contains("expected 10")));
    }

    #[test]
    fn test_swapped_order_rejected() {
        let mut names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        names.swap(4, 5);
        let fv = FeatureVector::from_parts(names, vec![0.0; 10]).unwrap();
        let err = fv.validate_schema(&FEATURE_NAMES).unwrap_err();
        assert!(matches!(err, RiskError::SchemaMismatch(msg) if msg.contains("'DMC'")));
    }

    #[test]
    fn test_names_values_length_mismatch() {
        let names = vec!["Temperature".to_string()];
        assert!(FeatureVector::from_parts(names, vec![1.0, 2.0]).is_err());
    }
}
