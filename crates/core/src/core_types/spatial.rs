//! Geographic point at which a risk evaluation is requested

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude pair in decimal degrees
///
/// Constructed only through [`Coordinates::new`], so every instance in the
/// pipeline is finite and inside the valid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and wrap a coordinate pair.
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(RiskError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Integer key with 1e-4° resolution (about 11 m), used to share cached
    /// observations between requests for practically the same point.
    pub(crate) fn grid_key(&self) -> (i64, i64) {
        (
            (self.latitude * 1e4).round() as i64,
            (self.longitude * 1e4).round() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let c = Coordinates::new(-31.95, 115.86).unwrap();
        assert_eq!(c.latitude(), -31.95);
        assert_eq!(c.longitude(), 115.86);
        assert!(Coordinates::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_and_nan() {
        assert!(matches!(
            Coordinates::new(91.0, 0.0),
            Err(RiskError::InvalidCoordinates { .. })
        ));
        assert!(Coordinates::new(0.0, 180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn test_grid_key_merges_nearby_points() {
        let a = Coordinates::new(38.123_41, -120.5).unwrap();
        let b = Coordinates::new(38.123_44, -120.500_01).unwrap();
        let c = Coordinates::new(38.124, -120.5).unwrap();
        assert_eq!(a.grid_key(), b.grid_key());
        assert_ne!(a.grid_key(), c.grid_key());
    }
}
