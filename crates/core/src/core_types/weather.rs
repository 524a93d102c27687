//! Weather observation fed into the fire weather index chain
//!
//! A [`WeatherObservation`] is the normalized snapshot of current conditions
//! at one point: temperature, relative humidity, wind speed and rainfall. It
//! is immutable once built and created fresh for every risk evaluation.

use crate::core_types::units::{Celsius, KilometersPerHour, Millimeters, Percent};
use crate::error::{Result, RiskError};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Current weather at a point, as reported by a provider
///
/// `rain` is the liquid rain depth used by the FFMC/DMC/DC rain phases and
/// by the classifier's `Rain` feature. `precipitation` is the provider's
/// total (rain + showers + snow) and is kept for reporting only.
///
/// # Example
/// ```
/// use fire_risk_core::WeatherObservation;
///
/// let obs = WeatherObservation::new(25.0, 20.0, 15.0, 0.0).unwrap();
/// assert_eq!(*obs.temperature, 25.0);
/// assert!(obs.observed_at.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature: Celsius,
    pub relative_humidity: Percent,
    pub wind_speed: KilometersPerHour,
    pub rain: Millimeters,
    pub precipitation: Millimeters,
    /// Provider-local time of the observation, when reported
    pub observed_at: Option<NaiveDateTime>,
}

impl WeatherObservation {
    /// Build and validate an observation; precipitation defaults to `rain`.
    pub fn new(temperature: f64, relative_humidity: f64, wind_speed: f64, rain: f64) -> Result<Self> {
        let obs = WeatherObservation {
            temperature: Celsius::new(temperature),
            relative_humidity: Percent::new(relative_humidity),
            wind_speed: KilometersPerHour::new(wind_speed),
            rain: Millimeters::new(rain),
            precipitation: Millimeters::new(rain),
            observed_at: None,
        };
        obs.validate()?;
        Ok(obs)
    }

    pub fn with_precipitation(mut self, precipitation: f64) -> Result<Self> {
        self.precipitation = Millimeters::new(precipitation);
        self.validate()?;
        Ok(self)
    }

    pub fn with_observed_at(mut self, observed_at: NaiveDateTime) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Reject values no physical observation can take.
    ///
    /// Provider payloads are untrusted: a malformed field fails the
    /// evaluation rather than being clamped or imputed.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("temperature", *self.temperature),
            ("relative_humidity", *self.relative_humidity),
            ("wind_speed", *self.wind_speed),
            ("rain", *self.rain),
            ("precipitation", *self.precipitation),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(RiskError::malformed(field, format!("non-finite value {value}")));
            }
        }
        if !(0.0..=100.0).contains(&*self.relative_humidity) {
            return Err(RiskError::malformed(
                "relative_humidity",
                format!("{} outside 0-100", self.relative_humidity),
            ));
        }
        if *self.wind_speed < 0.0 {
            return Err(RiskError::malformed("wind_speed", format!("negative {}", self.wind_speed)));
        }
        if *self.rain < 0.0 {
            return Err(RiskError::malformed("rain", format!("negative {}", self.rain)));
        }
        if *self.precipitation < 0.0 {
            return Err(RiskError::malformed(
                "precipitation",
                format!("negative {}", self.precipitation),
            ));
        }
        Ok(())
    }

    /// Calendar month (1-12) of the observation in provider-local time.
    pub fn local_month(&self) -> Option<u8> {
        self.observed_at.map(|t| t.month() as u8)
    }
}
