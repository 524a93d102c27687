//! Service configuration: defaults, optional TOML file, environment overrides.
//!
//! ```toml
//! [weather]
//! base_url = "https://api.open-meteo.com/v1/forecast"
//! timeout_secs = 10
//! max_retries = 5
//! backoff_base_ms = 200
//! cache_ttl_secs = 3600
//!
//! [artifacts]
//! scaler_path = "analysis/std_scaler_weather.json"
//! classifier_path = "analysis/meteorological-classifier.json"
//!
//! [baseline]
//! ffmc_prev = 85.0
//! dmc_prev = 6.0
//! dc_prev = 15.0
//! ```

use crate::error::{Result, RiskError};
use crate::fwi::{CarriedIndices, BASELINE_DC, BASELINE_DMC, BASELINE_FFMC};
use crate::weather::open_meteo::DEFAULT_FORECAST_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// 0 disables the observation cache
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,
    #[serde(default = "default_classifier_path")]
    pub classifier_path: PathBuf,
}

/// Moisture codes assumed for the previous day when no history is supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    #[serde(default = "default_ffmc")]
    pub ffmc_prev: f64,
    #[serde(default = "default_dmc")]
    pub dmc_prev: f64,
    #[serde(default = "default_dc")]
    pub dc_prev: f64,
}

fn default_base_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    5
}
fn default_backoff_base_ms() -> u64 {
    200
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_scaler_path() -> PathBuf {
    PathBuf::from("analysis/std_scaler_weather.json")
}
fn default_classifier_path() -> PathBuf {
    PathBuf::from("analysis/meteorological-classifier.json")
}
fn default_ffmc() -> f64 {
    BASELINE_FFMC
}
fn default_dmc() -> f64 {
    BASELINE_DMC
}
fn default_dc() -> f64 {
    BASELINE_DC
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            scaler_path: default_scaler_path(),
            classifier_path: default_classifier_path(),
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            ffmc_prev: BASELINE_FFMC,
            dmc_prev: BASELINE_DMC,
            dc_prev: BASELINE_DC,
        }
    }
}

impl BaselineConfig {
    pub fn carried(&self, month: u8) -> CarriedIndices {
        CarriedIndices::new(self.ffmc_prev, self.dmc_prev, self.dc_prev, month)
    }
}

fn parse_u64(raw: &str, env_name: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RiskError::Config(format!("{env_name} must be an integer >= 0")))
}

impl RiskConfig {
    /// Defaults, then `path` if given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RiskError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
            .map_err(|e| RiskError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| RiskError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Override fields from `FIRE_RISK_*` variables looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FIRE_RISK_WEATHER_URL") {
            self.weather.base_url = url;
        }
        if let Some(raw) = lookup("FIRE_RISK_TIMEOUT_SECS") {
            self.weather.timeout_secs = parse_u64(&raw, "FIRE_RISK_TIMEOUT_SECS")?;
        }
        if let Some(raw) = lookup("FIRE_RISK_MAX_RETRIES") {
            let retries = parse_u64(&raw, "FIRE_RISK_MAX_RETRIES")?;
            self.weather.max_retries = u32::try_from(retries)
                .map_err(|_| RiskError::Config("FIRE_RISK_MAX_RETRIES is too large".into()))?;
        }
        if let Some(raw) = lookup("FIRE_RISK_BACKOFF_MS") {
            self.weather.backoff_base_ms = parse_u64(&raw, "FIRE_RISK_BACKOFF_MS")?;
        }
        if let Some(raw) = lookup("FIRE_RISK_CACHE_TTL_SECS") {
            self.weather.cache_ttl_secs = parse_u64(&raw, "FIRE_RISK_CACHE_TTL_SECS")?;
        }
        if let Some(path) = lookup("FIRE_RISK_SCALER_PATH") {
            self.artifacts.scaler_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("FIRE_RISK_CLASSIFIER_PATH") {
            self.artifacts.classifier_path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Report every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut issues: Vec<String> = Vec::new();

        let url = &self.weather.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push("weather.base_url must be an http(s) URL".into());
        }
        if self.weather.timeout_secs == 0 {
            issues.push("weather.timeout_secs must be > 0".into());
        }
        if self.weather.max_retries > 10 {
            issues.push("weather.max_retries must be <= 10".into());
        }
        if self.weather.backoff_base_ms == 0 {
            issues.push("weather.backoff_base_ms must be > 0".into());
        }

        let baseline = &self.baseline;
        if !(0.0..=101.0).contains(&baseline.ffmc_prev) {
            issues.push("baseline.ffmc_prev must be in [0, 101]".into());
        }
        if !(baseline.dmc_prev.is_finite() && baseline.dmc_prev >= 0.0) {
            issues.push("baseline.dmc_prev must be >= 0".into());
        }
        if !(baseline.dc_prev.is_finite() && baseline.dc_prev >= 0.0) {
            issues.push("baseline.dc_prev must be >= 0".into());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(RiskError::Config(format!(
                "Invalid config:\n - {}",
                issues.join("\n - ")
            )))
        }
    }
}
