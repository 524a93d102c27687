//! Open-Meteo current-conditions client.
//!
//! API: `https://api.open-meteo.com/v1/forecast`
//! Auth: None required.
//!
//! Requests the five current variables the risk model needs, with
//! `timezone=auto` so the returned timestamp is local to the point.

use super::cache::ObservationCache;
use super::retry::RetryPolicy;
use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::core_types::{Coordinates, WeatherObservation};
use crate::error::{Result, RiskError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation,rain,wind_speed_10m";

/// Open-Meteo local timestamps carry minutes but no seconds or offset
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

// ── Open-Meteo response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    current: Option<OpenMeteoCurrent>,
}

/// Every field optional so a missing one can be reported by name.
#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    precipitation: Option<f64>,
    #[serde(default)]
    rain: Option<f64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>,
}

/// Turn a response body into a validated observation.
///
/// Missing or null variables fail with [`RiskError::IncompleteObservation`];
/// nothing is defaulted.
pub fn parse_current(body: &str) -> Result<WeatherObservation> {
    let response: OpenMeteoResponse =
        serde_json::from_str(body).map_err(|e| RiskError::malformed("body", e.to_string()))?;
    let current = response.current.ok_or_else(|| RiskError::missing("current"))?;

    let temperature = current.temperature_2m.ok_or_else(|| RiskError::missing("temperature"))?;
    let relative_humidity = current
        .relative_humidity_2m
        .ok_or_else(|| RiskError::missing("relative_humidity"))?;
    let precipitation = current.precipitation.ok_or_else(|| RiskError::missing("precipitation"))?;
    let rain = current.rain.ok_or_else(|| RiskError::missing("rain"))?;
    let wind_speed = current.wind_speed_10m.ok_or_else(|| RiskError::missing("wind_speed"))?;

    let mut obs = WeatherObservation::new(temperature, relative_humidity, wind_speed, rain)?
        .with_precipitation(precipitation)?;
    if let Some(time) = current.time {
        let observed_at = NaiveDateTime::parse_from_str(&time, TIME_FORMAT)
            .map_err(|e| RiskError::malformed("time", format!("'{time}': {e}")))?;
        obs = obs.with_observed_at(observed_at);
    }
    Ok(obs)
}

/// Rate limiting and server-side failures are worth retrying; any other
/// non-success status will fail the same way again.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Open-Meteo API client with request timeout, retry and response cache.
#[derive(Debug)]
pub struct OpenMeteoClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    cache: Option<ObservationCache>,
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fire-risk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| RiskError::Config(format!("failed to build HTTP client: {e}")))?;

        let cache = (config.cache_ttl_secs > 0)
            .then(|| ObservationCache::new(Duration::from_secs(config.cache_ttl_secs)));

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            retry: RetryPolicy::new(config.max_retries, Duration::from_millis(config.backoff_base_ms)),
            cache,
        })
    }

    /// One HTTP round trip, no retry.
    async fn fetch_once(&self, coords: Coordinates) -> Result<WeatherObservation> {
        debug!(
            url = %self.base_url,
            latitude = coords.latitude(),
            longitude = coords.longitude(),
            "fetching Open-Meteo current conditions"
        );

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coords.latitude().to_string()),
                ("longitude", coords.longitude().to_string()),
                ("current", CURRENT_VARIABLES.to_string()),
                ("wind_speed_unit", "kmh".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| RiskError::WeatherFetch {
                message: format!("HTTP error for ({},{}): {e}", coords.latitude(), coords.longitude()),
                transient: e.is_timeout() || e.is_connect() || e.is_request(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(500).collect();
            return Err(RiskError::WeatherFetch {
                message: format!("Open-Meteo returned {status}: {excerpt}"),
                transient: is_transient_status(status),
            });
        }

        let body = resp.text().await.map_err(|e| RiskError::WeatherFetch {
            message: format!("failed reading Open-Meteo body: {e}"),
            transient: true,
        })?;
        parse_current(&body)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherObservation> {
        if let Some(obs) = self.cache.as_ref().and_then(|c| c.get(&coords)) {
            debug!(latitude = coords.latitude(), longitude = coords.longitude(), "weather cache hit");
            return Ok(obs);
        }

        let obs = self.retry.run(|| self.fetch_once(coords)).await?;
        if let Some(cache) = &self.cache {
            cache.insert(&coords, obs);
        }
        Ok(obs)
    }

    fn name(&self) -> &str {
        "open-meteo"
    }
}
