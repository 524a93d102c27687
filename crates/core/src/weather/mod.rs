//! Weather provider boundary
//!
//! The risk service only needs current conditions at a point. Providers are
//! untrusted: missing or malformed fields fail the evaluation.

pub mod cache;
pub mod open_meteo;
pub mod retry;

pub use cache::ObservationCache;
pub use open_meteo::OpenMeteoClient;
pub use retry::RetryPolicy;

use crate::core_types::{Coordinates, WeatherObservation};
use crate::error::Result;
use async_trait::async_trait;

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_current(&self, coords: Coordinates) -> Result<WeatherObservation>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
