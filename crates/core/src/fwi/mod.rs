//! Canadian Fire Weather Index (FWI) System
//!
//! Sequential computation of the six FWI-family indices from one day's
//! weather plus the previous cycle's moisture codes:
//!
//! ```text
//!  T, RH, W, R ──► FFMC ──┐
//!  T, RH, R ─────► DMC ───┼──► BUI ──┐
//!  T, R ─────────► DC ────┘          ├──► FWI
//!  W ────────────────────────► ISI ──┘
//! ```
//!
//! Every formula is a pure function over explicit numbers; the engine itself
//! holds no state between calls. Callers supply the carried moisture codes.

pub mod behavior;
pub mod drought;
pub mod duff;
pub mod fine_fuel;

pub use behavior::{calculate_bui, calculate_fwi, calculate_isi, BUI_DC_RATIO, FWI_BUI_BREAKPOINT};
pub use drought::{
    calculate_dc, DC_DAY_LENGTH_FACTORS, DC_RAIN_THRESHOLD_MM, DC_TEMPERATURE_FLOOR_C,
};
pub use duff::{calculate_dmc, DMC_RAIN_THRESHOLD_MM};
pub use fine_fuel::{calculate_ffmc, FFMC_CEILING, FFMC_RAIN_THRESHOLD_MM};

use crate::core_types::WeatherObservation;
use crate::error::{Result, RiskError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Baseline FFMC used when no prior-day value is available
pub const BASELINE_FFMC: f64 = 85.0;
/// Baseline DMC used when no prior-day value is available
pub const BASELINE_DMC: f64 = 6.0;
/// Baseline DC used when no prior-day value is available
pub const BASELINE_DC: f64 = 15.0;

pub(crate) fn validate_month(stage: &'static str, month: u8) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(RiskError::numeric(stage, format!("month {month} outside 1-12")))
    }
}

/// Prior-cycle moisture state needed to compute today's codes
///
/// The baseline constants stand in for a real previous day. A deployment
/// that persists each location's indices should pass
/// [`FireIndices::carry_forward`] of yesterday's result instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarriedIndices {
    pub ffmc_prev: f64,
    pub dmc_prev: f64,
    pub dc_prev: f64,
    /// Calendar month (1-12) of the day being computed
    pub month: u8,
}

impl CarriedIndices {
    pub fn new(ffmc_prev: f64, dmc_prev: f64, dc_prev: f64, month: u8) -> Self {
        Self {
            ffmc_prev,
            dmc_prev,
            dc_prev,
            month,
        }
    }

    /// Baseline start-up codes (FFMC 85, DMC 6, DC 15) for `month`
    pub fn baseline(month: u8) -> Self {
        Self::new(BASELINE_FFMC, BASELINE_DMC, BASELINE_DC, month)
    }

    /// Same moisture codes, different month
    pub fn with_month(self, month: u8) -> Self {
        Self { month, ..self }
    }
}

/// The six indices for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireIndices {
    pub ffmc: f64,
    pub dmc: f64,
    pub dc: f64,
    pub isi: f64,
    pub bui: f64,
    pub fwi: f64,
}

impl FireIndices {
    /// Moisture codes to seed the following day's computation
    pub fn carry_forward(&self, month: u8) -> CarriedIndices {
        CarriedIndices::new(self.ffmc, self.dmc, self.dc, month)
    }
}

/// Stateless driver of the FWI formula chain
#[derive(Debug, Clone, Copy, Default)]
pub struct FireIndexEngine;

impl FireIndexEngine {
    /// Compute all six indices for one observation
    ///
    /// Deterministic: identical inputs give bit-identical outputs.
    pub fn compute(obs: &WeatherObservation, carried: &CarriedIndices) -> Result<FireIndices> {
        validate_month("carried", carried.month)?;
        let t = *obs.temperature;
        let rh = *obs.relative_humidity;
        let w = *obs.wind_speed;
        let r = *obs.rain;

        let ffmc = calculate_ffmc(t, rh, w, r, carried.ffmc_prev)?;
        let dmc = calculate_dmc(t, rh, r, carried.dmc_prev, carried.month)?;
        let dc = calculate_dc(t, r, carried.dc_prev, carried.month)?;
        let isi = calculate_isi(ffmc, w)?;
        let bui = calculate_bui(dmc, dc)?;
        let fwi = calculate_fwi(isi, bui)?;

        debug!(ffmc, dmc, dc, isi, bui, fwi, month = carried.month, "computed fire weather indices");
        Ok(FireIndices {
            ffmc,
            dmc,
            dc,
            isi,
            bui,
            fwi,
        })
    }

    /// Run consecutive daily observations, carrying each day's FFMC/DMC/DC
    /// into the next
    ///
    /// Each day's month comes from its provider-local timestamp when present,
    /// otherwise from the previous day's month. Stops at the first failure.
    pub fn compute_season(
        observations: &[WeatherObservation],
        initial: CarriedIndices,
    ) -> Result<Vec<FireIndices>> {
        let mut carried = initial;
        let mut season = Vec::with_capacity(observations.len());
        for obs in observations {
            let month = obs.local_month().unwrap_or(carried.month);
            let indices = Self::compute(obs, &carried.with_month(month))?;
            carried = indices.carry_forward(month);
            season.push(indices);
        }
        Ok(season)
    }

    /// Compute independent evaluations in parallel, preserving input order
    pub fn compute_batch(inputs: &[(WeatherObservation, CarriedIndices)]) -> Vec<Result<FireIndices>> {
        inputs
            .par_iter()
            .map(|(obs, carried)| Self::compute(obs, carried))
            .collect()
    }
}
