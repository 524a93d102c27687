//! Fine Fuel Moisture Code (FFMC)
//!
//! Tracks the moisture content of surface litter and other cured fine fuels.
//! The code runs on a 0-101 scale where higher values mean drier fuel.
//!
//! # Phases
//! 1. Convert yesterday's FFMC to moisture content `mo`
//! 2. Rain phase: rainfall above a 0.5 mm dead-band is absorbed into `mo`
//! 3. Equilibrium phase: drying (`Ed`) and wetting (`Ew`) equilibrium moisture
//! 4. Drying or wetting toward the equilibrium, then back to the FFMC scale
//!
//! # Scientific References
//! - Van Wagner, C.E. (1987). "Development and structure of the Canadian Forest
//!   Fire Weather Index System". Forestry Technical Report 35
//! - Van Wagner, C.E. & Pickett, T.L. (1985). "Equations and FORTRAN program for
//!   the Canadian Forest Fire Weather Index System"

use crate::core_types::units::Percent;
use crate::error::{ensure_finite, Result, RiskError};

/// Rain at or below this depth (mm) has no effect on fine fuel moisture
pub const FFMC_RAIN_THRESHOLD_MM: f64 = 0.5;

/// Scale factor linking FFMC and moisture content
pub(crate) const FFMC_MOISTURE_SCALE: f64 = 147.2;

/// Largest FFMC the back-conversion can produce (moisture content 0)
pub const FFMC_CEILING: f64 = 59.5 * 250.0 / FFMC_MOISTURE_SCALE;

const STAGE: &str = "ffmc";

/// Moisture content (%) corresponding to an FFMC value
#[inline]
pub(crate) fn ffmc_to_moisture(ffmc: f64) -> f64 {
    FFMC_MOISTURE_SCALE * (101.0 - ffmc) / (59.5 + ffmc)
}

/// Rain absorption into fine fuel moisture
///
/// Only rain beyond the dead-band counts; `rf = R - 0.5`.
fn apply_rain(mo: f64, rain: f64) -> f64 {
    if rain <= FFMC_RAIN_THRESHOLD_MM {
        return mo;
    }
    let rf = rain - FFMC_RAIN_THRESHOLD_MM;
    mo + 42.5 * rf * (-100.0 / (251.0 - mo)).exp() * (1.0 - (-6.93 / rf).exp())
}

/// Shared temperature/humidity term of both equilibrium curves
fn equilibrium_temperature_term(temperature: f64, relative_humidity: f64) -> f64 {
    0.18 * (21.1 - temperature) * (1.0 - 1.0 / (0.115 * relative_humidity).exp())
}

/// Drying equilibrium moisture content `Ed`
pub(crate) fn drying_equilibrium(temperature: f64, relative_humidity: f64) -> f64 {
    0.942 * relative_humidity.powf(0.679)
        + 11.0 * ((relative_humidity - 100.0) / 10.0).exp()
        + equilibrium_temperature_term(temperature, relative_humidity)
}

/// Wetting equilibrium moisture content `Ew`
pub(crate) fn wetting_equilibrium(temperature: f64, relative_humidity: f64) -> f64 {
    0.618 * relative_humidity.powf(0.753)
        + 10.0 * ((relative_humidity - 100.0) / 10.0).exp()
        + equilibrium_temperature_term(temperature, relative_humidity)
}

/// Log rate constant for moisture exchange
///
/// `humidity_ratio` is RH/100 on the drying path and (100-RH)/100 on the
/// wetting path.
fn exchange_rate(temperature: f64, wind_speed: f64, humidity_ratio: f64) -> f64 {
    let k1 = 0.424 * (1.0 - humidity_ratio.powf(1.7))
        + 0.0694 * wind_speed.sqrt() * (1.0 - humidity_ratio.powi(8));
    k1 * (0.581 * (0.0365 * temperature).exp())
}

/// Calculate today's FFMC
///
/// # Arguments
/// * `temperature` - Noon air temperature (°C)
/// * `relative_humidity` - Relative humidity (%)
/// * `wind_speed` - Wind speed (km/h)
/// * `rain` - 24h rain (mm)
/// * `previous_ffmc` - Yesterday's FFMC
///
/// # Returns
/// FFMC, or [`RiskError::NumericDomain`] if any intermediate is non-finite.
///
/// The branch is on `mo < Ed`: below the drying equilibrium the drying-rate
/// path pulls toward `Ed`, otherwise (including `Ew <= mo <= Ed`) the
/// wetting-rate path is used with `Ew`.
pub fn calculate_ffmc(
    temperature: f64,
    relative_humidity: f64,
    wind_speed: f64,
    rain: f64,
    previous_ffmc: f64,
) -> Result<f64> {
    let mo = ensure_finite(STAGE, "mo", ffmc_to_moisture(previous_ffmc))?;
    let mo = ensure_finite(STAGE, "mo after rain", apply_rain(mo, rain))?;

    let ed = ensure_finite(STAGE, "Ed", drying_equilibrium(temperature, relative_humidity))?;
    let ew = ensure_finite(STAGE, "Ew", wetting_equilibrium(temperature, relative_humidity))?;

    let m = if mo < ed {
        let kw = exchange_rate(temperature, wind_speed, Percent::new(relative_humidity).to_fraction());
        ed - (ed - mo) * (1.0 - (-kw).exp())
    } else {
        let kw = exchange_rate(
            temperature,
            wind_speed,
            Percent::new(100.0 - relative_humidity).to_fraction(),
        );
        ew + (mo - ew) * (1.0 - (-kw).exp())
    };
    let m = ensure_finite(STAGE, "m", m)?;

    let denominator = FFMC_MOISTURE_SCALE + m;
    if denominator == 0.0 {
        return Err(RiskError::numeric(STAGE, "moisture content m = -147.2"));
    }
    ensure_finite(STAGE, "ffmc", 59.5 * (250.0 - m) / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_moisture_conversion_round_trip_points() {
        // FFMC 101 is bone dry, FFMC 0 is saturated
        assert_relative_eq!(ffmc_to_moisture(101.0), 0.0);
        assert_relative_eq!(ffmc_to_moisture(85.0), 147.2 * 16.0 / 144.5);
    }

    #[test]
    fn test_reference_dry_day() {
        let ffmc = calculate_ffmc(20.0, 40.0, 10.0, 0.0, 85.0).unwrap();
        assert_relative_eq!(ffmc, 88.226_272_034_101, epsilon = 1e-9);
    }

    #[test]
    fn test_reference_humid_day_below_drying_equilibrium() {
        // mo = 2.80 < Ed = 25.14, so moisture is pulled up toward Ed
        let ffmc = calculate_ffmc(15.0, 90.0, 5.0, 0.0, 98.0).unwrap();
        assert_relative_eq!(ffmc, 80.288_251_544_671, epsilon = 1e-9);
    }

    #[test]
    fn test_rain_below_dead_band_is_ignored() {
        let dry = calculate_ffmc(20.0, 40.0, 10.0, 0.0, 85.0).unwrap();
        let drizzle = calculate_ffmc(20.0, 40.0, 10.0, FFMC_RAIN_THRESHOLD_MM, 85.0).unwrap();
        assert_eq!(dry, drizzle);
    }

    #[test]
    fn test_heavy_rain_lowers_ffmc() {
        let dry = calculate_ffmc(15.0, 80.0, 5.0, 0.0, 85.0).unwrap();
        let wet = calculate_ffmc(15.0, 80.0, 5.0, 10.0, 85.0).unwrap();
        assert!(wet < dry - 20.0, "rain should wet fine fuels: {wet} vs {dry}");
    }

    #[test]
    fn test_equilibria_order() {
        // Drying equilibrium sits above wetting equilibrium
        for rh in [10.0, 40.0, 70.0, 95.0] {
            assert!(drying_equilibrium(20.0, rh) > wetting_equilibrium(20.0, rh));
        }
    }

    #[test]
    fn test_negative_wind_is_a_domain_error() {
        let err = calculate_ffmc(20.0, 40.0, -4.0, 0.0, 85.0).unwrap_err();
        assert!(matches!(err, RiskError::NumericDomain { stage: "ffmc", .. }));
    }
}
