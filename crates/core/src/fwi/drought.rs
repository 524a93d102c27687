//! Drought Code (DC)
//!
//! Deep, slow-drying moisture of compact organic matter. Seasonal drying is
//! scaled by a monthly day-length factor.
//!
//! # Scientific References
//! - Van Wagner, C.E. (1987). Forestry Technical Report 35, Equations 18-23
//! - Turner, J.A. (1972). "The drought code component of the Canadian Forest
//!   Fire Behaviour System"

use super::validate_month;
use crate::error::{ensure_finite, Result, RiskError};

/// Rain at or below this depth (mm) has no effect on the drought code
pub const DC_RAIN_THRESHOLD_MM: f64 = 2.8;

/// Temperatures below this floor are treated as the floor
pub const DC_TEMPERATURE_FLOOR_C: f64 = -2.8;

/// Day-length adjustment factor per month (January first)
pub const DC_DAY_LENGTH_FACTORS: [f64; 12] =
    [6.5, 8.0, 9.7, 12.0, 15.3, 18.2, 20.4, 19.1, 17.2, 13.9, 10.0, 7.0];

const STAGE: &str = "dc";

/// Effective rainfall for the drought layer, never negative
pub(crate) fn effective_rain(rain: f64) -> f64 {
    (0.83 * rain - 1.27).max(0.0)
}

/// Calculate today's DC
///
/// # Arguments
/// * `temperature` - Noon air temperature (°C), floored at -2.8
/// * `rain` - 24h rain (mm)
/// * `previous_dc` - Yesterday's DC
/// * `month` - Calendar month (1-12), selects the day-length factor
///
/// # Errors
/// [`RiskError::NumericDomain`] when the moisture equivalent is not strictly
/// positive, since the logarithm would be undefined.
pub fn calculate_dc(temperature: f64, rain: f64, previous_dc: f64, month: u8) -> Result<f64> {
    validate_month(STAGE, month)?;
    let temperature = temperature.max(DC_TEMPERATURE_FLOOR_C);
    let day_length = DC_DAY_LENGTH_FACTORS[usize::from(month - 1)];
    let rw = effective_rain(rain);

    let mut smi = 800.0 * (-previous_dc / 400.0).exp();
    if rain > DC_RAIN_THRESHOLD_MM {
        smi += 3.937 * rw / (previous_dc + 104.0);
    }
    if !(smi.is_finite() && smi > 0.0) {
        return Err(RiskError::numeric(
            STAGE,
            format!("moisture equivalent {smi} must be positive"),
        ));
    }

    let dc = 400.0 * (800.0 / smi).ln()
        + day_length * (temperature - DC_TEMPERATURE_FLOOR_C) * 0.036;
    ensure_finite(STAGE, "dc", dc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dry_day_adds_seasonal_drying() {
        // With no rain the log term recovers yesterday's value exactly
        let dc = calculate_dc(20.0, 0.0, 15.0, 7).unwrap();
        assert_relative_eq!(dc, 15.0 + 20.4 * 22.8 * 0.036, epsilon = 1e-9);
    }

    #[test]
    fn test_temperature_floor() {
        let at_floor = calculate_dc(DC_TEMPERATURE_FLOOR_C, 0.0, 15.0, 1).unwrap();
        let colder = calculate_dc(-20.0, 0.0, 15.0, 1).unwrap();
        assert_eq!(at_floor, colder);
        assert_relative_eq!(colder, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_effective_rain_clamped() {
        assert_eq!(effective_rain(0.0), 0.0);
        assert_eq!(effective_rain(1.0), 0.0);
        assert_relative_eq!(effective_rain(10.0), 7.03, epsilon = 1e-12);
    }

    #[test]
    fn test_month_selects_day_length() {
        let jan = calculate_dc(20.0, 0.0, 15.0, 1).unwrap();
        let jul = calculate_dc(20.0, 0.0, 15.0, 7).unwrap();
        assert!(jul > jan);
    }

    #[test]
    fn test_month_zero_rejected() {
        assert!(calculate_dc(20.0, 0.0, 15.0, 0).is_err());
    }

    #[test]
    fn test_saturated_log_is_domain_error() {
        // exp(-1e6 / 400) underflows to zero
        let err = calculate_dc(20.0, 0.0, 1.0e6, 7).unwrap_err();
        assert!(matches!(err, RiskError::NumericDomain { stage: "dc", .. }));
    }
}
