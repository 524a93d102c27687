//! Fire behaviour indices: ISI, BUI and FWI
//!
//! - **ISI** combines wind and fine fuel moisture into an expected rate of spread
//! - **BUI** combines DMC and DC into total fuel available for combustion
//! - **FWI** combines ISI and BUI into a fire intensity rating
//!
//! # Scientific References
//! - Van Wagner, C.E. (1987). Forestry Technical Report 35, Equations 24-30

use super::fine_fuel::ffmc_to_moisture;
use crate::error::{ensure_finite, Result};

/// BUI switches form where DMC crosses this fraction of DC
pub const BUI_DC_RATIO: f64 = 0.4;

/// FWI switches form above this BUI
pub const FWI_BUI_BREAKPOINT: f64 = 80.0;

/// Wind function coefficient of the ISI
const ISI_WIND_COEFFICIENT: f64 = 0.05039;

/// Calculate the Initial Spread Index from FFMC and wind speed (km/h)
///
/// FFMC above the moisture-zero point (about 101.05) has no real moisture
/// content, the fractional power is undefined and a domain error results.
pub fn calculate_isi(ffmc: f64, wind_speed: f64) -> Result<f64> {
    let mo = ffmc_to_moisture(ffmc);
    let wind_function = (ISI_WIND_COEFFICIENT * wind_speed).exp();
    let moisture_function = 91.9 * (-0.1386 * mo).exp() * (1.0 + mo.powf(5.31) / 4.93e7);
    ensure_finite("isi", "isi", 0.208 * wind_function * moisture_function)
}

/// Calculate the Buildup Index from DMC and DC, floored at zero
pub fn calculate_bui(dmc: f64, dc: f64) -> Result<f64> {
    let bui = if dmc <= BUI_DC_RATIO * dc {
        0.8 * dmc * dc / (dmc + BUI_DC_RATIO * dc)
    } else {
        dmc - (1.0 - 0.8 * dc / (dmc + BUI_DC_RATIO * dc))
    };
    Ok(ensure_finite("bui", "bui", bui)?.max(0.0))
}

/// Calculate the Fire Weather Index from ISI and BUI
pub fn calculate_fwi(isi: f64, bui: f64) -> Result<f64> {
    let fwi = if bui <= FWI_BUI_BREAKPOINT {
        isi * (0.1 * bui) / (0.1 + bui)
    } else {
        isi * (0.2 + 0.9 * bui) / (0.1 + bui)
    };
    ensure_finite("fwi", "fwi", fwi)
}
