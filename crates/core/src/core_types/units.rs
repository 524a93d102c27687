//! Semantic unit types for meteorological quantities
//!
//! Newtype wrappers keep temperature, humidity, wind and rainfall apart at the
//! type level so an observation cannot be assembled with its fields swapped.
//!
//! # Design Philosophy
//! - All quantities use f64 to match the precision of the index formulas
//! - `Deref` exposes the raw value for use inside closed-form equations
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - Serde support for serialization (serialized as the bare number)
//!
//! # Usage
//! ```
//! use fire_risk_core::core_types::units::{Celsius, Percent};
//!
//! let temp = Celsius::new(25.0);
//! assert_eq!(*temp, 25.0);
//!
//! let rh = Percent::new(40.0);
//! assert!((rh.to_fraction() - 0.4).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2}{}", self.0, $unit)
            }
        }
    };
}

quantity!(
    /// Air temperature in degrees Celsius (2 m above ground)
    Celsius,
    "°C"
);

quantity!(
    /// Relative humidity in percent (0-100)
    Percent,
    "%"
);

quantity!(
    /// Wind speed in km/h (10 m above ground)
    KilometersPerHour,
    " km/h"
);

quantity!(
    /// Liquid water depth in millimetres
    Millimeters,
    " mm"
);

impl Percent {
    /// Convert to fraction (0-1)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f64 {
        self.0 / 100.0
    }
}
