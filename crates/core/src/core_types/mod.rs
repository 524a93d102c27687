//! Core types and utilities

pub mod spatial;
pub mod units;
pub mod weather;

pub use spatial::Coordinates;
pub use units::*;
pub use weather::WeatherObservation;
