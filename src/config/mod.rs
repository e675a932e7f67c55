//! Configuration module for the budget engine
//!
//! Engine-wide preferences: currency, status threshold, period cadence and
//! rollover defaults.

pub mod settings;

pub use settings::Settings;
