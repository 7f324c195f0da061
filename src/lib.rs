//! Gridcast - deterministic grid operations analytics
//!
//! Turns historical daily and monthly operational readings into
//! forward-looking projections: demand growth, capacity-shortfall timing,
//! load-shedding trend, per-station reliability and per-unit failure risk.

pub mod analytics;
pub mod config;
pub mod domain;
pub mod repo;
#[cfg(feature = "sim")]
pub mod simulation;
pub mod stats;
pub mod telemetry;
