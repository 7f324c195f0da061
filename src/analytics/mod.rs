//! Domain analyzers and the orchestrator that runs them
//!
//! Each analyzer is a pure function of already-sorted input rows; only the
//! orchestrator touches the stores.

pub mod capacity;
pub mod demand;
pub mod engine;
pub mod kpi;
pub mod load_shedding;
pub mod station;
pub mod unit_risk;

pub use engine::*;

use chrono::{Datelike, Days, Months, NaiveDate};

/// Mean of the first and second half of a series, split at the midpoint.
/// `None` when the series is too short to split (fewer than 2 values).
pub(crate) fn half_means(values: &[f64]) -> Option<(f64, f64)> {
    let mid = values.len() / 2;
    if mid == 0 {
        return None;
    }
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    Some((mean(&values[..mid]), mean(&values[mid..])))
}

/// First day of the month `months_ahead` months after `today`.
pub(crate) fn project_month(today: NaiveDate, months_ahead: u32) -> NaiveDate {
    month_start(today + Months::new(months_ahead))
}

/// First day of `date`'s month.
pub(crate) fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Whole-month difference between two dates, by calendar month index.
pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}
