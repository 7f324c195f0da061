//! Load-shedding gap analysis
//!
//! Daily shed is the suppressed-vs-served demand gap, summed across grids
//! that report both peaks that day. The summary is system-wide: one row per
//! generation run.

use std::collections::BTreeMap;

use crate::config::ForecastConfig;
use crate::domain::{DailyGridReading, LoadSheddingSummary, Trend};
use crate::stats;

use super::half_means;

/// Six months of daily observations, for the forward projection.
const PROJECTION_DAYS: f64 = 180.0;

pub fn analyze(readings: &[DailyGridReading], cfg: &ForecastConfig) -> LoadSheddingSummary {
    // Shed per calendar day; BTreeMap keeps dates ascending.
    let mut by_date: BTreeMap<chrono::NaiveDate, f64> = BTreeMap::new();
    for r in readings {
        if let (Some(suppressed), Some(served)) = (r.suppressed_peak_mw, r.served_peak_mw) {
            *by_date.entry(r.date).or_insert(0.0) += (suppressed - served).max(0.0);
        }
    }

    let series: Vec<f64> = by_date.into_values().collect();
    if series.is_empty() {
        return LoadSheddingSummary::default();
    }

    let n = series.len();
    let avg_shed_mw = series.iter().sum::<f64>() / n as f64;
    let max_shed_mw = series.iter().fold(0.0f64, |a, &b| a.max(b));
    let shed_days_count = series.iter().filter(|&&v| v > 0.0).count() as u32;

    let tolerance = cfg.shed_trend_tolerance;
    let trend = match half_means(&series) {
        Some((first, second)) if second > first * (1.0 + tolerance) => Trend::Increasing,
        Some((first, second)) if second < first * (1.0 - tolerance) => Trend::Decreasing,
        _ => Trend::Stable,
    };

    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    let fit = stats::linear_regression(&points);
    let projected_avg_6mo = fit.predict(n as f64 + PROJECTION_DAYS).max(0.0);

    LoadSheddingSummary {
        period_days: n as u32,
        avg_shed_mw,
        max_shed_mw,
        shed_days_count,
        trend,
        projected_avg_6mo,
    }
}
