//! Per-station reliability analysis
//!
//! Uptime, failure transitions, MTBF and trend over the rolling window,
//! from daily online/offline unit counts. A failure is a strictly adjacent
//! day-to-day transition from at least one unit online to none; a calendar
//! gap in the series is not a transition.

use chrono::NaiveDate;
use itertools::Itertools;
use tracing::debug;

use super::half_means;
use crate::config::ForecastConfig;
use crate::domain::{DailyStationReading, ReliabilityRisk, ReliabilityTrend, StationReliability};

pub fn analyze(readings: &[DailyStationReading], cfg: &ForecastConfig) -> Vec<StationReliability> {
    let stations: Vec<&str> = readings.iter().map(|r| r.station.as_str()).unique().collect();

    let mut out: Vec<StationReliability> = stations
        .into_iter()
        .filter_map(|station| {
            let rows: Vec<&DailyStationReading> =
                readings.iter().filter(|r| r.station == station).collect();
            analyze_station(station, &rows, cfg)
        })
        .collect();

    // Worst first; stable sort preserves input order within a band.
    out.sort_by_key(|s| s.risk_level);
    out
}

fn analyze_station(
    station: &str,
    rows: &[&DailyStationReading],
    cfg: &ForecastConfig,
) -> Option<StationReliability> {
    // Days where the online count was actually reported
    let flags: Vec<(NaiveDate, bool)> = rows
        .iter()
        .filter_map(|r| r.units_online.map(|n| (r.date, n > 0)))
        .collect();
    if flags.is_empty() {
        debug!(station, "no reported days in window, skipping station");
        return None;
    }

    let total_days = flags.len();
    let online_days = flags.iter().filter(|(_, online)| *online).count();
    let uptime_pct = online_days as f64 / total_days as f64 * 100.0;

    let failure_count = count_failures(&flags);
    let mtbf_days = if failure_count > 0 {
        total_days as f64 / failure_count as f64
    } else {
        // No observed failure: the observation window is the floor
        total_days as f64
    };

    let online_series: Vec<f64> =
        flags.iter().map(|(_, online)| if *online { 1.0 } else { 0.0 }).collect();
    let tolerance = cfg.reliability_trend_tolerance;
    let trend = match half_means(&online_series) {
        Some((first, second)) if second > first * (1.0 + tolerance) => {
            ReliabilityTrend::Improving
        }
        Some((first, second)) if second < first * (1.0 - tolerance) => {
            ReliabilityTrend::Declining
        }
        _ => ReliabilityTrend::Stable,
    };

    let utilizations: Vec<f64> = rows.iter().filter_map(|r| r.utilization_pct).collect();
    let avg_utilization_pct = if utilizations.is_empty() {
        0.0
    } else {
        utilizations.iter().sum::<f64>() / utilizations.len() as f64
    };

    let latest = rows.last()?;

    Some(StationReliability {
        station: station.to_string(),
        period_days: cfg.reliability_window_days,
        uptime_pct,
        avg_utilization_pct,
        total_units: latest.total_units.unwrap_or(0),
        online_units: latest.units_online.unwrap_or(0),
        offline_units: latest.units_offline.unwrap_or(0),
        failure_count,
        mtbf_days,
        trend,
        risk_level: ReliabilityRisk::from_uptime(uptime_pct),
    })
}

/// Transitions from online to fully offline across strictly adjacent days.
pub(crate) fn count_failures(flags: &[(NaiveDate, bool)]) -> u32 {
    flags
        .windows(2)
        .filter(|w| {
            let (prev_date, prev_online) = w[0];
            let (date, online) = w[1];
            prev_online && !online && (date - prev_date).num_days() == 1
        })
        .count() as u32
}
