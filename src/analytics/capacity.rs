//! Capacity adequacy analysis
//!
//! Combines the latest known installed capacity and demand for a grid with
//! its demand forecast to find the reserve margin and the first month, if
//! any, where projected demand overtakes capacity.

use chrono::NaiveDate;
use tracing::debug;

use super::months_between;
use crate::domain::{CapacityTimeline, DailyGridReading, DemandForecastPoint, RiskLevel};

/// Analyze one grid. `readings` must contain only this grid's rows, sorted
/// ascending. Returns `None` when the grid has no usable capacity or demand
/// reading yet.
pub fn analyze_grid(
    grid: &str,
    readings: &[DailyGridReading],
    forecast: &[DemandForecastPoint],
    today: NaiveDate,
) -> Option<CapacityTimeline> {
    let capacity = readings.iter().rev().find_map(|r| r.total_capacity_mw)?;
    if capacity <= 0.0 {
        debug!(grid, capacity, "non-positive installed capacity, skipping grid");
        return None;
    }
    // Served peak is the demand actually observed; fall back to the expected
    // peak on days where serving data is missing.
    let demand = readings
        .iter()
        .rev()
        .find_map(|r| r.served_peak_mw.or(r.expected_peak_mw))?;

    let reserve_margin_pct = (capacity - demand) / capacity * 100.0;

    let shortfall_month = forecast
        .iter()
        .find(|p| p.projected_peak_mw > capacity)
        .map(|p| p.projected_month);

    Some(CapacityTimeline {
        grid: grid.to_string(),
        current_capacity_mw: capacity,
        // Flat across the horizon; no planned-additions model yet.
        projected_capacity_mw: capacity,
        shortfall_month,
        reserve_margin_pct,
        months_until_shortfall: shortfall_month.map(|m| months_between(today, m)),
        risk_level: RiskLevel::from_reserve_margin(reserve_margin_pct),
    })
}
