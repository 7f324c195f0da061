//! Per-grid peak-demand projection
//!
//! Fits a least-squares line through the grid's peak-demand history and
//! projects it a fixed number of months forward with a ±2σ confidence band.
//! Daily readings are preferred; a grid with thin daily history falls back
//! to its monthly peak-demand KPI series. Grids with insufficient data in
//! both granularities contribute no points.

use chrono::NaiveDate;
use tracing::debug;

use super::project_month;
use crate::config::ForecastConfig;
use crate::domain::{DailyGridReading, DataSource, DemandForecastPoint, MonthlyKpiPoint};
use crate::stats;

pub struct DemandForecaster<'a> {
    cfg: &'a ForecastConfig,
}

impl<'a> DemandForecaster<'a> {
    pub fn new(cfg: &'a ForecastConfig) -> Self {
        Self { cfg }
    }

    /// Forecast peak demand for one grid. `daily` must contain only this
    /// grid's rows, sorted ascending; `monthly` is its monthly peak series.
    pub fn forecast_grid(
        &self,
        grid: &str,
        daily: &[DailyGridReading],
        monthly: &[&MonthlyKpiPoint],
        today: NaiveDate,
    ) -> Vec<DemandForecastPoint> {
        let daily_values: Vec<f64> = daily.iter().filter_map(|r| r.served_peak_mw).collect();

        let (values, source) = if daily_values.len() >= self.cfg.min_daily_points {
            (daily_values, DataSource::Daily)
        } else {
            let monthly_values: Vec<f64> = monthly.iter().map(|p| p.value).collect();
            if monthly_values.len() < self.cfg.min_monthly_points {
                debug!(grid, daily = daily_values.len(), monthly = monthly_values.len(),
                    "insufficient demand history, skipping grid");
                return Vec::new();
            }
            (monthly_values, DataSource::Monthly)
        };

        // Days per projected month on a daily series; one index per month on
        // a monthly one.
        let (step, recent_window) = match source {
            DataSource::Daily => (30.0, self.cfg.recent_window_daily),
            DataSource::Monthly => (1.0, self.cfg.recent_window_monthly),
        };

        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();
        let fit = stats::linear_regression(&points);

        let recent = &values[values.len().saturating_sub(recent_window)..];
        let band = 2.0 * stats::std_dev(recent);
        let recent_mean = recent.iter().sum::<f64>() / recent.len() as f64;
        let growth_rate_pct = if recent_mean.abs() > f64::EPSILON {
            fit.slope * step / recent_mean * 100.0
        } else {
            0.0
        };

        let len = values.len() as f64;
        (1..=self.cfg.demand_horizon_months)
            .map(|m| {
                let x = match source {
                    DataSource::Daily => len + m as f64 * step,
                    DataSource::Monthly => len + m as f64 - 1.0,
                };
                let projected = fit.predict(x);
                DemandForecastPoint {
                    grid: grid.to_string(),
                    projected_month: project_month(today, m),
                    projected_peak_mw: projected,
                    confidence_low_mw: (projected - band).max(0.0),
                    confidence_high_mw: projected + band,
                    growth_rate_pct,
                    data_source: source,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_rows(start: NaiveDate, peaks: &[Option<f64>]) -> Vec<DailyGridReading> {
        peaks
            .iter()
            .enumerate()
            .map(|(i, p)| DailyGridReading {
                date: start + Days::new(i as u64),
                grid: "Coastal".into(),
                total_capacity_mw: Some(560.0),
                expected_peak_mw: None,
                served_peak_mw: *p,
                suppressed_peak_mw: None,
                utilization_pct: None,
                reserve_margin_pct: None,
                sub_grid_capacity_mw: vec![],
                renewable_capacity_mw: None,
            })
            .collect()
    }

    #[test]
    fn test_daily_series_linear_growth() {
        let cfg = ForecastConfig::default();
        let start = date(2026, 1, 1);
        // 60 days at 300 + 0.5/day
        let peaks: Vec<Option<f64>> = (0..60).map(|d| Some(300.0 + 0.5 * d as f64)).collect();
        let rows = daily_rows(start, &peaks);
        let today = date(2026, 3, 2);

        let out = DemandForecaster::new(&cfg).forecast_grid("Coastal", &rows, &[], today);
        assert_eq!(out.len(), 24);
        assert!(out.iter().all(|p| p.data_source == DataSource::Daily));
        assert_eq!(out[0].projected_month, date(2026, 4, 1));

        // First projected month: x = 60 + 30, y = 300 + 0.5 * 90
        assert!((out[0].projected_peak_mw - 345.0).abs() < 1e-6);
        // Monthly growth: 0.5 * 30 / mean(last 30 values) * 100
        let recent_mean = 300.0 + 0.5 * (30.0 + 59.0) / 2.0;
        assert!((out[0].growth_rate_pct - 15.0 / recent_mean * 100.0).abs() < 1e-9);
        // Projections strictly increase with the fitted slope
        assert!(out[23].projected_peak_mw > out[0].projected_peak_mw);
    }

    #[test]
    fn test_falls_back_to_monthly_series() {
        let cfg = ForecastConfig::default();
        let rows = daily_rows(date(2026, 1, 1), &[Some(300.0), None, Some(301.0)]);
        let monthly: Vec<MonthlyKpiPoint> = (0..6)
            .map(|m| MonthlyKpiPoint {
                month: project_month(date(2025, 6, 15), m),
                kpi: "peak_demand_coastal".into(),
                value: 280.0 + 4.0 * m as f64,
            })
            .collect();
        let refs: Vec<&MonthlyKpiPoint> = monthly.iter().collect();

        let out =
            DemandForecaster::new(&cfg).forecast_grid("Coastal", &rows, &refs, date(2026, 1, 10));
        assert_eq!(out.len(), 24);
        assert!(out.iter().all(|p| p.data_source == DataSource::Monthly));
        // x = 6 + 1 - 1 = 6 for the first projected month
        assert!((out[0].projected_peak_mw - (280.0 + 4.0 * 6.0)).abs() < 1e-6);
    }

    #[test]
    fn test_insufficient_history_yields_no_points() {
        let cfg = ForecastConfig::default();
        let rows = daily_rows(date(2026, 1, 1), &[Some(300.0), Some(301.0)]);
        let out =
            DemandForecaster::new(&cfg).forecast_grid("Coastal", &rows, &[], date(2026, 1, 10));
        assert!(out.is_empty());
    }

    #[test]
    fn test_confidence_band_straddles_projection() {
        let cfg = ForecastConfig::default();
        let peaks: Vec<Option<f64>> =
            (0..40).map(|d| Some(300.0 + if d % 2 == 0 { 5.0 } else { -5.0 })).collect();
        let rows = daily_rows(date(2026, 1, 1), &peaks);
        let out =
            DemandForecaster::new(&cfg).forecast_grid("Coastal", &rows, &[], date(2026, 2, 10));
        let p = &out[0];
        assert!(p.confidence_low_mw < p.projected_peak_mw);
        assert!(p.confidence_high_mw > p.projected_peak_mw);
        // band = 2 * population std dev of the alternating ±5 series = 10
        assert!((p.confidence_high_mw - p.projected_peak_mw - 10.0).abs() < 1e-6);
    }
}
