//! Generic monthly-KPI projection
//!
//! Fits each catalog KPI's monthly series and projects it a fixed horizon
//! forward, with domain clamps applied after projection: percent-style KPIs
//! stay inside [0, 100], counts and capacities never go negative.

use chrono::NaiveDate;
use tracing::debug;

use super::project_month;
use crate::config::ForecastConfig;
use crate::domain::{KpiForecastPoint, MonthlyKpiPoint, Trend};
use crate::stats;

pub struct KpiForecastEngine<'a> {
    cfg: &'a ForecastConfig,
}

impl<'a> KpiForecastEngine<'a> {
    pub fn new(cfg: &'a ForecastConfig) -> Self {
        Self { cfg }
    }

    /// Project every catalog KPI with enough history. `kpi_points` must be
    /// sorted ascending by month.
    pub fn forecast(&self, kpi_points: &[MonthlyKpiPoint], today: NaiveDate) -> Vec<KpiForecastPoint> {
        self.cfg
            .kpi_catalog
            .iter()
            .flat_map(|name| self.forecast_one(name, kpi_points, today))
            .collect()
    }

    fn forecast_one(
        &self,
        name: &str,
        kpi_points: &[MonthlyKpiPoint],
        today: NaiveDate,
    ) -> Vec<KpiForecastPoint> {
        // Months where this KPI is absent are simply skipped
        let values: Vec<f64> = kpi_points
            .iter()
            .filter(|p| p.kpi == name)
            .map(|p| p.value)
            .collect();
        if values.len() < self.cfg.min_monthly_points {
            debug!(kpi = name, points = values.len(), "insufficient KPI history, skipping");
            return Vec::new();
        }

        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
            .collect();
        let fit = stats::linear_regression(&points);

        let slope_band = self.cfg.kpi_trend_slope_band;
        let trend = if fit.slope > slope_band {
            Trend::Increasing
        } else if fit.slope < -slope_band {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        let recent = &values[values.len().saturating_sub(self.cfg.recent_window_monthly)..];
        let band = 2.0 * stats::std_dev(recent);

        let n = values.len() as f64;
        (1..=self.cfg.kpi_horizon_months)
            .map(|m| {
                let projected = fit.predict(n + m as f64 - 1.0);
                KpiForecastPoint {
                    kpi: name.to_string(),
                    projected_month: project_month(today, m),
                    projected_value: apply_domain_clamp(name, projected),
                    confidence_low: apply_domain_clamp(name, projected - band),
                    confidence_high: apply_domain_clamp(name, projected + band),
                    trend,
                }
            })
            .collect()
    }
}

/// Post-projection clamp derived from the KPI's name: percent markers bound
/// the value to [0, 100]; count and capacity markers floor it at zero.
fn apply_domain_clamp(kpi: &str, value: f64) -> f64 {
    let name = kpi.to_ascii_lowercase();
    if name.contains("pct") || name.contains('%') || name.contains("percent") {
        value.clamp(0.0, 100.0)
    } else if ["count", "units", "mw", "capacity"].iter().any(|m| name.contains(m)) {
        value.max(0.0)
    } else {
        value
    }
}
