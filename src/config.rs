use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub simulation: SimConfig,
}

/// Horizons, windows and minimum-series lengths for every analyzer.
///
/// These were previously scattered inline; the orchestrator takes one of
/// these at construction time instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Months of projected peak demand per grid
    pub demand_horizon_months: u32,
    /// Months of projected values per monthly KPI
    pub kpi_horizon_months: u32,
    /// Rolling window for station and unit reliability
    pub reliability_window_days: u32,
    /// Minimum daily readings before a grid forecasts from daily data
    pub min_daily_points: usize,
    /// Minimum monthly points for KPI and fallback demand series
    pub min_monthly_points: usize,
    /// Recent daily values feeding the confidence band and growth rate
    pub recent_window_daily: usize,
    /// Recent monthly values feeding the confidence band
    pub recent_window_monthly: usize,
    /// Relative band around the first-half mean before shed is trending
    pub shed_trend_tolerance: f64,
    /// Relative band around the first-half mean before reliability is trending
    pub reliability_trend_tolerance: f64,
    /// Absolute slope band within which a KPI series is stable
    pub kpi_trend_slope_band: f64,
    /// Monthly KPIs the KPI engine projects
    pub kpi_catalog: Vec<String>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            demand_horizon_months: 24,
            kpi_horizon_months: 12,
            reliability_window_days: 90,
            min_daily_points: 7,
            min_monthly_points: 3,
            recent_window_daily: 30,
            recent_window_monthly: 6,
            shed_trend_tolerance: 0.10,
            reliability_trend_tolerance: 0.05,
            kpi_trend_slope_band: 0.1,
            kpi_catalog: vec![
                "system_availability_pct".into(),
                "collection_rate_pct".into(),
                "units_online_count".into(),
                "installed_capacity_mw".into(),
                "peak_demand_mw".into(),
                "energy_sent_out_mwh".into(),
            ],
        }
    }
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.demand_horizon_months == 0 || self.kpi_horizon_months == 0 {
            return Err("forecast horizons must be at least one month".to_string());
        }
        if self.reliability_window_days == 0 {
            return Err("reliability_window_days must be positive".to_string());
        }
        if self.min_monthly_points < 2 {
            return Err("min_monthly_points must be at least 2 for regression".to_string());
        }
        if self.recent_window_daily == 0 || self.recent_window_monthly == 0 {
            return Err("recent windows must be positive".to_string());
        }
        if self.shed_trend_tolerance < 0.0
            || self.reliability_trend_tolerance < 0.0
            || self.kpi_trend_slope_band < 0.0
        {
            return Err("trend tolerances must be non-negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
}

/// Synthetic-history settings for running without a database.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub history_days: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 7, history_days: 180 }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GRIDCAST__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = ForecastConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.demand_horizon_months, 24);
        assert_eq!(cfg.kpi_horizon_months, 12);
        assert_eq!(cfg.reliability_window_days, 90);
        assert_eq!(cfg.shed_trend_tolerance, 0.10);
        assert_eq!(cfg.reliability_trend_tolerance, 0.05);
        assert_eq!(cfg.kpi_trend_slope_band, 0.1);
    }

    #[test]
    fn test_validation_rejects_zero_horizon() {
        let cfg = ForecastConfig { demand_horizon_months: 0, ..ForecastConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = ForecastConfig { min_monthly_points: 1, ..ForecastConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = ForecastConfig { shed_trend_tolerance: -0.1, ..ForecastConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
