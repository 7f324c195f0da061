//! Forecast orchestrator
//!
//! Loads one input snapshot, runs every analyzer over it and submits the
//! combined bundle to the forecast store as a single atomic replace for the
//! generation date. The whole run is a pure function of the snapshot and
//! the date, so re-running for the same inputs reproduces the same bundle.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use itertools::Itertools;
use tracing::info;

use super::{capacity, demand::DemandForecaster, kpi::KpiForecastEngine, load_shedding, station,
    unit_risk};
use crate::config::ForecastConfig;
use crate::domain::{DailyGridReading, ForecastBundle, InputSnapshot};
use crate::repo::{ForecastStore, ReadingsStore};

pub struct ForecastOrchestrator {
    cfg: ForecastConfig,
    readings: Arc<dyn ReadingsStore>,
    forecasts: Arc<dyn ForecastStore>,
}

/// Outcome of one generation run: the in-memory bundle plus what was
/// actually written back.
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub bundle: ForecastBundle,
    pub rows_written: usize,
}

impl ForecastOrchestrator {
    pub fn new(
        cfg: ForecastConfig,
        readings: Arc<dyn ReadingsStore>,
        forecasts: Arc<dyn ForecastStore>,
    ) -> Self {
        Self { cfg, readings, forecasts }
    }

    /// Run all forecasts as of `today` and persist the result, replacing any
    /// prior generation for the same date.
    pub async fn run_for(&self, today: NaiveDate) -> Result<GenerationRun> {
        let snapshot = self
            .readings
            .load_snapshot(self.cfg.reliability_window_days, today)
            .await
            .context("loading input snapshot")?;

        let bundle = self.compute(&snapshot, today);

        info!(
            generated_on = %today,
            demand = bundle.demand.len(),
            capacity = bundle.capacity.len(),
            stations = bundle.stations.len(),
            units = bundle.units.len(),
            kpis = bundle.kpis.len(),
            "generation computed"
        );

        self.forecasts
            .replace_generation(today, &bundle)
            .await
            .context("persisting generation")?;

        let rows_written = bundle.row_count();
        Ok(GenerationRun { bundle, rows_written })
    }

    /// The deterministic core: every analyzer over one snapshot. Exposed so
    /// callers can recompute without touching the stores.
    pub fn compute(&self, snapshot: &InputSnapshot, today: NaiveDate) -> ForecastBundle {
        let mut bundle = ForecastBundle::new(today);

        let forecaster = DemandForecaster::new(&self.cfg);
        let grids: Vec<String> = snapshot
            .grid_readings
            .iter()
            .map(|r| r.grid.clone())
            .unique()
            .collect();
        for grid in &grids {
            let rows: Vec<DailyGridReading> = snapshot
                .grid_readings
                .iter()
                .filter(|r| &r.grid == grid)
                .cloned()
                .collect();
            let monthly = snapshot.monthly_peak_series(grid);
            let points = forecaster.forecast_grid(grid, &rows, &monthly, today);
            if let Some(timeline) = capacity::analyze_grid(grid, &rows, &points, today) {
                bundle.capacity.push(timeline);
            }
            bundle.demand.extend(points);
        }

        bundle.load_shedding = load_shedding::analyze(&snapshot.grid_readings, &self.cfg);
        bundle.stations = station::analyze(&snapshot.station_readings, &self.cfg);
        bundle.units = unit_risk::analyze(&snapshot.unit_readings);
        bundle.kpis = KpiForecastEngine::new(&self.cfg).forecast(&snapshot.kpi_points, today);

        bundle
    }
}
