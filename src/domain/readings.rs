//! Strongly typed input rows for the analytics engine
//!
//! Every numeric field the source system may omit is optional here; string
//! to number parsing happens at the store boundary, never in the analyzers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Daily operational status of a generating unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnitStatus {
    Online,
    Offline,
}

impl UnitStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// One daily reading per grid: capacity, peaks, utilization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGridReading {
    pub date: NaiveDate,
    pub grid: String,
    pub total_capacity_mw: Option<f64>,
    pub expected_peak_mw: Option<f64>,
    pub served_peak_mw: Option<f64>,
    pub suppressed_peak_mw: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub reserve_margin_pct: Option<f64>,
    pub sub_grid_capacity_mw: Vec<f64>,
    pub renewable_capacity_mw: Option<f64>,
}

/// One daily reading per station, confirmed data batches only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStationReading {
    pub date: NaiveDate,
    pub station: String,
    pub total_units: Option<u32>,
    pub units_online: Option<u32>,
    pub units_offline: Option<u32>,
    pub units_no_data: Option<u32>,
    pub derated_capacity_mw: Option<f64>,
    pub available_capacity_mw: Option<f64>,
    pub utilization_pct: Option<f64>,
}

/// One daily reading per generating unit, confirmed data batches only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUnitReading {
    pub date: NaiveDate,
    pub station: String,
    pub engine: String,
    pub unit_id: String,
    pub derated_capacity_mw: Option<f64>,
    pub available_capacity_mw: Option<f64>,
    pub status: UnitStatus,
    pub utilization_pct: Option<f64>,
}

/// One monthly KPI value; unique per (month, kpi)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyKpiPoint {
    /// First day of the month the value belongs to
    pub month: NaiveDate,
    pub kpi: String,
    pub value: f64,
}

/// Everything one generation run reads, fetched in one shot.
///
/// Series are sorted ascending by date once here so the analyzers can rely
/// on ordering without re-sorting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub grid_readings: Vec<DailyGridReading>,
    pub station_readings: Vec<DailyStationReading>,
    pub unit_readings: Vec<DailyUnitReading>,
    pub kpi_points: Vec<MonthlyKpiPoint>,
}

impl InputSnapshot {
    /// Sort every series ascending by date. Stores call this before handing
    /// the snapshot to the orchestrator.
    pub fn normalize(&mut self) {
        self.grid_readings.sort_by_key(|r| r.date);
        self.station_readings.sort_by_key(|r| r.date);
        self.unit_readings.sort_by_key(|r| r.date);
        self.kpi_points.sort_by_key(|p| p.month);
    }

    /// Monthly peak-demand series for a grid, keyed by KPI name convention
    /// `peak_demand_<grid>` (lowercased).
    pub fn monthly_peak_series(&self, grid: &str) -> Vec<&MonthlyKpiPoint> {
        let key = format!("peak_demand_{}", grid.to_ascii_lowercase());
        self.kpi_points.iter().filter(|p| p.kpi == key).collect()
    }
}
