//! Output records produced by a generation run
//!
//! Every record is an immutable snapshot tagged (via its bundle) with the
//! generation date; a later run for the same date supersedes it wholesale.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Which series granularity produced a demand forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DataSource {
    Daily,
    Monthly,
}

/// Direction of a fitted or split-compared series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Reliability direction for stations (same split rule, different labels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReliabilityTrend {
    Improving,
    Declining,
    Stable,
}

/// Capacity adequacy risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    Critical,
    Warning,
    Safe,
}

impl RiskLevel {
    /// Margins below 5% are critical; a margin of exactly 15% is still a
    /// warning, only above it is safe.
    pub fn from_reserve_margin(margin_pct: f64) -> Self {
        if margin_pct < 5.0 {
            Self::Critical
        } else if margin_pct <= 15.0 {
            Self::Warning
        } else {
            Self::Safe
        }
    }
}

/// Station reliability classification, ordered worst first for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReliabilityRisk {
    Critical,
    Warning,
    Good,
}

impl ReliabilityRisk {
    pub fn from_uptime(uptime_pct: f64) -> Self {
        if uptime_pct < 50.0 {
            Self::Critical
        } else if uptime_pct < 80.0 {
            Self::Warning
        } else {
            Self::Good
        }
    }
}

/// Unit failure risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnitRiskLevel {
    High,
    Medium,
    Low,
}

impl UnitRiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 60 {
            Self::High
        } else if score >= 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Low-risk units are computed but never written back, to bound output
    /// volume.
    pub fn is_persisted(self) -> bool {
        !matches!(self, Self::Low)
    }
}

/// One projected month of peak demand for a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastPoint {
    pub grid: String,
    /// First day of the projected month
    pub projected_month: NaiveDate,
    pub projected_peak_mw: f64,
    pub confidence_low_mw: f64,
    pub confidence_high_mw: f64,
    pub growth_rate_pct: f64,
    pub data_source: DataSource,
}

/// Capacity adequacy over the forecast horizon for a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityTimeline {
    pub grid: String,
    pub current_capacity_mw: f64,
    /// Capacity is modeled flat across the horizon; planned additions are a
    /// known limitation of the model.
    pub projected_capacity_mw: f64,
    pub shortfall_month: Option<NaiveDate>,
    pub reserve_margin_pct: f64,
    pub months_until_shortfall: Option<i32>,
    pub risk_level: RiskLevel,
}

/// System-wide suppressed-vs-served demand gap over the observed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSheddingSummary {
    pub period_days: u32,
    pub avg_shed_mw: f64,
    pub max_shed_mw: f64,
    pub shed_days_count: u32,
    pub trend: Trend,
    pub projected_avg_6mo: f64,
}

impl Default for LoadSheddingSummary {
    fn default() -> Self {
        Self {
            period_days: 0,
            avg_shed_mw: 0.0,
            max_shed_mw: 0.0,
            shed_days_count: 0,
            trend: Trend::Stable,
            projected_avg_6mo: 0.0,
        }
    }
}

/// Reliability record for one station over the rolling window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReliability {
    pub station: String,
    pub period_days: u32,
    pub uptime_pct: f64,
    pub avg_utilization_pct: f64,
    pub total_units: u32,
    pub online_units: u32,
    pub offline_units: u32,
    pub failure_count: u32,
    pub mtbf_days: f64,
    pub trend: ReliabilityTrend,
    pub risk_level: ReliabilityRisk,
}

/// Failure risk record for one generating unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRisk {
    pub station: String,
    pub engine: String,
    pub unit_id: String,
    pub derated_mw: f64,
    pub uptime_pct: f64,
    pub failure_count: u32,
    pub mtbf_days: f64,
    pub days_since_last_failure: u32,
    pub predicted_failure_days: u32,
    pub risk_level: UnitRiskLevel,
    pub risk_score: u32,
}

/// One projected month for a monthly KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiForecastPoint {
    pub kpi: String,
    pub projected_month: NaiveDate,
    pub projected_value: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
    pub trend: Trend,
}

/// The combined result of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub generated_on: NaiveDate,
    pub demand: Vec<DemandForecastPoint>,
    pub capacity: Vec<CapacityTimeline>,
    pub load_shedding: LoadSheddingSummary,
    pub stations: Vec<StationReliability>,
    pub units: Vec<UnitRisk>,
    pub kpis: Vec<KpiForecastPoint>,
}

impl ForecastBundle {
    pub fn new(generated_on: NaiveDate) -> Self {
        Self {
            generated_on,
            demand: Vec::new(),
            capacity: Vec::new(),
            load_shedding: LoadSheddingSummary::default(),
            stations: Vec::new(),
            units: Vec::new(),
            kpis: Vec::new(),
        }
    }

    /// Unit rows eligible for persistence (medium and high risk only).
    pub fn persistable_units(&self) -> impl Iterator<Item = &UnitRisk> {
        self.units.iter().filter(|u| u.risk_level.is_persisted())
    }

    /// Total rows a store will write for this bundle.
    pub fn row_count(&self) -> usize {
        self.demand.len()
            + self.capacity.len()
            + 1
            + self.stations.len()
            + self.persistable_units().count()
            + self.kpis.len()
    }
}
