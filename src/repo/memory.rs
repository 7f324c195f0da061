//! In-memory store for tests and the simulated runtime
//!
//! The generation write swaps the whole bundle under one lock, so it is
//! atomic by construction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use parking_lot::Mutex;

use super::{ForecastStore, PersistenceError, ReadingsStore};
use crate::domain::{ForecastBundle, InputSnapshot};

#[derive(Default)]
pub struct MemStore {
    snapshot: Mutex<InputSnapshot>,
    generations: Mutex<HashMap<NaiveDate, ForecastBundle>>,
}

impl MemStore {
    pub fn with_snapshot(mut snapshot: InputSnapshot) -> Self {
        snapshot.normalize();
        Self {
            snapshot: Mutex::new(snapshot),
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// The bundle persisted for a generation date, if any.
    pub fn generation(&self, generated_on: NaiveDate) -> Option<ForecastBundle> {
        self.generations.lock().get(&generated_on).cloned()
    }
}

#[async_trait]
impl ReadingsStore for MemStore {
    async fn load_snapshot(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<InputSnapshot, PersistenceError> {
        let mut snapshot = self.snapshot.lock().clone();
        let cutoff = today - Days::new(u64::from(window_days));
        snapshot.station_readings.retain(|r| r.date > cutoff && r.date <= today);
        snapshot.unit_readings.retain(|r| r.date > cutoff && r.date <= today);
        Ok(snapshot)
    }
}

#[async_trait]
impl ForecastStore for MemStore {
    async fn replace_generation(
        &self,
        generated_on: NaiveDate,
        bundle: &ForecastBundle,
    ) -> Result<(), PersistenceError> {
        let mut stored = bundle.clone();
        stored.units = bundle.persistable_units().cloned().collect();
        self.generations.lock().insert(generated_on, stored);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyStationReading, UnitRisk, UnitRiskLevel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn station_row(d: NaiveDate) -> DailyStationReading {
        DailyStationReading {
            date: d,
            station: "Garden Town".into(),
            total_units: Some(4),
            units_online: Some(4),
            units_offline: Some(0),
            units_no_data: Some(0),
            derated_capacity_mw: None,
            available_capacity_mw: None,
            utilization_pct: None,
        }
    }

    fn unit_risk(level: UnitRiskLevel, score: u32) -> UnitRisk {
        UnitRisk {
            station: "Garden Town".into(),
            engine: "Wartsila".into(),
            unit_id: format!("U{score}"),
            derated_mw: 5.0,
            uptime_pct: 50.0,
            failure_count: 1,
            mtbf_days: 10.0,
            days_since_last_failure: 2,
            predicted_failure_days: 8,
            risk_level: level,
            risk_score: score,
        }
    }

    #[tokio::test]
    async fn test_window_filter_on_station_rows() {
        let mut snapshot = InputSnapshot::default();
        snapshot.station_readings.push(station_row(date(2026, 5, 1)));
        snapshot.station_readings.push(station_row(date(2026, 8, 1)));
        let store = MemStore::with_snapshot(snapshot);

        let loaded = store.load_snapshot(90, date(2026, 8, 29)).await.unwrap();
        assert_eq!(loaded.station_readings.len(), 1);
        assert_eq!(loaded.station_readings[0].date, date(2026, 8, 1));
    }

    #[tokio::test]
    async fn test_replace_drops_low_risk_units_and_supersedes() {
        let store = MemStore::default();
        let today = date(2026, 8, 29);

        let mut bundle = ForecastBundle::new(today);
        bundle.units = vec![
            unit_risk(UnitRiskLevel::High, 80),
            unit_risk(UnitRiskLevel::Low, 10),
            unit_risk(UnitRiskLevel::Medium, 40),
        ];
        store.replace_generation(today, &bundle).await.unwrap();
        let stored = store.generation(today).unwrap();
        assert_eq!(stored.units.len(), 2);
        assert!(stored.units.iter().all(|u| u.risk_level.is_persisted()));

        // A later run for the same date replaces the rows wholesale
        let empty = ForecastBundle::new(today);
        store.replace_generation(today, &empty).await.unwrap();
        assert!(store.generation(today).unwrap().units.is_empty());
    }
}
