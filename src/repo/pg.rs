//! Postgres store
//!
//! Reads use plain queries so the crate builds without a live database.
//! The generation write is a single transaction across all six output
//! tables: a crash mid-write can never leave a half-updated generation.

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::warn;

use super::{ForecastStore, PersistenceError, ReadingsStore};
use crate::domain::{
    DailyGridReading, DailyStationReading, DailyUnitReading, ForecastBundle, InputSnapshot,
    MonthlyKpiPoint, UnitStatus,
};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await
            .map_err(|e| PersistenceError::read("connection", e))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl ReadingsStore for PgStore {
    async fn load_snapshot(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<InputSnapshot, PersistenceError> {
        let cutoff = today - Days::new(u64::from(window_days));

        let grid_rows = sqlx::query(
            r#"
            SELECT date, grid, total_capacity_mw, expected_peak_mw, served_peak_mw,
                   suppressed_peak_mw, utilization_pct, reserve_margin_pct,
                   sub_grid_capacity_mw, renewable_capacity_mw
            FROM daily_grid_readings
            WHERE date <= $1
            ORDER BY date ASC
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::read("daily_grid_readings", e))?;

        let grid_readings = grid_rows
            .into_iter()
            .map(|row| DailyGridReading {
                date: row.get("date"),
                grid: row.get("grid"),
                total_capacity_mw: row.get("total_capacity_mw"),
                expected_peak_mw: row.get("expected_peak_mw"),
                served_peak_mw: row.get("served_peak_mw"),
                suppressed_peak_mw: row.get("suppressed_peak_mw"),
                utilization_pct: row.get("utilization_pct"),
                reserve_margin_pct: row.get("reserve_margin_pct"),
                sub_grid_capacity_mw: row
                    .get::<Option<Vec<f64>>, _>("sub_grid_capacity_mw")
                    .unwrap_or_default(),
                renewable_capacity_mw: row.get("renewable_capacity_mw"),
            })
            .collect();

        // Station and unit rows are scoped to confirmed data batches here;
        // the analyzers never see draft uploads.
        let station_rows = sqlx::query(
            r#"
            SELECT r.date, r.station, r.total_units, r.units_online, r.units_offline,
                   r.units_no_data, r.derated_capacity_mw, r.available_capacity_mw,
                   r.utilization_pct
            FROM daily_station_readings r
            JOIN data_batches b ON b.id = r.batch_id
            WHERE b.status = 'confirmed' AND r.date > $1 AND r.date <= $2
            ORDER BY r.date ASC
            "#,
        )
        .bind(cutoff)
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::read("daily_station_readings", e))?;

        let station_readings = station_rows
            .into_iter()
            .map(|row| DailyStationReading {
                date: row.get("date"),
                station: row.get("station"),
                total_units: row.get::<Option<i32>, _>("total_units").map(|v| v as u32),
                units_online: row.get::<Option<i32>, _>("units_online").map(|v| v as u32),
                units_offline: row.get::<Option<i32>, _>("units_offline").map(|v| v as u32),
                units_no_data: row.get::<Option<i32>, _>("units_no_data").map(|v| v as u32),
                derated_capacity_mw: row.get("derated_capacity_mw"),
                available_capacity_mw: row.get("available_capacity_mw"),
                utilization_pct: row.get("utilization_pct"),
            })
            .collect();

        let unit_rows = sqlx::query(
            r#"
            SELECT r.date, r.station, r.engine, r.unit_id, r.derated_capacity_mw,
                   r.available_capacity_mw, r.status, r.utilization_pct
            FROM daily_unit_readings r
            JOIN data_batches b ON b.id = r.batch_id
            WHERE b.status = 'confirmed' AND r.date > $1 AND r.date <= $2
            ORDER BY r.date ASC
            "#,
        )
        .bind(cutoff)
        .bind(today)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::read("daily_unit_readings", e))?;

        let unit_readings = unit_rows
            .into_iter()
            .filter_map(|row| {
                let raw: String = row.get("status");
                let status = match raw.parse::<UnitStatus>() {
                    Ok(s) => s,
                    Err(_) => {
                        warn!(status = %raw, "unrecognized unit status, skipping row");
                        return None;
                    }
                };
                Some(DailyUnitReading {
                    date: row.get("date"),
                    station: row.get("station"),
                    engine: row.get("engine"),
                    unit_id: row.get("unit_id"),
                    derated_capacity_mw: row.get("derated_capacity_mw"),
                    available_capacity_mw: row.get("available_capacity_mw"),
                    status,
                    utilization_pct: row.get("utilization_pct"),
                })
            })
            .collect();

        let kpi_rows = sqlx::query(
            r#"
            SELECT month, kpi, value
            FROM monthly_kpi_points
            ORDER BY month ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::read("monthly_kpi_points", e))?;

        let kpi_points = kpi_rows
            .into_iter()
            .map(|row| MonthlyKpiPoint {
                month: row.get("month"),
                kpi: row.get("kpi"),
                value: row.get("value"),
            })
            .collect();

        let mut snapshot = InputSnapshot {
            grid_readings,
            station_readings,
            unit_readings,
            kpi_points,
        };
        snapshot.normalize();
        Ok(snapshot)
    }
}

const OUTPUT_TABLES: [&str; 6] = [
    "demand_forecasts",
    "capacity_timeline",
    "load_shedding_summary",
    "station_reliability",
    "unit_risk",
    "kpi_forecasts",
];

#[async_trait]
impl ForecastStore for PgStore {
    async fn replace_generation(
        &self,
        generated_on: NaiveDate,
        bundle: &ForecastBundle,
    ) -> Result<(), PersistenceError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PersistenceError::write("transaction", e))?;

        for table in OUTPUT_TABLES {
            sqlx::query(&format!("DELETE FROM {table} WHERE generated_on = $1"))
                .bind(generated_on)
                .execute(&mut *tx)
                .await
                .map_err(|e| PersistenceError::write(table, e))?;
        }

        for p in &bundle.demand {
            sqlx::query(
                r#"
                INSERT INTO demand_forecasts
                    (generated_on, grid, projected_month, projected_peak_mw,
                     confidence_low_mw, confidence_high_mw, growth_rate_pct, data_source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(generated_on)
            .bind(&p.grid)
            .bind(p.projected_month)
            .bind(p.projected_peak_mw)
            .bind(p.confidence_low_mw)
            .bind(p.confidence_high_mw)
            .bind(p.growth_rate_pct)
            .bind(p.data_source.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::write("demand_forecasts", e))?;
        }

        for t in &bundle.capacity {
            sqlx::query(
                r#"
                INSERT INTO capacity_timeline
                    (generated_on, grid, current_capacity_mw, projected_capacity_mw,
                     shortfall_month, reserve_margin_pct, months_until_shortfall, risk_level)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(generated_on)
            .bind(&t.grid)
            .bind(t.current_capacity_mw)
            .bind(t.projected_capacity_mw)
            .bind(t.shortfall_month)
            .bind(t.reserve_margin_pct)
            .bind(t.months_until_shortfall)
            .bind(t.risk_level.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::write("capacity_timeline", e))?;
        }

        let s = &bundle.load_shedding;
        sqlx::query(
            r#"
            INSERT INTO load_shedding_summary
                (generated_on, period_days, avg_shed_mw, max_shed_mw, shed_days_count,
                 trend, projected_avg_6mo)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(generated_on)
        .bind(s.period_days as i32)
        .bind(s.avg_shed_mw)
        .bind(s.max_shed_mw)
        .bind(s.shed_days_count as i32)
        .bind(s.trend.to_string())
        .bind(s.projected_avg_6mo)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistenceError::write("load_shedding_summary", e))?;

        for r in &bundle.stations {
            sqlx::query(
                r#"
                INSERT INTO station_reliability
                    (generated_on, station, period_days, uptime_pct, avg_utilization_pct,
                     total_units, online_units, offline_units, failure_count, mtbf_days,
                     trend, risk_level)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(generated_on)
            .bind(&r.station)
            .bind(r.period_days as i32)
            .bind(r.uptime_pct)
            .bind(r.avg_utilization_pct)
            .bind(r.total_units as i32)
            .bind(r.online_units as i32)
            .bind(r.offline_units as i32)
            .bind(r.failure_count as i32)
            .bind(r.mtbf_days)
            .bind(r.trend.to_string())
            .bind(r.risk_level.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::write("station_reliability", e))?;
        }

        // Low-risk units are computed but never persisted
        for u in bundle.persistable_units() {
            sqlx::query(
                r#"
                INSERT INTO unit_risk
                    (generated_on, station, engine, unit_id, derated_mw, uptime_pct,
                     failure_count, mtbf_days, days_since_last_failure,
                     predicted_failure_days, risk_level, risk_score)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(generated_on)
            .bind(&u.station)
            .bind(&u.engine)
            .bind(&u.unit_id)
            .bind(u.derated_mw)
            .bind(u.uptime_pct)
            .bind(u.failure_count as i32)
            .bind(u.mtbf_days)
            .bind(u.days_since_last_failure as i32)
            .bind(u.predicted_failure_days as i32)
            .bind(u.risk_level.to_string())
            .bind(u.risk_score as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::write("unit_risk", e))?;
        }

        for k in &bundle.kpis {
            sqlx::query(
                r#"
                INSERT INTO kpi_forecasts
                    (generated_on, kpi, projected_month, projected_value,
                     confidence_low, confidence_high, trend)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(generated_on)
            .bind(&k.kpi)
            .bind(k.projected_month)
            .bind(k.projected_value)
            .bind(k.confidence_low)
            .bind(k.confidence_high)
            .bind(k.trend.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| PersistenceError::write("kpi_forecasts", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| PersistenceError::write("transaction", e))?;
        Ok(())
    }
}
