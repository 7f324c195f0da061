//! Repository contract between the analytics core and the time-series store
//!
//! The core reads one snapshot per run and writes one bundle per generation
//! date. Station and unit rows must come from confirmed data batches only;
//! that scoping is a store precondition, not an analyzer concern.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{ForecastBundle, InputSnapshot};

pub mod memory;
#[cfg(feature = "db")]
pub mod pg;

/// A read or write against the backing store failed. Carries the table and
/// operation so the caller can retry the whole generation with context.
#[derive(Debug, Error)]
#[error("persistence {op} on {table} failed")]
pub struct PersistenceError {
    pub table: &'static str,
    pub op: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl PersistenceError {
    pub fn read(table: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self { table, op: "read", source: source.into() }
    }

    pub fn write(table: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self { table, op: "write", source: source.into() }
    }
}

/// Read access the core requires from the time-series store.
#[async_trait]
pub trait ReadingsStore: Send + Sync {
    /// Fetch everything one generation run needs: full grid and KPI history,
    /// station and unit rows limited to the rolling window ending at `today`.
    /// Returned series are sorted ascending by date.
    async fn load_snapshot(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<InputSnapshot, PersistenceError>;
}

/// Write access the core requires: one atomic replace per generation date.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    /// Replace every output row for `generated_on` with this bundle, all or
    /// nothing. Low-risk unit rows are not written.
    async fn replace_generation(
        &self,
        generated_on: NaiveDate,
        bundle: &ForecastBundle,
    ) -> Result<(), PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_table_and_operation() {
        let err = PersistenceError::write("demand_forecasts", anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "persistence write on demand_forecasts failed");
        assert_eq!(err.table, "demand_forecasts");
        let err = PersistenceError::read("daily_grid_readings", anyhow::anyhow!("timeout"));
        assert_eq!(err.op, "read");
    }
}
