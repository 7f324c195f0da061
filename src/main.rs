use anyhow::Result;
use chrono::{Local, NaiveDate};
use gridcast::{config::Config, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let cfg = Config::load()?;
    cfg.forecast.validate().map_err(anyhow::Error::msg)?;

    let today = Local::now().date_naive();
    info!(%today, "starting gridcast generation");

    run(cfg, today).await
}

#[cfg(feature = "db")]
async fn run(cfg: Config, today: NaiveDate) -> Result<()> {
    use std::sync::Arc;

    use gridcast::analytics::ForecastOrchestrator;
    use gridcast::repo::pg::PgStore;

    let store = Arc::new(PgStore::connect(&cfg.db.url).await?);
    let orchestrator = ForecastOrchestrator::new(cfg.forecast.clone(), store.clone(), store);
    let run = orchestrator.run_for(today).await?;
    info!(rows = run.rows_written, "generation persisted");
    Ok(())
}

#[cfg(all(not(feature = "db"), feature = "sim"))]
async fn run(cfg: Config, today: NaiveDate) -> Result<()> {
    use std::sync::Arc;

    use gridcast::analytics::ForecastOrchestrator;
    use gridcast::simulation;
    use tracing::warn;

    warn!("built without the db feature; running against simulated history");
    let store = Arc::new(simulation::sim_store(&cfg.simulation, today));
    let orchestrator =
        ForecastOrchestrator::new(cfg.forecast.clone(), store.clone(), store.clone());
    let run = orchestrator.run_for(today).await?;
    info!(
        rows = run.rows_written,
        stations = run.bundle.stations.len(),
        "simulated generation complete"
    );
    Ok(())
}

#[cfg(all(not(feature = "db"), not(feature = "sim")))]
async fn run(_cfg: Config, _today: NaiveDate) -> Result<()> {
    anyhow::bail!("enable the db or sim feature to run a generation")
}
