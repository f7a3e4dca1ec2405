use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::{
    admission::AdmissionService, lifecycle::LifecycleService, scheduling::SchedulingService,
};
use crate::infra::repositories::{
    sqlite_booking_repo::SqliteBookingRepo, sqlite_event_repo::SqliteEventRepo,
    sqlite_location_repo::SqliteLocationRepo,
};
use crate::state::AppState;

pub async fn bootstrap_state(config: &Config) -> AppState {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_migrations(&pool).await;

    build_state(config.clone(), pool)
}

pub fn build_state(config: Config, pool: SqlitePool) -> AppState {
    let location_repo = Arc::new(SqliteLocationRepo::new(pool.clone()));
    let event_repo = Arc::new(SqliteEventRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool));

    AppState {
        config,
        admission: Arc::new(AdmissionService::new(event_repo.clone(), booking_repo.clone())),
        scheduling: Arc::new(SchedulingService::new(event_repo.clone(), location_repo.clone())),
        lifecycle: Arc::new(LifecycleService::new(event_repo.clone(), booking_repo.clone())),
        location_repo,
        event_repo,
        booking_repo,
    }
}

pub async fn run_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
