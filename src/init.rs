use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::telemetry::{self};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::init::Phase as InitPhase;

#[derive(Args, Debug)]
pub struct InitCmd {}

/// Open (and create if missing) the SQLite database behind `dsn`.
pub async fn connect(dsn: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(dsn)
        .with_context(|| format!("invalid database url {}", dsn))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

pub async fn run(pool: &SqlitePool, _args: InitCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::init();
    let _g = log.root_span().entered();

    migrate(pool).await?;
    log.info("✅ Database initialized successfully");

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct InitOut { migrated: bool }
        log.result(&InitOut { migrated: true }, Some(Meta::since(started)))?;
    }
    Ok(())
}

// idempotent: already-applied migrations are skipped
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    let log = telemetry::init();
    let _m = log.span(&InitPhase::Migrate).entered();
    sqlx::migrate!().run(pool).await?;
    Ok(())
}
