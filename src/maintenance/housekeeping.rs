use std::time::Instant;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::telemetry::{self};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::housekeeping::Phase as HkPhase;

#[derive(Args, Debug)]
pub struct HousekeepingCmd {
    /// Actually delete; without it only the plan is printed
    #[arg(long, default_value_t = false)] pub apply: bool,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct HousekeepingOut {
    pub mode: &'static str,
    pub articles: i64,
    pub deleted: u64,
    pub vacuumed: bool,
}

pub async fn run(pool: &SqlitePool, args: HousekeepingCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::housekeeping();
    let mode = if args.apply { "apply" } else { "plan" };
    let _g = log.root_span_kv([("mode", mode.to_string())]).entered();

    let out = sweep(pool, args.apply).await?;

    if telemetry::config::json_mode() {
        if args.apply { log.result(&out, Some(Meta::since(started)))?; }
        else { log.plan(&out, Some(Meta::since(started)))?; }
    }
    Ok(())
}

/// Wipe every stored article and compact the file. Videos are left alone.
pub async fn sweep(pool: &SqlitePool, apply: bool) -> Result<HousekeepingOut> {
    let log = telemetry::housekeeping();
    let mode = if apply { "apply" } else { "plan" };

    let articles = { let _c = log.span(&HkPhase::Count).entered(); count_articles(pool).await? };
    {
        let _p = log.span(&HkPhase::Plan).entered();
        log.info(format!("📝 Housekeeping plan: mode={} articles={}", mode, articles));
        if !apply { log.info("   Use --apply to execute."); }
    }
    if !apply {
        return Ok(HousekeepingOut { mode, articles, deleted: 0, vacuumed: false });
    }

    let deleted = { let _d = log.span(&HkPhase::Delete).entered(); delete_articles(pool).await? };
    { let _v = log.span(&HkPhase::Vacuum).entered(); vacuum(pool).await?; }
    log.info_kv("🧹 All articles deleted, DB compacted", [("deleted", deleted.to_string())]);
    Ok(HousekeepingOut { mode, articles, deleted, vacuumed: true })
}

async fn count_articles(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM articles").fetch_one(pool).await?)
}

async fn delete_articles(pool: &SqlitePool) -> Result<u64> {
    Ok(sqlx::query("DELETE FROM articles").execute(pool).await?.rows_affected())
}

// VACUUM refuses to run inside a transaction
async fn vacuum(pool: &SqlitePool) -> Result<()> {
    sqlx::query("VACUUM").execute(pool).await?;
    Ok(())
}
