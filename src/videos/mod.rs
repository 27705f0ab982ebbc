use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use sqlx::{Connection, SqliteConnection, SqlitePool};

use crate::ingestion::ItemError;
use crate::policy::{Disposition, IsolationPolicy, OnChannelError};
use crate::sources::{self, ChannelSource};
use crate::telemetry::{self};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::videos::Phase as VideosPhase;
use crate::util::duration::parse_iso_duration;
use crate::util::time::{self, Normalized, RawDate};

mod db;
mod platform;
mod types;
mod youtube;

pub use platform::{PlatformError, PlaylistItem, PlaylistPage, VideoPlatform, API_MAX_RESULTS};
pub use types::{ChannelSummary, VideoLimits, VideoReport};
pub use youtube::YouTubeClient;

#[derive(Args)]
pub struct VideosCmd {
    /// YAML file with `channels: [{id, name?}]`
    #[arg(long, default_value = "youtube_sources.yaml")] pub channels: PathBuf,
    #[arg(long, default_value_t = 7)] pub max_per_channel: usize,
    #[arg(long, default_value_t = 24)] pub horizon_hours: i64,
    /// Videos shorter than this are not stored
    #[arg(long, default_value_t = 300)] pub min_duration_secs: u64,
    #[arg(long, value_enum, default_value_t = OnChannelError::Abort)] pub on_channel_error: OnChannelError,
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)] pub api_key: String,
}

pub async fn run(pool: &SqlitePool, args: VideosCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::videos();
    let _g = log.root_span_kv([
        ("channels", args.channels.display().to_string()),
        ("max_per_channel", args.max_per_channel.to_string()),
        ("horizon_hours", args.horizon_hours.to_string()),
        ("min_duration_secs", args.min_duration_secs.to_string()),
        ("on_channel_error", format!("{:?}", args.on_channel_error)),
    ]).entered();

    let channels = sources::load_channels(&args.channels)?;
    if channels.is_empty() { log.warn("ℹ️  No channels to harvest"); }

    let platform = YouTubeClient::new(args.api_key.clone())?;
    let limits = VideoLimits {
        max_per_channel: args.max_per_channel,
        min_duration_secs: args.min_duration_secs,
        cutoff: time::cutoff(Utc::now(), args.horizon_hours),
    };
    let policy = IsolationPolicy::videos(args.on_channel_error);
    let report = harvest(pool, &platform, &channels, &limits, policy).await?;

    if telemetry::config::json_mode() {
        log.result(&report, Some(Meta::since(started)))?;
    }
    Ok(())
}

/// Harvest every channel inside one transaction, committed once at the end.
/// Each channel runs under a savepoint: a skipped channel keeps none of its
/// rows, and a fatal channel error drops the transaction, so nothing from the
/// run is kept.
pub async fn harvest<P>(
    pool: &SqlitePool,
    platform: &P,
    channels: &[ChannelSource],
    limits: &VideoLimits,
    policy: IsolationPolicy,
) -> Result<VideoReport>
where
    P: VideoPlatform + ?Sized,
{
    let log = telemetry::videos();
    let mut report = VideoReport::default();
    let mut tx = pool.begin().await?;

    for ch in channels {
        let name = ch.display_name();
        let _s = log.span_kv(&VideosPhase::Channel, [("id", ch.id.clone()), ("name", name.to_string())]).entered();
        log.info(format!("📺 Fetching videos from {} …", name));
        let mut sp = Connection::begin(&mut *tx).await?;
        let summary = match policy.guard(&log, name, ingest_channel(&mut *sp, platform, ch, limits, policy)).await? {
            Some(summary) => {
                sp.commit().await?;
                log.channel_summary(&summary.channel, summary.fetched, summary.duplicates, summary.too_short);
                summary
            }
            None => {
                sp.rollback().await?;
                ChannelSummary::failed(name)
            }
        };
        report.add(summary);
    }

    { let _c = log.span(&VideosPhase::Commit).entered(); tx.commit().await?; }

    let t = &report.totals;
    log.totals(t.channels, t.failed, t.fetched);
    log.info("🏁 Video harvest complete");
    Ok(report)
}

/// Walk one channel's uploads newest-first until the cap, the end of the
/// listing, or the first video older than the cutoff.
pub async fn ingest_channel<P>(
    conn: &mut SqliteConnection,
    platform: &P,
    ch: &ChannelSource,
    limits: &VideoLimits,
    policy: IsolationPolicy,
) -> Result<ChannelSummary>
where
    P: VideoPlatform + ?Sized,
{
    let log = telemetry::videos();
    let name = ch.display_name();
    let mut summary = ChannelSummary::new(name);

    let uploads = { let _r = log.span(&VideosPhase::Resolve).entered(); platform.uploads_playlist(&ch.id).await? };
    let Some(uploads) = uploads else {
        log.warn_kv(&format!("🔎 Channel not found: {} ({})", name, ch.id), [("channel", ch.id.clone())]);
        summary.not_found = true;
        return Ok(summary);
    };

    let mut page_token: Option<String> = None;
    'pages: while summary.fetched < limits.max_per_channel {
        let remaining = limits.max_per_channel - summary.fetched;
        let max_results = u32::try_from(remaining).unwrap_or(API_MAX_RESULTS).min(API_MAX_RESULTS);

        let page = {
            let _p = log.span_kv(&VideosPhase::Page, [("page", (summary.pages + 1).to_string())]).entered();
            platform.playlist_page(&uploads, page_token.as_deref(), max_results).await
        };
        let page = match page {
            Ok(page) => page,
            Err(err) => { stop_channel(policy, &mut summary, err)?; break; }
        };
        summary.pages += 1;

        let ids: Vec<String> = page.items.iter().map(|i| i.video_id.clone()).collect();
        let durations = if ids.is_empty() {
            HashMap::new()
        } else {
            let _d = log.span(&VideosPhase::Durations).entered();
            match platform.durations(&ids).await {
                Ok(durations) => durations,
                Err(err) => { stop_channel(policy, &mut summary, err)?; break; }
            }
        };

        for item in &page.items {
            let published = match published_at(item) {
                Ok(at) => at,
                Err(err) => match policy.classify(&err) {
                    Disposition::SkipItem => {
                        summary.skipped += 1;
                        log.warn_kv(
                            &format!("↩️ {}: skipping {}: {}", name, item.video_id, err),
                            [("video_id", item.video_id.clone()), ("reason", err.to_string())],
                        );
                        continue;
                    }
                    _ => return Err(err),
                },
            };
            // uploads are newest first: nothing after this one is in the window
            if published < limits.cutoff {
                log.debug_kv(
                    &format!("⏹️ {}: {} is older than the window", name, item.video_id),
                    [("video_id", item.video_id.clone()), ("published_at", published.to_rfc3339())],
                );
                break 'pages;
            }

            if db::video_exists(conn, &item.video_id).await? {
                summary.duplicates += 1;
                continue;
            }

            let secs = parse_iso_duration(durations.get(&item.video_id).map(String::as_str).unwrap_or(""));
            if secs < limits.min_duration_secs {
                summary.too_short += 1;
                log.debug_kv(
                    &format!("✂️ {}: {} is too short ({}s)", name, item.video_id, secs),
                    [("video_id", item.video_id.clone()), ("seconds", secs.to_string())],
                );
                continue;
            }

            let url = db::watch_url(&item.video_id);
            let row = db::NewVideo {
                video_id: &item.video_id,
                channel_name: name,
                url: &url,
                title: &item.title,
                description: &item.description,
                published_at: published,
            };
            if !db::insert_video(conn, &row).await? {
                summary.duplicates += 1;
                continue;
            }
            summary.fetched += 1;
            log.info_kv(&format!("🎬 {}: {}", name, item.title), [("video_id", item.video_id.clone()), ("url", url)]);

            if summary.fetched >= limits.max_per_channel { break 'pages; }
        }

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }
    Ok(summary)
}

/// A platform error mid-channel: fatal ones propagate, the rest end the
/// channel early and keep what it already stored.
fn stop_channel(policy: IsolationPolicy, summary: &mut ChannelSummary, err: PlatformError) -> Result<()> {
    let err = anyhow::Error::from(err);
    if policy.classify(&err) == Disposition::Fatal { return Err(err); }
    telemetry::videos().warn_kv(
        &format!("⛔ {}: stopping after {} page(s): {}", summary.channel, summary.pages, err),
        [("channel", summary.channel.clone()), ("reason", err.to_string())],
    );
    summary.aborted = Some(err.to_string());
    Ok(())
}

fn published_at(item: &PlaylistItem) -> Result<DateTime<Utc>> {
    match time::normalize(&RawDate::Text(item.published_at.clone())) {
        Normalized::Parsed { at, .. } => Ok(at),
        Normalized::Skip(reason) => Err(ItemError::Date(reason).into()),
    }
}
