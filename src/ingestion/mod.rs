use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use sqlx::{SqliteConnection, SqlitePool};
use url::Url;

use crate::classify;
use crate::policy::{Disposition, IsolationPolicy};
use crate::sources::{self, RssSource};
use crate::telemetry::{self};
use crate::telemetry::emit::Meta;
use crate::telemetry::ops::rss::Phase as RssPhase;
use crate::util::hash::identity_hash;
use crate::util::time::{self, Normalized};

mod db;
mod fetch;
mod parse;
mod types;

pub use fetch::{FeedError, FeedSource, HttpFeedSource};
pub use types::{FeedEntry, HarvestReport, ItemError, SourceSummary};

use types::EntryOutcome;

const UNTITLED: &str = "(untitled)";

#[derive(Args)]
pub struct RssCmd {
    /// YAML list of {name, feed_url, category?, rss}
    #[arg(long, default_value = "sources.yaml")] pub sources: PathBuf,
    #[arg(long, default_value_t = 24)] pub horizon_hours: i64,
    /// Only harvest the source with this name
    #[arg(long)] pub source: Option<String>,
}

pub async fn run(pool: &SqlitePool, args: RssCmd) -> Result<()> {
    let started = Instant::now();
    let log = telemetry::rss();
    let _g = log.root_span_kv([
        ("sources", args.sources.display().to_string()),
        ("horizon_hours", args.horizon_hours.to_string()),
        ("source", format!("{:?}", args.source)),
    ]).entered();

    let mut selected = sources::rss_enabled(sources::load_rss_sources(&args.sources)?);
    if let Some(name) = args.source.as_deref() { selected.retain(|s| s.name == name); }
    if selected.is_empty() { log.warn("ℹ️  No RSS-enabled sources to harvest"); }

    let feeds = HttpFeedSource::new()?;
    let cutoff = time::cutoff(Utc::now(), args.horizon_hours);
    let report = harvest(pool, &feeds, &selected, cutoff).await?;

    if telemetry::config::json_mode() {
        log.result(&report, Some(Meta::since(started)))?;
    }
    Ok(())
}

/// Harvest every source in order. A failing source is logged and counted;
/// it never stops the ones after it.
pub async fn harvest<F>(pool: &SqlitePool, feeds: &F, sources: &[RssSource], cutoff: DateTime<Utc>) -> Result<HarvestReport>
where
    F: FeedSource + ?Sized,
{
    let log = telemetry::rss();
    let policy = IsolationPolicy::rss();
    let mut report = HarvestReport::default();

    for src in sources {
        let _s = log.span_kv(&RssPhase::Source, [("name", src.name.clone()), ("feed_url", src.feed_url.clone())]).entered();
        log.info(format!("📡 Fetching RSS feed from {} …", src.name));
        let summary = match policy.guard(&log, &src.name, ingest_source(pool, feeds, src, cutoff)).await? {
            Some(summary) => {
                log.source_summary(&summary.source, summary.inserted, summary.duplicates, summary.skipped);
                summary
            }
            None => SourceSummary::failed(&src.name),
        };
        report.add(summary);
    }

    let t = &report.totals;
    log.totals(t.sources, t.failed, t.inserted, t.duplicates, t.skipped);
    log.info("🏁 Harvest complete");
    Ok(report)
}

/// Fetch one feed and stage its new in-window entries; one commit per source.
pub async fn ingest_source<F>(pool: &SqlitePool, feeds: &F, src: &RssSource, cutoff: DateTime<Utc>) -> Result<SourceSummary>
where
    F: FeedSource + ?Sized,
{
    let log = telemetry::rss();
    let policy = IsolationPolicy::rss();

    Url::parse(&src.feed_url)
        .map_err(|e| FeedError::InvalidUrl { url: src.feed_url.clone(), reason: e.to_string() })?;
    let entries = { let _s = log.span(&RssPhase::Fetch).entered(); feeds.entries(&src.feed_url).await? };
    let mut summary = SourceSummary::new(&src.name);
    summary.entries = entries.len();

    let mut tx = pool.begin().await?;
    for entry in &entries {
        let _e = log.span(&RssPhase::Entry).entered();
        match ingest_entry(&mut *tx, src, entry, cutoff).await {
            Ok(EntryOutcome::Inserted) => summary.inserted += 1,
            Ok(EntryOutcome::Duplicate) => summary.duplicates += 1,
            Ok(EntryOutcome::OutOfWindow) => summary.out_of_window += 1,
            Err(err) => match policy.classify(&err) {
                Disposition::SkipItem => {
                    summary.skipped += 1;
                    log.warn_kv(
                        &format!("↩️ {}: skipping {:?}: {}", src.name, entry.title.as_deref().unwrap_or(UNTITLED), err),
                        [("source", src.name.clone()), ("reason", err.to_string())],
                    );
                }
                _ => return Err(err),
            },
        }
    }
    { let _c = log.span(&RssPhase::Commit).entered(); tx.commit().await?; }
    Ok(summary)
}

async fn ingest_entry(conn: &mut SqliteConnection, src: &RssSource, entry: &FeedEntry, cutoff: DateTime<Utc>) -> Result<EntryOutcome> {
    let log = telemetry::rss();

    let published = match time::normalize(&entry.date) {
        Normalized::Parsed { at, fallback } => {
            if fallback {
                log.debug_kv(
                    &format!("🕒 {}: fallback date parse for {:?}", src.name, entry.date),
                    [("source", src.name.clone()), ("published_at", at.to_rfc3339())],
                );
            }
            at
        }
        Normalized::Skip(reason) => return Err(ItemError::Date(reason).into()),
    };
    if published < cutoff { return Ok(EntryOutcome::OutOfWindow); }

    let link = entry.link.as_deref().ok_or(ItemError::NoLink)?;
    let id = identity_hash(link);
    if db::article_exists(conn, &id).await? { return Ok(EntryOutcome::Duplicate); }

    let category = classify::categorize(
        entry.title.as_deref().unwrap_or(""),
        entry.description.as_deref().unwrap_or(""),
        src.category.as_deref(),
    );
    let title = entry.title.as_deref().unwrap_or(UNTITLED);
    let row = db::NewArticle {
        id: &id,
        source_name: &src.name,
        url: link,
        title,
        category: Some(category.as_str()),
        published_at: published,
        fetched_at: Utc::now(),
    };
    if !db::insert_article(conn, &row).await? { return Ok(EntryOutcome::Duplicate); }

    log.info_kv(
        &format!("➕ [{}] {}", category.as_str(), title),
        [("url", link.to_string()), ("category", category.as_str().to_string())],
    );
    Ok(EntryOutcome::Inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count, memory_pool};
    use crate::util::time::RawDate;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeFeeds {
        feeds: HashMap<String, Vec<FeedEntry>>,
    }

    impl FakeFeeds {
        fn with(mut self, url: &str, entries: Vec<FeedEntry>) -> Self {
            self.feeds.insert(url.to_string(), entries);
            self
        }
    }

    #[async_trait]
    impl FeedSource for FakeFeeds {
        async fn entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>, FeedError> {
            self.feeds
                .get(feed_url)
                .cloned()
                .ok_or_else(|| FeedError::Status { url: feed_url.to_string(), status: 503 })
        }
    }

    fn source(name: &str, url: &str, category: Option<&str>) -> RssSource {
        RssSource { name: name.into(), feed_url: url.into(), category: category.map(str::to_string), rss: true }
    }

    fn entry(link: &str, title: &str, at: DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            link: Some(link.into()),
            title: Some(title.into()),
            description: None,
            date: RawDate::Structured(at.naive_utc()),
        }
    }

    async fn categories(pool: &SqlitePool) -> Vec<(String, Option<String>)> {
        sqlx::query_as("SELECT title, category FROM articles ORDER BY title")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn second_run_adds_nothing() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let feeds = FakeFeeds::default().with("https://a.test/rss", vec![
            entry("https://a.test/1", "One", cutoff + Duration::hours(1)),
            entry("https://a.test/2", "Two", cutoff + Duration::hours(2)),
        ]);
        let sources = [source("A", "https://a.test/rss", None)];

        let first = harvest(&pool, &feeds, &sources, cutoff).await.unwrap();
        assert_eq!(first.totals.inserted, 2);
        let second = harvest(&pool, &feeds, &sources, cutoff).await.unwrap();
        assert_eq!(second.totals.inserted, 0);
        assert_eq!(second.totals.duplicates, 2);
        assert_eq!(count(&pool, "articles").await, 2);
    }

    #[tokio::test]
    async fn window_excludes_only_strictly_older() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let feeds = FakeFeeds::default().with("https://a.test/rss", vec![
            entry("https://a.test/old", "Before", cutoff - Duration::seconds(1)),
            entry("https://a.test/edge", "At", cutoff),
            entry("https://a.test/new", "After", cutoff + Duration::seconds(1)),
        ]);

        let summary = ingest_source(&pool, &feeds, &source("A", "https://a.test/rss", None), cutoff).await.unwrap();
        assert_eq!(summary.out_of_window, 1);
        assert_eq!(summary.inserted, 2);
        let titles: Vec<String> = categories(&pool).await.into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, ["After", "At"]);
    }

    #[tokio::test]
    async fn bad_entries_are_skipped_not_fatal() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let fresh = cutoff + Duration::hours(1);
        let mut no_date = entry("https://a.test/nodate", "No date", fresh);
        no_date.date = RawDate::Missing;
        let mut bad_date = entry("https://a.test/bad", "Bad date", fresh);
        bad_date.date = RawDate::Text("soon".into());
        let mut no_link = entry("", "No link", fresh);
        no_link.link = None;
        let mut text_date = entry("https://a.test/text", "Text date", fresh);
        text_date.date = RawDate::Text(fresh.format("%Y-%m-%d %H:%M:%S").to_string());

        let feeds = FakeFeeds::default().with("https://a.test/rss", vec![no_date, bad_date, no_link, text_date]);
        let summary = ingest_source(&pool, &feeds, &source("A", "https://a.test/rss", None), cutoff).await.unwrap();
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.inserted, 1);
        assert_eq!(count(&pool, "articles").await, 1);
    }

    #[tokio::test]
    async fn same_link_twice_in_one_feed_is_stored_once() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let fresh = cutoff + Duration::hours(1);
        let feeds = FakeFeeds::default().with("https://a.test/rss", vec![
            entry("https://a.test/1", "One", fresh),
            entry("https://a.test/1", "One again", fresh),
        ]);
        let summary = ingest_source(&pool, &feeds, &source("A", "https://a.test/rss", None), cutoff).await.unwrap();
        assert_eq!((summary.inserted, summary.duplicates), (1, 1));

        let id: String = sqlx::query_scalar("SELECT id FROM articles").fetch_one(&pool).await.unwrap();
        assert_eq!(id, identity_hash("https://a.test/1"));
    }

    #[tokio::test]
    async fn precise_hint_wins_loose_hint_is_scored() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let fresh = cutoff + Duration::hours(1);
        let feeds = FakeFeeds::default()
            .with("https://fin.test/rss", vec![entry("https://fin.test/1", "Local bakery opens", fresh)])
            .with("https://mix.test/rss", vec![entry("https://mix.test/1", "AI startup funding round", fresh)]);
        let sources = [
            source("Fin", "https://fin.test/rss", Some("Finance")),
            source("Mix", "https://mix.test/rss", Some("general")),
        ];
        harvest(&pool, &feeds, &sources, cutoff).await.unwrap();

        assert_eq!(categories(&pool).await, [
            ("AI startup funding round".to_string(), Some("startups".to_string())),
            ("Local bakery opens".to_string(), Some("finance".to_string())),
        ]);
    }

    #[tokio::test]
    async fn missing_title_gets_placeholder() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let mut e = entry("https://a.test/1", "", cutoff + Duration::hours(1));
        e.title = None;
        let feeds = FakeFeeds::default().with("https://a.test/rss", vec![e]);
        ingest_source(&pool, &feeds, &source("A", "https://a.test/rss", None), cutoff).await.unwrap();
        assert_eq!(categories(&pool).await[0].0, UNTITLED);
    }

    #[tokio::test]
    async fn broken_source_does_not_stop_the_run() {
        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let feeds = FakeFeeds::default()
            .with("https://ok.test/rss", vec![entry("https://ok.test/1", "One", cutoff + Duration::hours(1))]);
        let sources = [
            source("Down", "https://down.test/rss", None),
            source("Up", "https://ok.test/rss", None),
        ];

        let report = harvest(&pool, &feeds, &sources, cutoff).await.unwrap();
        assert_eq!(report.totals.sources, 2);
        assert_eq!(report.totals.failed, 1);
        assert!(report.per_source[0].failed);
        assert_eq!(report.per_source[1].inserted, 1);
        assert_eq!(count(&pool, "articles").await, 1);
    }

    #[tokio::test]
    async fn malformed_feed_url_fails_only_its_source() {
        use std::io::Write;

        let pool = memory_pool().await;
        let cutoff = Utc::now() - Duration::hours(24);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- name: Bad\n  feed_url: not a url\n  rss: true\n- name: Good\n  feed_url: https://ok.test/rss\n  rss: true\n")
            .unwrap();
        let selected = sources::rss_enabled(sources::load_rss_sources(file.path()).unwrap());
        let feeds = FakeFeeds::default()
            .with("not a url", vec![entry("https://bad.test/1", "Never", cutoff + Duration::hours(1))])
            .with("https://ok.test/rss", vec![entry("https://ok.test/1", "One", cutoff + Duration::hours(1))]);

        let report = harvest(&pool, &feeds, &selected, cutoff).await.unwrap();
        assert!(report.per_source[0].failed);
        assert_eq!(report.per_source[1].inserted, 1);
        assert_eq!((report.totals.failed, report.totals.inserted), (1, 1));
        let titles: Vec<String> = categories(&pool).await.into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, ["One"]);
    }
}
