use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-run knobs for the video ingestor.
#[derive(Debug, Clone)]
pub struct VideoLimits {
    pub max_per_channel: usize,
    pub min_duration_secs: u64,
    pub cutoff: DateTime<Utc>,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct ChannelSummary {
    pub channel: String,
    pub pages: usize,
    pub fetched: usize,
    pub duplicates: usize,
    pub too_short: usize,
    pub skipped: usize,
    pub not_found: bool,
    /// Pagination was cut short by a quota/permission error.
    pub aborted: Option<String>,
    pub failed: bool,
}

impl ChannelSummary {
    pub fn new(channel: &str) -> Self { ChannelSummary { channel: channel.to_string(), ..Default::default() } }
    pub fn failed(channel: &str) -> Self { ChannelSummary { failed: true, ..ChannelSummary::new(channel) } }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct VideoTotals { pub channels: usize, pub failed: usize, pub fetched: usize }

#[derive(Serialize, Debug, Default)]
pub struct VideoReport { pub totals: VideoTotals, pub per_channel: Vec<ChannelSummary> }

impl VideoReport {
    pub fn add(&mut self, s: ChannelSummary) {
        self.totals.channels += 1;
        if s.failed { self.totals.failed += 1; }
        self.totals.fetched += s.fetched;
        self.per_channel.push(s);
    }
}
