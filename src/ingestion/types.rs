use serde::Serialize;
use thiserror::Error;

use crate::util::time::{RawDate, SkipReason};

/// One feed item, reduced to what the ingestor needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub link: Option<String>,
    pub title: Option<String>,
    /// Plain text; markup already stripped.
    pub description: Option<String>,
    pub date: RawDate,
}

/// Per-entry defects: the entry is dropped, the source carries on.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{0}")]
    Date(SkipReason),
    #[error("no link")]
    NoLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome { Inserted, Duplicate, OutOfWindow }

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct SourceSummary {
    pub source: String,
    pub entries: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub out_of_window: usize,
    pub skipped: usize,
    pub failed: bool,
}

impl SourceSummary {
    pub fn new(source: &str) -> Self { SourceSummary { source: source.to_string(), ..Default::default() } }
    pub fn failed(source: &str) -> Self { SourceSummary { failed: true, ..SourceSummary::new(source) } }
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct HarvestTotals { pub sources: usize, pub failed: usize, pub inserted: usize, pub duplicates: usize, pub skipped: usize }

#[derive(Serialize, Debug, Default)]
pub struct HarvestReport { pub totals: HarvestTotals, pub per_source: Vec<SourceSummary> }

impl HarvestReport {
    pub fn add(&mut self, s: SourceSummary) {
        self.totals.sources += 1;
        if s.failed { self.totals.failed += 1; }
        self.totals.inserted += s.inserted;
        self.totals.duplicates += s.duplicates;
        self.totals.skipped += s.skipped;
        self.per_source.push(s);
    }
}
