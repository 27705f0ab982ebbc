use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, debug, warn, error, Span};

use super::emit::{self, Meta};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            debug!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn warn(&self, msg: impl AsRef<str>) { if self.json { warn!(op = %self.op_name(), "{}", msg.as_ref()); } else { warn!("{}", msg.as_ref()); } }

    pub fn info_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); info!(op = %self.op_name(), details = %details, "{}", msg); }
        else { info!("{}", msg); }
    }

    pub fn debug_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); debug!(op = %self.op_name(), details = %details, "{}", msg); }
        else { debug!("{}", msg); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{}", msg); }
    }

    pub fn error_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        if self.json { let details = kv_to_string(kv); error!(op = %self.op_name(), details = %details, "{}", msg); }
        else { error!("{}", msg); }
    }

    pub fn plan<T: Serialize>(&self, plan: &T, meta: Option<Meta>) -> Result<()> { emit::print_plan(self.op_name(), plan, meta) }
    pub fn result<T: Serialize>(&self, result: &T, meta: Option<Meta>) -> Result<()> { emit::print_result(self.op_name(), result, meta) }
}

impl LogCtx<crate::telemetry::ops::rss::Rss> {
    pub fn source_summary(&self, source: &str, inserted: usize, duplicates: usize, skipped: usize) {
        if self.json { info!(op = %self.op_name(), source, inserted, duplicates, skipped, "source_summary"); }
        else { info!("✅ {} — inserted={} duplicates={} skipped={}", source, inserted, duplicates, skipped); }
    }

    pub fn totals(&self, sources: usize, failed: usize, inserted: usize, duplicates: usize, skipped: usize) {
        if self.json { info!(op = %self.op_name(), sources, failed, inserted, duplicates, skipped, "rss_totals"); }
        else { info!("📊 Harvest totals — sources={} failed={} inserted={} duplicates={} skipped={}", sources, failed, inserted, duplicates, skipped); }
    }
}

impl LogCtx<crate::telemetry::ops::videos::Videos> {
    pub fn channel_summary(&self, channel: &str, fetched: usize, duplicates: usize, too_short: usize) {
        if self.json { info!(op = %self.op_name(), channel, fetched, duplicates, too_short, "channel_summary"); }
        else { info!("✅ {} — fetched={} duplicates={} too_short={}", channel, fetched, duplicates, too_short); }
    }

    pub fn totals(&self, channels: usize, failed: usize, fetched: usize) {
        if self.json { info!(op = %self.op_name(), channels, failed, fetched, "video_totals"); }
        else { info!("📊 Video totals — channels={} failed={} fetched={}", channels, failed, fetched); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
