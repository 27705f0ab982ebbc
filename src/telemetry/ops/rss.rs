use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Rss;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Source, Fetch, Entry, Commit }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Source => "source",
        Phase::Fetch => "fetch",
        Phase::Entry => "entry",
        Phase::Commit => "commit",
    }}
    fn span(&self) -> Span { match self {
        Phase::Source => info_span!("source"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Entry => info_span!("entry"),
        Phase::Commit => info_span!("commit"),
    }}
}

impl OpMarker for Rss {
    const NAME: &'static str = "rss";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("rss") }
}
