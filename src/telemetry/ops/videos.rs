use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Videos;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Channel, Resolve, Page, Durations, Commit }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Channel => "channel",
        Phase::Resolve => "resolve",
        Phase::Page => "page",
        Phase::Durations => "durations",
        Phase::Commit => "commit",
    }}
    fn span(&self) -> Span { match self {
        Phase::Channel => info_span!("channel"),
        Phase::Resolve => info_span!("resolve"),
        Phase::Page => info_span!("page"),
        Phase::Durations => info_span!("durations"),
        Phase::Commit => info_span!("commit"),
    }}
}

impl OpMarker for Videos {
    const NAME: &'static str = "videos";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("videos") }
}
