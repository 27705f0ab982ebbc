use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Housekeeping;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, Count, Delete, Vacuum }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Plan => "plan",
        Phase::Count => "count",
        Phase::Delete => "delete",
        Phase::Vacuum => "vacuum",
    }}
    fn span(&self) -> Span { match self {
        Phase::Plan => info_span!("plan"),
        Phase::Count => info_span!("count"),
        Phase::Delete => info_span!("delete"),
        Phase::Vacuum => info_span!("vacuum"),
    }}
}

impl OpMarker for Housekeeping {
    const NAME: &'static str = "housekeeping";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("housekeeping") }
}
