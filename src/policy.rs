use std::future::Future;

use anyhow::Result;

use crate::ingestion::{FeedError, ItemError};
use crate::telemetry::ctx::{LogCtx, OpMarker};
use crate::videos::PlatformError;

/// What a failed unit of work costs the run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Drop one entry and keep going with the source.
    SkipItem,
    /// Drop the rest of one source/channel; the run continues.
    SkipSource,
    /// Abort the run.
    Fatal,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::SkipItem => "skip_item",
            Disposition::SkipSource => "skip_source",
            Disposition::Fatal => "fatal",
        }
    }
}

/// `harvest videos --on-channel-error`
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OnChannelError {
    /// Unexpected channel errors abort the run (quota/permission errors never do)
    #[default]
    #[value(name = "abort")] Abort,
    /// Log the failing channel and move on to the next one
    #[value(name = "skip")] Skip,
}

/// One isolation policy shared by the article and video ingestors. Known
/// error types map to a fixed disposition; anything else gets `unexpected`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IsolationPolicy {
    unexpected: Disposition,
}

impl IsolationPolicy {
    pub fn rss() -> Self {
        IsolationPolicy { unexpected: Disposition::SkipSource }
    }

    pub fn videos(on_error: OnChannelError) -> Self {
        let unexpected = match on_error {
            OnChannelError::Abort => Disposition::Fatal,
            OnChannelError::Skip => Disposition::SkipSource,
        };
        IsolationPolicy { unexpected }
    }

    pub fn classify(&self, err: &anyhow::Error) -> Disposition {
        if err.downcast_ref::<ItemError>().is_some() {
            return Disposition::SkipItem;
        }
        if matches!(err.downcast_ref::<PlatformError>(), Some(PlatformError::Forbidden { .. })) {
            return Disposition::SkipSource;
        }
        if err.downcast_ref::<FeedError>().is_some() {
            return Disposition::SkipSource;
        }
        self.unexpected
    }

    /// Run one source/channel. A recoverable failure is logged under `unit`
    /// and becomes `Ok(None)`; a fatal one is returned.
    pub async fn guard<O, T, F>(&self, log: &LogCtx<O>, unit: &str, work: F) -> Result<Option<T>>
    where
        O: OpMarker,
        F: Future<Output = Result<T>>,
    {
        match work.await {
            Ok(v) => Ok(Some(v)),
            Err(err) => match self.classify(&err) {
                Disposition::Fatal => Err(err.context(format!("{} failed", unit))),
                disposition => {
                    log.error_kv(
                        &format!("❌ Error on {}: {:#}", unit, err),
                        [("unit", unit.to_string()), ("disposition", disposition.as_str().to_string())],
                    );
                    Ok(None)
                }
            },
        }
    }
}
