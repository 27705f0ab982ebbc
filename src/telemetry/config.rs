use std::sync::atomic::{AtomicBool, Ordering};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// `--json`: emit one result envelope on stdout when the command finishes.
pub fn set_json_mode(on: bool) { JSON_MODE.store(on, Ordering::Relaxed); }
pub fn json_mode() -> bool { JSON_MODE.load(Ordering::Relaxed) }

pub fn logs_are_json() -> bool {
    matches!(std::env::var("HARVEST_LOG_FORMAT").as_deref(), Ok("json"))
}

/// Initialize tracing/logging according to RUST_LOG and HARVEST_LOG_FORMAT.
/// - Defaults to `info` if `RUST_LOG` is unset
/// - Supports `HARVEST_LOG_FORMAT=json` for JSON logs
/// - Logs always go to stderr so stdout stays clean for `--json`
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    use tracing_subscriber::prelude::*; // for .with()

    // Default filter if RUST_LOG unset
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    if logs_are_json() {
        let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        // human-friendly compact text
        let _ = builder.with(fmt_layer.compact()).try_init();
    }
}
