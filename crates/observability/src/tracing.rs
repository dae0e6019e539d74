//! JSON log lines for the stockflow binaries.
//!
//! Each event is written as one flat JSON object carrying the fields of the
//! span it was emitted in. `RUST_LOG` selects verbosity; without it only
//! `info` and above are shown. `RUST_LOG=stockflow_sync=debug` follows every
//! submission phase change.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Install the subscriber for this process.
///
/// Only the first call takes effect, so tests and binaries can both call it.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let installed = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("json logging installed");
    }
}
