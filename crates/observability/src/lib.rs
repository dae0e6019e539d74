//! Process-wide logging setup shared by the stockflow binaries.

pub mod tracing;

/// Install the JSON log subscriber. Later calls are no-ops.
pub fn init() {
    tracing::init();
}
