//! Process-wide logging setup for simpledao.

pub mod tracing;

/// Install the JSON subscriber. Repeated calls are no-ops.
pub fn init() {
    tracing::init();
}
