pub mod logger;

use tracing::info;

use crate::engine::Progress;

/// Progress observer that forwards stage reports to the log, the way
/// the engine's caller sees them.
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn on_progress(&self, percent: u8, stage: &str) {
        info!("Progress: {}% - {}", percent, stage);
    }
}
