//! Progress notifications for the parallel pipeline
//!
//! Notifications are advisory. Dispatch events are raised from the batcher
//! thread, write events from the sink, so observers must be `Sync`.

use crate::platform::Diagnostics;
use crate::stats::ParseStats;

use super::types::BatchInfo;

pub trait ProgressObserver: Send + Sync {
    fn batch_dispatched(&self, _batch: &BatchInfo) {}

    fn batch_written(&self, _batch_id: u64, _records: usize) {}

    fn finished(&self, _stats: &ParseStats) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Human-readable progress lines on stderr
#[derive(Debug, Clone, Copy)]
pub struct StderrProgress {
    diagnostics: Diagnostics,
}

impl StderrProgress {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self { diagnostics }
    }

    pub fn format_dispatched(batch: &BatchInfo) -> String {
        let kind = if batch.is_final { "final batch" } else { "batch" };
        format!(
            "Dispatched {} {} (lines {} to {})",
            kind,
            batch.id + 1,
            batch.first_line_id,
            batch.last_line_id
        )
    }
}

impl ProgressObserver for StderrProgress {
    fn batch_dispatched(&self, batch: &BatchInfo) {
        self.diagnostics.info(&Self::format_dispatched(batch));
    }

    fn batch_written(&self, batch_id: u64, records: usize) {
        self.diagnostics
            .info(&format!("Wrote batch {} ({} records)", batch_id + 1, records));
    }

    fn finished(&self, stats: &ParseStats) {
        self.diagnostics.info(&format!(
            "Parsed {} of {} lines in {} batches",
            stats.records_parsed, stats.lines_read, stats.batches
        ));
    }
}
