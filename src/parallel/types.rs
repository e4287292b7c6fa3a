//! Type definitions for parallel processing
//!
//! Contains data structures for batches, batch results and configuration.

use anyhow::Result;

use crate::record::ParsedRecord;
use crate::stats::ParseStats;

pub const DEFAULT_BATCH_SIZE: usize = 100_000;
pub const DEFAULT_NUM_WORKERS: usize = 4;
/// Upper bound on in-flight batches; channel slots are allocated up front
pub const MAX_IN_FLIGHT_LIMIT: usize = 4096;

/// Configuration for parallel processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Worker threads; 0 means one per CPU
    pub num_workers: usize,
    /// Maximum number of lines per batch
    pub batch_size: usize,
    /// Dispatched batches allowed to be waiting for write-out; 0 means twice the worker count
    pub max_in_flight: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            max_in_flight: 0,
        }
    }
}

impl ParallelConfig {
    pub fn effective_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.num_workers
        }
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn effective_max_in_flight(&self) -> usize {
        let requested = if self.max_in_flight == 0 {
            self.effective_workers().saturating_mul(2)
        } else {
            self.max_in_flight
        };
        requested.clamp(1, MAX_IN_FLIGHT_LIMIT)
    }
}

/// A batch of consecutive input lines, the unit of parallel work
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: u64,
    pub start_line_id: u64,
    pub lines: Vec<String>,
}

impl Batch {
    /// Lines paired with their file-order line ids
    pub fn numbered_lines(&self) -> impl Iterator<Item = (u64, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(move |(idx, line)| (self.start_line_id + idx as u64, line.as_str()))
    }

    pub fn info(&self, is_final: bool) -> BatchInfo {
        BatchInfo {
            id: self.id,
            first_line_id: self.start_line_id,
            last_line_id: self.start_line_id + self.lines.len().saturating_sub(1) as u64,
            is_final,
        }
    }
}

/// Summary of a dispatched batch, handed to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchInfo {
    pub id: u64,
    pub first_line_id: u64,
    pub last_line_id: u64,
    pub is_final: bool,
}

/// Records and counters produced from one batch
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub records: Vec<ParsedRecord>,
    pub stats: ParseStats,
}

/// Result of processing a batch; an `Err` aborts the pipeline
#[derive(Debug)]
pub struct BatchResult {
    pub batch_id: u64,
    pub outcome: Result<ParsedBatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParallelConfig::default();
        assert_eq!(config.effective_workers(), 4);
        assert_eq!(config.effective_batch_size(), 100_000);
        assert_eq!(config.effective_max_in_flight(), 8);
    }

    #[test]
    fn test_max_in_flight_is_capped() {
        let config = ParallelConfig {
            max_in_flight: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.effective_max_in_flight(), MAX_IN_FLIGHT_LIMIT);

        let config = ParallelConfig {
            num_workers: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.effective_max_in_flight(), MAX_IN_FLIGHT_LIMIT);

        let config = ParallelConfig {
            max_in_flight: 3,
            ..Default::default()
        };
        assert_eq!(config.effective_max_in_flight(), 3);
    }

    #[test]
    fn test_zero_workers_means_all_cpus() {
        let config = ParallelConfig {
            num_workers: 0,
            ..Default::default()
        };
        assert!(config.effective_workers() >= 1);
    }

    #[test]
    fn test_numbered_lines_continue_from_start() {
        let batch = Batch {
            id: 2,
            start_line_id: 200,
            lines: vec!["a".to_string(), "b".to_string()],
        };
        let numbered: Vec<_> = batch.numbered_lines().collect();
        assert_eq!(numbered, vec![(200, "a"), (201, "b")]);

        let info = batch.info(true);
        assert_eq!(info.first_line_id, 200);
        assert_eq!(info.last_line_id, 201);
        assert!(info.is_final);
    }
}
