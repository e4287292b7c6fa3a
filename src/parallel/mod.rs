//! Parallel processing module for loglabel
//!
//! Splits the input into fixed-size batches, parses them on a worker pool and
//! writes the results back in input order.
//!
//! # Module Structure
//!
//! - `types`: Data structures for batches, results, and configuration
//! - `progress`: Observer interface for dispatch/completion notifications
//! - `batching`: Line reading and batch dispatch with in-flight credits
//! - `worker`: Batch parser and worker thread
//! - `sink`: Reorder buffer and ordered table output
//! - `processor`: Main ParallelProcessor orchestration

mod batching;
mod processor;
mod progress;
mod sink;
mod types;
mod worker;

// Re-export public types
pub use processor::ParallelProcessor;
pub use progress::{NoProgress, ProgressObserver, StderrProgress};
pub use types::{
    Batch, BatchInfo, ParallelConfig, ParsedBatch, DEFAULT_BATCH_SIZE, DEFAULT_NUM_WORKERS,
    MAX_IN_FLIGHT_LIMIT,
};
pub use worker::parse_batch;
