//! Result sink for parallel processing
//!
//! Buffers batches that finish out of order and writes them strictly by batch
//! id. Each written batch returns one in-flight credit to the batcher.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::collections::HashMap;
use std::io::Write;

use crate::record::{ParsedRecord, PARSED_COLUMNS};
use crate::stats::ParseStats;

use super::progress::ProgressObserver;
use super::types::{BatchResult, ParsedBatch};

/// Write the parsed-table header; written even when no line matches
pub(crate) fn write_parsed_header<W: Write>(writer: &mut csv::Writer<W>) -> Result<()> {
    writer
        .write_record(PARSED_COLUMNS)
        .context("Failed to write output header")
}

/// Ordered result sink - maintains batch order for deterministic output
///
/// Returns as soon as a batch reports a failure. Dropping the receiver and
/// the credit sender on return is what unblocks the batcher and workers.
pub(crate) fn ordered_result_sink<W: Write>(
    result_receiver: Receiver<BatchResult>,
    writer: &mut csv::Writer<W>,
    credit_sender: Sender<()>,
    progress: &dyn ProgressObserver,
) -> Result<ParseStats> {
    let mut pending_batches: HashMap<u64, ParsedBatch> = HashMap::new();
    let mut next_expected_id = 0u64;
    let mut totals = ParseStats::default();

    while let Ok(batch_result) = result_receiver.recv() {
        let parsed = batch_result.outcome?;
        pending_batches.insert(batch_result.batch_id, parsed);

        // Output all consecutive batches starting from next_expected_id
        while let Some(batch) = pending_batches.remove(&next_expected_id) {
            write_batch_records(writer, &batch.records)?;
            totals.merge_batch(&batch.stats);
            progress.batch_written(next_expected_id, batch.records.len());
            next_expected_id += 1;
            // The batcher may already have finished and dropped its receiver
            let _ = credit_sender.send(());
        }
    }

    if !pending_batches.is_empty() {
        return Err(anyhow!(
            "Batch {} never completed; {} later batches were not written",
            next_expected_id + 1,
            pending_batches.len()
        ));
    }

    Ok(totals)
}

fn write_batch_records<W: Write>(
    writer: &mut csv::Writer<W>,
    records: &[ParsedRecord],
) -> Result<()> {
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record for line {}", record.line_id))?;
    }
    Ok(())
}
