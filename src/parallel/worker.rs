//! Worker thread for parallel processing
//!
//! Contains the batch parser and the worker loop that applies it to batches.

use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::parsers::RecordParser;
use crate::record::ParsedRecord;
use crate::stats::ParseStats;

use super::types::{Batch, BatchResult, ParsedBatch};

/// Parse `(line_id, line)` pairs in order, keeping only lines that matched
pub fn parse_batch<'a, P, I>(parser: &P, lines: I) -> Vec<ParsedRecord>
where
    P: RecordParser + ?Sized,
    I: IntoIterator<Item = (u64, &'a str)>,
{
    lines
        .into_iter()
        .filter_map(|(line_id, line)| parser.parse_line(line_id, line))
        .collect()
}

/// Worker thread: parses batches until the batch channel closes
///
/// A panic while parsing is caught and forwarded to the sink as the batch's
/// outcome so the pipeline fails instead of waiting for a batch that never
/// arrives.
pub(crate) fn worker_thread<P: RecordParser + ?Sized>(
    worker_id: usize,
    batch_receiver: Receiver<Batch>,
    result_sender: Sender<BatchResult>,
    parser: Arc<P>,
) -> Result<()> {
    while let Ok(batch) = batch_receiver.recv() {
        let batch_id = batch.id;
        let info = batch.info(false);
        let outcome =
            panic::catch_unwind(AssertUnwindSafe(|| worker_process_batch(&batch, &*parser)))
                .map_err(|payload| {
                    anyhow!(
                        "Worker {} failed while parsing batch {} (lines {} to {}): {}",
                        worker_id,
                        batch_id + 1,
                        info.first_line_id,
                        info.last_line_id,
                        panic_message(payload.as_ref())
                    )
                });

        if result_sender.send(BatchResult { batch_id, outcome }).is_err() {
            // Sink is gone, the pipeline is shutting down
            break;
        }
    }

    Ok(())
}

fn worker_process_batch<P: RecordParser + ?Sized>(batch: &Batch, parser: &P) -> ParsedBatch {
    let records = parse_batch(parser, batch.numbered_lines());
    let lines_read = batch.lines.len() as u64;
    let records_parsed = records.len() as u64;

    ParsedBatch {
        records,
        stats: ParseStats {
            lines_read,
            records_parsed,
            lines_dropped: lines_read - records_parsed,
            batches: 1,
            ..Default::default()
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
