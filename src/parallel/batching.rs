//! Batcher thread logic for parallel processing
//!
//! Reads the input line by line, numbers every line and groups lines into
//! fixed-size batches. A batch is only dispatched after an in-flight credit has
//! been taken from the sink, which bounds the number of live batches.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

use super::progress::ProgressObserver;
use super::types::Batch;

/// Configuration for batcher thread - groups all configuration parameters
/// to reduce parameter count
pub(crate) struct BatcherThreadConfig {
    pub batch_sender: Sender<Batch>,
    pub credit_receiver: Receiver<()>,
    pub batch_size: usize,
    pub progress: Arc<dyn ProgressObserver>,
}

/// Batcher thread - reads lines and dispatches them as batches
///
/// Returns the number of lines read. Stops early without error when the sink
/// has gone away; the sink's own error is what the caller reports.
pub(crate) fn batcher_thread<R: std::io::BufRead>(
    mut reader: R,
    config: BatcherThreadConfig,
) -> Result<u64> {
    let mut batch_id = 0u64;
    let mut line_id = 0u64;
    let mut batch_start_line = 0u64;
    let mut current_batch = Vec::with_capacity(config.batch_size.min(8192));
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let read = reader
            .read_line(&mut buffer)
            .with_context(|| format!("Failed to read input line {}", line_id + 1))?;

        if read == 0 {
            if !current_batch.is_empty() {
                let batch = Batch {
                    id: batch_id,
                    start_line_id: batch_start_line,
                    lines: std::mem::take(&mut current_batch),
                };
                send_batch(&config, batch, true);
            }
            break;
        }

        current_batch.push(buffer.trim().to_string());
        line_id += 1;

        if current_batch.len() >= config.batch_size {
            let batch = Batch {
                id: batch_id,
                start_line_id: batch_start_line,
                lines: std::mem::replace(
                    &mut current_batch,
                    Vec::with_capacity(config.batch_size.min(8192)),
                ),
            };
            if !send_batch(&config, batch, false) {
                return Ok(line_id);
            }
            batch_id += 1;
            batch_start_line = line_id;
        }
    }

    Ok(line_id)
}

/// Wait for a credit, then hand the batch to the workers
///
/// Returns false when the downstream side has shut down.
fn send_batch(config: &BatcherThreadConfig, batch: Batch, is_final: bool) -> bool {
    if config.credit_receiver.recv().is_err() {
        return false;
    }

    let info = batch.info(is_final);
    if config.batch_sender.send(batch).is_err() {
        return false;
    }
    config.progress.batch_dispatched(&info);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::progress::NoProgress;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    fn run_batcher(input: &str, batch_size: usize) -> (u64, Vec<Batch>) {
        let (batch_tx, batch_rx) = unbounded();
        let (credit_tx, credit_rx) = unbounded();
        for _ in 0..64 {
            credit_tx.send(()).unwrap();
        }

        let lines_read = batcher_thread(
            Cursor::new(input.to_string()),
            BatcherThreadConfig {
                batch_sender: batch_tx,
                credit_receiver: credit_rx,
                batch_size,
                progress: Arc::new(NoProgress),
            },
        )
        .unwrap();

        (lines_read, batch_rx.try_iter().collect())
    }

    #[test]
    fn test_full_batches_and_final_partial_batch() {
        let (lines_read, batches) = run_batcher("a\nb\nc\nd\ne\n", 2);

        assert_eq!(lines_read, 5);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].lines, vec!["a", "b"]);
        assert_eq!(batches[1].start_line_id, 2);
        assert_eq!(batches[2].lines, vec!["e"]);
        assert_eq!(batches[2].start_line_id, 4);
        assert_eq!(batches[2].id, 2);
    }

    #[test]
    fn test_lines_are_stripped_and_blank_lines_keep_their_id() {
        let (lines_read, batches) = run_batcher("  first  \r\n\nthird", 10);

        assert_eq!(lines_read, 3);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_empty_input_dispatches_nothing() {
        let (lines_read, batches) = run_batcher("", 10);
        assert_eq!(lines_read, 0);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_stops_when_credits_are_withdrawn() {
        let (batch_tx, _batch_rx) = unbounded();
        let (credit_tx, credit_rx) = unbounded::<()>();
        drop(credit_tx);

        let lines_read = batcher_thread(
            Cursor::new("a\nb\nc\n".to_string()),
            BatcherThreadConfig {
                batch_sender: batch_tx,
                credit_receiver: credit_rx,
                batch_size: 1,
                progress: Arc::new(NoProgress),
            },
        )
        .unwrap();

        assert_eq!(lines_read, 1);
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let (batch_tx, _batch_rx) = unbounded();
        let (_credit_tx, credit_rx) = unbounded::<()>();
        let input: Vec<u8> = vec![b'o', b'k', b'\n', 0xff, 0xfe, b'\n'];

        let err = batcher_thread(
            Cursor::new(input),
            BatcherThreadConfig {
                batch_sender: batch_tx,
                credit_receiver: credit_rx,
                batch_size: 10,
                progress: Arc::new(NoProgress),
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("line 2"));
    }
}
