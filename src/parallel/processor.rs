//! Main parallel processor
//!
//! Contains the ParallelProcessor struct that orchestrates the parallel pipeline:
//! one batcher thread, a fixed pool of worker threads, and the ordered sink
//! running on the calling thread, which owns the output writer.

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, unbounded};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::parsers::RecordParser;
use crate::stats::ParseStats;

use super::batching::{batcher_thread, BatcherThreadConfig};
use super::progress::{NoProgress, ProgressObserver};
use super::sink::{ordered_result_sink, write_parsed_header};
use super::types::{Batch, BatchResult, ParallelConfig};
use super::worker::worker_thread;

/// Main parallel processor
pub struct ParallelProcessor {
    config: ParallelConfig,
    progress: Arc<dyn ProgressObserver>,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
            progress: Arc::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Parse every line of `reader` and write the parsed table to `output`
    ///
    /// Rows appear in input order regardless of the worker count. A failed
    /// batch aborts the run; rows of earlier batches may already be written.
    pub fn process<R, W, P>(&self, reader: R, parser: Arc<P>, output: &mut W) -> Result<ParseStats>
    where
        R: std::io::BufRead + Send + 'static,
        W: Write,
        P: RecordParser + ?Sized + 'static,
    {
        let num_workers = self.config.effective_workers();
        let max_in_flight = self.config.effective_max_in_flight();
        let start = Instant::now();

        let (batch_sender, batch_receiver) = bounded::<Batch>(max_in_flight);
        let (result_sender, result_receiver) = unbounded::<BatchResult>();
        let (credit_sender, credit_receiver) = bounded::<()>(max_in_flight);
        for _ in 0..max_in_flight {
            credit_sender
                .send(())
                .map_err(|_| anyhow!("Credit channel closed before start"))?;
        }

        let batcher_handle = {
            let config = BatcherThreadConfig {
                batch_sender,
                credit_receiver,
                batch_size: self.config.effective_batch_size(),
                progress: Arc::clone(&self.progress),
            };
            thread::Builder::new()
                .name("loglabel-batcher".to_string())
                .spawn(move || batcher_thread(reader, config))
                .context("Failed to spawn batcher thread")?
        };

        let mut worker_handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let batch_receiver = batch_receiver.clone();
            let result_sender = result_sender.clone();
            let parser = Arc::clone(&parser);

            let handle = thread::Builder::new()
                .name(format!("loglabel-worker-{}", worker_id))
                .spawn(move || worker_thread(worker_id, batch_receiver, result_sender, parser))
                .context("Failed to spawn worker thread")?;
            worker_handles.push(handle);
        }

        // Drop our copies so channel closure tracks the threads
        drop(batch_receiver);
        drop(result_sender);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        let sink_result = write_parsed_header(&mut writer).and_then(|_| {
            ordered_result_sink(
                result_receiver,
                &mut writer,
                credit_sender,
                self.progress.as_ref(),
            )
        });

        let batcher_result = batcher_handle
            .join()
            .map_err(|_| anyhow!("Batcher thread panicked"))?;

        for (idx, handle) in worker_handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| anyhow!("Worker thread {} panicked", idx))??;
        }

        let mut stats = sink_result?;
        let lines_read = batcher_result?;
        if lines_read != stats.lines_read {
            return Err(anyhow!(
                "Read {} lines but only {} reached the output",
                lines_read,
                stats.lines_read
            ));
        }

        writer.flush().context("Failed to flush parsed output")?;
        stats.processing_time = start.elapsed();
        self.progress.finished(&stats);

        Ok(stats)
    }
}
