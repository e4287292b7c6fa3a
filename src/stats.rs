use serde::Serialize;
use std::time::Duration;

/// Counters collected while parsing a log file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines_read: u64,
    pub records_parsed: u64,
    pub lines_dropped: u64,
    pub batches: u64,
    #[serde(serialize_with = "serialize_millis", rename = "processing_time_ms")]
    pub processing_time: Duration,
}

impl ParseStats {
    /// Fold the counters of one finished batch into the running totals
    pub fn merge_batch(&mut self, batch: &ParseStats) {
        self.lines_read += batch.lines_read;
        self.records_parsed += batch.records_parsed;
        self.lines_dropped += batch.lines_dropped;
        self.batches += batch.batches;
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} parsed, {} dropped; {} batches",
            self.lines_read, self.records_parsed, self.lines_dropped, self.batches
        );

        output.push_str(&format!(" in {}", format_elapsed(self.processing_time)));

        let processing_time_ms = self.processing_time.as_millis();
        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }
}

/// Counters collected while joining parsed records with truth labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelStats {
    pub truth_rows: u64,
    pub unknown_labels: u64,
    pub duplicate_block_ids: u64,
    pub records_in: u64,
    pub rows_out: u64,
    pub matched: u64,
    pub unmatched: u64,
    pub missing_block_ids: u64,
    pub anomalies: u64,
    #[serde(serialize_with = "serialize_millis", rename = "processing_time_ms")]
    pub processing_time: Duration,
}

impl LabelStats {
    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Truth rows: {} total, {} unknown labels, {} duplicate block ids; ",
            self.truth_rows, self.unknown_labels, self.duplicate_block_ids
        );
        output.push_str(&format!(
            "Records labeled: {} in, {} out, {} matched, {} unmatched, {} without block id, {} anomalies",
            self.records_in,
            self.rows_out,
            self.matched,
            self.unmatched,
            self.missing_block_ids,
            self.anomalies
        ));
        output.push_str(&format!(" in {}", format_elapsed(self.processing_time)));
        output
    }
}

/// Elapsed time rounded to milliseconds, e.g. `1s 250ms`
pub fn format_elapsed(elapsed: Duration) -> String {
    let rounded = Duration::from_millis(elapsed.as_millis() as u64);
    if rounded.is_zero() {
        return "0ms".to_string();
    }
    humantime::format_duration(rounded).to_string()
}

fn serialize_millis<S: serde::Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}
