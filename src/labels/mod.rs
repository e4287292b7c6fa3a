//! Ground-truth labeling
//!
//! Truth rows are normalized by [`LabelResolver`] and indexed by
//! [`LogLabelJoiner`]; [`Labeler`] streams a parsed table through the joiner
//! and writes the labeled table.

pub mod joiner;
pub mod resolver;
pub mod table;

pub use joiner::{BlockMatch, DuplicatePolicy, LogLabelJoiner};
pub use resolver::{LabelResolver, RawLabel, ResolvedTruth, UnknownLabelPolicy};
pub use table::{read_truth_table, LabeledTableWriter, ParsedTableReader};

use anyhow::Result;
use std::io::{Read, Write};
use std::time::Instant;

use crate::config::LabelConfig;
use crate::record::TruthRecord;
use crate::stats::LabelStats;

/// A truth table ready to label parsed records
#[derive(Debug, Clone)]
pub struct Labeler {
    joiner: LogLabelJoiner,
    unknown_labels: u64,
}

impl Labeler {
    pub fn from_truth_records(truth: &[TruthRecord], config: &LabelConfig) -> Result<Self> {
        let resolved = LabelResolver::new(config.unknown_label).resolve_all(truth)?;
        Ok(Self {
            joiner: LogLabelJoiner::new(resolved.records, config.duplicates),
            unknown_labels: resolved.unknown_labels,
        })
    }

    pub fn from_truth_reader<R: Read>(truth: R, config: &LabelConfig) -> Result<Self> {
        let rows = read_truth_table(truth)?;
        Self::from_truth_records(&rows, config)
    }

    pub fn joiner(&self) -> &LogLabelJoiner {
        &self.joiner
    }

    /// Label every row of a parsed table, preserving its order
    pub fn label_table<R: Read, W: Write>(&self, parsed: R, output: W) -> Result<LabelStats> {
        let start = Instant::now();
        let mut stats = LabelStats {
            truth_rows: self.joiner.truth_rows(),
            unknown_labels: self.unknown_labels,
            duplicate_block_ids: self.joiner.duplicate_block_ids(),
            ..Default::default()
        };

        let mut reader = ParsedTableReader::new(parsed)?;
        let mut writer = LabeledTableWriter::new(output)?;

        for record in reader.records() {
            let record = record?;
            stats.records_in += 1;
            match self.joiner.lookup(&record) {
                BlockMatch::Matched(_) => stats.matched += 1,
                BlockMatch::Unmatched => stats.unmatched += 1,
                BlockMatch::NoBlock => stats.missing_block_ids += 1,
            }

            for labeled in self.joiner.join_record(record) {
                stats.rows_out += 1;
                stats.anomalies += u64::from(labeled.label);
                writer.write(&labeled)?;
            }
        }

        writer.finish()?;
        stats.processing_time = start.elapsed();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARSED: &str = "line_id,timestamp,log_level,message,block_id\n\
        0,081109 203615,INFO,Received block blk_38865049064139660 of size 67108864 from /10.250.19.102,blk_38865049064139660\n\
        1,081109 203616,INFO,Deleting block blk_7,blk_7\n\
        3,081109 203617,WARN,Replication monitor idle,\n\
        4,081109 203618,INFO,Verification succeeded for blk_5,blk_5\n";

    const TRUTH: &str = "block_id,label\n\
        blk_38865049064139660,Anomaly\n\
        blk_5,Normal\n\
        blk_5,anomaly\n\
        ,Anomaly\n\
        blk_9,bogus\n";

    fn label(config: LabelConfig) -> (LabelStats, Vec<Vec<String>>) {
        let labeler = Labeler::from_truth_reader(TRUTH.as_bytes(), &config).unwrap();
        let mut output = Vec::new();
        let stats = labeler.label_table(PARSED.as_bytes(), &mut output).unwrap();
        let rows = csv::Reader::from_reader(output.as_slice())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (stats, rows)
    }

    fn line_and_label(rows: &[Vec<String>]) -> Vec<(&str, &str, &str)> {
        rows.iter()
            .map(|r| (r[0].as_str(), r[4].as_str(), r[5].as_str()))
            .collect()
    }

    #[test]
    fn test_default_policies_left_join() {
        let (stats, rows) = label(LabelConfig::default());

        assert_eq!(
            line_and_label(&rows),
            vec![
                ("0", "blk_38865049064139660", "1"),
                ("1", "blk_7", "0"),
                ("3", "NO_BLOCK", "0"),
                ("4", "blk_5", "0"),
                ("4", "blk_5", "1"),
            ]
        );
        assert_eq!(stats.truth_rows, 5);
        assert_eq!(stats.unknown_labels, 1);
        assert_eq!(stats.duplicate_block_ids, 1);
        assert_eq!(stats.records_in, 4);
        assert_eq!(stats.rows_out, 5);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.missing_block_ids, 1);
        assert_eq!(stats.anomalies, 2);
    }

    #[test]
    fn test_any_anomaly_collapses_duplicates() {
        let (stats, rows) = label(LabelConfig {
            duplicates: DuplicatePolicy::AnyAnomaly,
            ..Default::default()
        });
        assert_eq!(rows.len(), 4);
        assert_eq!(line_and_label(&rows)[3], ("4", "blk_5", "1"));
        assert_eq!(stats.rows_out, stats.records_in);
    }

    #[test]
    fn test_fail_fast_rejects_unknown_truth_label() {
        let config = LabelConfig {
            unknown_label: UnknownLabelPolicy::FailFast,
            ..Default::default()
        };
        let err = Labeler::from_truth_reader(TRUTH.as_bytes(), &config).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_short_truth_row_labels_normal() {
        let truth = "block_id,label\nblk_7,Anomaly\nblk_5\n";
        let labeler = Labeler::from_truth_reader(truth.as_bytes(), &LabelConfig::default()).unwrap();
        let mut output = Vec::new();
        let stats = labeler.label_table(PARSED.as_bytes(), &mut output).unwrap();
        let rows: Vec<Vec<String>> = csv::Reader::from_reader(output.as_slice())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();

        assert_eq!(line_and_label(&rows)[1], ("1", "blk_7", "1"));
        assert_eq!(line_and_label(&rows)[3], ("4", "blk_5", "0"));
        assert_eq!(stats.truth_rows, 2);
        assert_eq!(stats.unknown_labels, 1);
    }

    #[test]
    fn test_empty_parsed_table_yields_header() {
        let labeler = Labeler::from_truth_reader(TRUTH.as_bytes(), &LabelConfig::default()).unwrap();
        let mut output = Vec::new();
        let stats = labeler
            .label_table("line_id,timestamp,log_level,message,block_id\n".as_bytes(), &mut output)
            .unwrap();
        assert_eq!(stats.rows_out, 0);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "line_id,timestamp,log_level,message,block_id,label\n"
        );
    }
}
