use std::collections::HashMap;

use crate::record::{LabeledRecord, ParsedRecord, ResolvedTruthRecord, NO_BLOCK};

/// How a block id listed more than once in the truth table is joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// One output row per matching truth row, in truth-table order
    #[default]
    FanOut,
    /// Only the first truth row for the block counts
    First,
    /// A single row, anomalous if any truth row for the block is
    AnyAnomaly,
}

/// Result of looking up one parsed record's block id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMatch<'a> {
    /// The record carries no block id
    NoBlock,
    /// The block id is not in the truth table
    Unmatched,
    /// Labels of the matching truth rows, after the duplicate policy
    Matched(&'a [u8]),
}

/// Left join of parsed records onto resolved truth rows by block id
#[derive(Debug, Clone, Default)]
pub struct LogLabelJoiner {
    labels: HashMap<String, Vec<u8>>,
    policy: DuplicatePolicy,
    truth_rows: u64,
    duplicate_block_ids: u64,
}

impl LogLabelJoiner {
    pub fn new<I>(truth: I, policy: DuplicatePolicy) -> Self
    where
        I: IntoIterator<Item = ResolvedTruthRecord>,
    {
        let mut labels: HashMap<String, Vec<u8>> = HashMap::new();
        let mut truth_rows = 0u64;

        for record in truth {
            truth_rows += 1;
            // A truth row without a block id can never match a log line
            if record.block_id == NO_BLOCK {
                continue;
            }
            labels.entry(record.block_id).or_default().push(record.label);
        }

        let duplicate_block_ids = labels.values().filter(|l| l.len() > 1).count() as u64;

        for block_labels in labels.values_mut() {
            match policy {
                DuplicatePolicy::FanOut => {}
                DuplicatePolicy::First => block_labels.truncate(1),
                DuplicatePolicy::AnyAnomaly => {
                    let any = block_labels.iter().any(|&l| l == 1);
                    block_labels.clear();
                    block_labels.push(u8::from(any));
                }
            }
        }

        Self {
            labels,
            policy,
            truth_rows,
            duplicate_block_ids,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn truth_rows(&self) -> u64 {
        self.truth_rows
    }

    /// Number of distinct block ids listed more than once in the truth table
    pub fn duplicate_block_ids(&self) -> u64 {
        self.duplicate_block_ids
    }

    pub fn lookup(&self, record: &ParsedRecord) -> BlockMatch<'_> {
        let key = record.join_key();
        if key == NO_BLOCK {
            return BlockMatch::NoBlock;
        }
        match self.labels.get(key) {
            Some(labels) => BlockMatch::Matched(labels),
            None => BlockMatch::Unmatched,
        }
    }

    /// Label one record; yields at least one row, more under `FanOut`
    pub fn join_record(&self, record: ParsedRecord) -> Vec<LabeledRecord> {
        match self.lookup(&record) {
            BlockMatch::Matched(labels) => match labels {
                [label] => vec![LabeledRecord::from_parsed(record, *label)],
                _ => labels
                    .iter()
                    .map(|&label| LabeledRecord::from_parsed(record.clone(), label))
                    .collect(),
            },
            BlockMatch::NoBlock | BlockMatch::Unmatched => {
                vec![LabeledRecord::from_parsed(record, 0)]
            }
        }
    }

    /// Lazily join a stream of records, preserving their order
    pub fn join<'a, I>(&'a self, records: I) -> impl Iterator<Item = LabeledRecord> + 'a
    where
        I: IntoIterator<Item = ParsedRecord>,
        I::IntoIter: 'a,
    {
        records
            .into_iter()
            .flat_map(move |record| self.join_record(record))
    }

    pub fn join_all<I>(&self, records: I) -> Vec<LabeledRecord>
    where
        I: IntoIterator<Item = ParsedRecord>,
    {
        self.join(records).collect()
    }
}
