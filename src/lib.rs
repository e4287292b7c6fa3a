// Core library for the loglabel HDFS log parser and anomaly labeler

pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod labels;
pub mod parallel;
pub mod parsers;
pub mod platform;
pub mod record;
pub mod runner;
pub mod stats;

pub use config::{LabelConfig, LoglabelConfig};
pub use labels::{DuplicatePolicy, Labeler, LogLabelJoiner, UnknownLabelPolicy};
pub use parallel::{ParallelConfig, ParallelProcessor};
pub use parsers::{extract_block_id, HdfsLineParser, RecordParser};
pub use record::{LabeledRecord, ParsedRecord, ResolvedTruthRecord, TruthRecord, NO_BLOCK};
