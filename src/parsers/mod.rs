pub mod block_id;
pub mod hdfs;

pub use block_id::extract_block_id;
pub use hdfs::HdfsLineParser;

use crate::record::ParsedRecord;

/// Turns one raw input line into a record, or `None` when the line does not match
///
/// Implementations are shared across worker threads and must not keep
/// per-line state.
pub trait RecordParser: Send + Sync {
    fn parse_line(&self, line_id: u64, line: &str) -> Option<ParsedRecord>;
}
