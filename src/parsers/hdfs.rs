use anyhow::{Context, Result};
use regex::Regex;

use super::block_id::extract_block_id;
use super::RecordParser;
use crate::record::ParsedRecord;

/// `<date> <time> <pid> <LEVEL> <component>: <message>` as written by HDFS daemons
const HDFS_LINE_PATTERN: &str = concat!(
    r"^(?P<date>\d{6})\s+",
    r"(?P<time>\d{6})\s+",
    r"(?P<pid>\d+)\s+",
    r"(?P<level>[A-Z]+)\s+",
    r"(?P<component>[a-zA-Z0-9$._]+):\s+",
    r"(?P<message>.+)",
);

/// Parser for the fixed HDFS daemon log layout
///
/// Lines that do not match are reported as `None`; there is no fallback
/// pattern and no partial recovery. The pid and component are required for a
/// match but are not kept in the resulting record.
#[derive(Debug, Clone)]
pub struct HdfsLineParser {
    regex: Regex,
}

impl HdfsLineParser {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(HDFS_LINE_PATTERN).context("Failed to compile HDFS line regex")?;
        Ok(Self { regex })
    }
}

impl RecordParser for HdfsLineParser {
    fn parse_line(&self, line_id: u64, line: &str) -> Option<ParsedRecord> {
        let captures = self.regex.captures(line)?;
        let date = captures.name("date")?.as_str();
        let time = captures.name("time")?.as_str();
        let level = captures.name("level")?.as_str();
        let message = captures.name("message")?.as_str();

        Some(ParsedRecord {
            line_id,
            timestamp: format!("{} {}", date, time),
            log_level: level.to_string(),
            message: message.to_string(),
            block_id: extract_block_id(message).map(str::to_string),
        })
    }
}
