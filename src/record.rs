use serde::{Deserialize, Serialize};

/// Placeholder stored in place of a missing block identifier so join keys are never empty
pub const NO_BLOCK: &str = "NO_BLOCK";

/// Column order of the parsed-records table
pub const PARSED_COLUMNS: [&str; 5] = ["line_id", "timestamp", "log_level", "message", "block_id"];

/// Column order of the labeled-records table
pub const LABELED_COLUMNS: [&str; 6] = [
    "line_id",
    "timestamp",
    "log_level",
    "message",
    "block_id",
    "label",
];

/// One successfully parsed log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub line_id: u64,
    pub timestamp: String,
    pub log_level: String,
    pub message: String,
    pub block_id: Option<String>,
}

impl ParsedRecord {
    /// Block id used as a join key, with the sentinel substituted when absent
    pub fn join_key(&self) -> &str {
        match self.block_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => NO_BLOCK,
        }
    }
}

/// A parsed record with its ground-truth label attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub line_id: u64,
    pub timestamp: String,
    pub log_level: String,
    pub message: String,
    pub block_id: String,
    pub label: u8,
}

impl LabeledRecord {
    pub fn from_parsed(record: ParsedRecord, label: u8) -> Self {
        let block_id = record.join_key().to_string();
        Self {
            line_id: record.line_id,
            timestamp: record.timestamp,
            log_level: record.log_level,
            message: record.message,
            block_id,
            label,
        }
    }
}

/// A row of the truth table as read from disk, before label normalization
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TruthRecord {
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl TruthRecord {
    pub fn new(block_id: Option<&str>, label: Option<&str>) -> Self {
        Self {
            block_id: block_id.map(str::to_string),
            label: label.map(str::to_string),
        }
    }
}

/// A truth row after resolution: block id always present, label always 0 or 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTruthRecord {
    pub block_id: String,
    pub label: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(block_id: Option<&str>) -> ParsedRecord {
        ParsedRecord {
            line_id: 7,
            timestamp: "081109 203615".to_string(),
            log_level: "INFO".to_string(),
            message: "Received block".to_string(),
            block_id: block_id.map(str::to_string),
        }
    }

    #[test]
    fn test_join_key_uses_sentinel_for_missing_block() {
        assert_eq!(record(None).join_key(), NO_BLOCK);
        assert_eq!(record(Some("")).join_key(), NO_BLOCK);
        assert_eq!(record(Some("blk_1")).join_key(), "blk_1");
    }

    #[test]
    fn test_labeled_record_carries_resolved_block_id() {
        let labeled = LabeledRecord::from_parsed(record(None), 0);
        assert_eq!(labeled.block_id, NO_BLOCK);
        assert_eq!(labeled.line_id, 7);
        assert_eq!(labeled.label, 0);
    }
}
