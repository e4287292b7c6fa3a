use once_cell::sync::Lazy;
use regex::Regex;

/// `blk_` followed by an optional minus sign and at least one digit
static BLOCK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"blk_-?\d+").expect("block id pattern must compile"));

/// Return the leftmost block identifier embedded in a message, if any
pub fn extract_block_id(message: &str) -> Option<&str> {
    BLOCK_ID.find(message).map(|m| m.as_str())
}
