#![no_main]

use libfuzzer_sys::fuzz_target;
use loglabel::{extract_block_id, HdfsLineParser, RecordParser};
use std::sync::OnceLock;

const MAX_LINE_LEN: usize = 4096;

static PARSER: OnceLock<HdfsLineParser> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > MAX_LINE_LEN {
        return;
    }
    let line = match std::str::from_utf8(data) {
        Ok(s) => s.trim(),
        Err(_) => return,
    };
    // The pipeline splits on newlines before parsing
    if line.contains(['\n', '\r']) {
        return;
    }

    let parser = PARSER.get_or_init(|| HdfsLineParser::new().expect("pattern compiles"));
    let line_id = data.len() as u64;

    if let Some(record) = parser.parse_line(line_id, line) {
        assert_eq!(record.line_id, line_id);
        let (date, _time) = record.timestamp.split_once(' ').expect("date and time");
        assert!(line.starts_with(date));
        assert!(line.ends_with(&record.message));
        assert_eq!(record.block_id.as_deref(), extract_block_id(&record.message));
        if let Some(block_id) = &record.block_id {
            assert!(record.message.contains(block_id.as_str()));
        }
    }
});
