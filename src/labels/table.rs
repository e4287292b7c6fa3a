//! CSV reading and writing for the truth, parsed and labeled tables

use anyhow::{anyhow, Context, Result};
use std::io::{Read, Write};

use crate::record::{LabeledRecord, ParsedRecord, TruthRecord, LABELED_COLUMNS, PARSED_COLUMNS};

/// Columns a truth table must carry; any others are ignored
pub const TRUTH_COLUMNS: [&str; 2] = ["block_id", "label"];

fn require_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    required: &[&str],
    table: &str,
) -> Result<()> {
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read {} header", table))?;
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(anyhow!("{} is missing required column '{}'", table, column));
        }
    }
    Ok(())
}

/// Read the whole truth table, keeping file order. Short rows are accepted;
/// their trailing cells read as missing.
pub fn read_truth_table<R: Read>(reader: R) -> Result<Vec<TruthRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    require_columns(&mut reader, &TRUTH_COLUMNS, "Truth table")?;

    reader
        .deserialize()
        .enumerate()
        .map(|(row, result)| {
            result.with_context(|| format!("Failed to read truth table row {}", row + 1))
        })
        .collect()
}

/// Stream rows of a parsed table in file order
pub struct ParsedTableReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ParsedTableReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        require_columns(&mut reader, &PARSED_COLUMNS, "Parsed table")?;
        Ok(Self { reader })
    }

    pub fn records(&mut self) -> impl Iterator<Item = Result<ParsedRecord>> + '_ {
        self.reader
            .deserialize::<ParsedRecord>()
            .enumerate()
            .map(|(row, result)| {
                result.with_context(|| format!("Failed to read parsed table row {}", row + 1))
            })
    }
}

/// Writes the labeled table; the header is written up front so an empty
/// result still yields a valid table
pub struct LabeledTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LabeledTableWriter<W> {
    pub fn new(output: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer
            .write_record(LABELED_COLUMNS)
            .context("Failed to write output header")?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, record: &LabeledRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .with_context(|| format!("Failed to write labeled record for line {}", record.line_id))
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().context("Failed to flush labeled output")?;
        self.writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to flush labeled output: {}", e.error()))
    }
}
