//! Command execution module
//!
//! Wires the CLI subcommands to the parsing pipeline and the labeler, and
//! reports their statistics.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use crate::cli::{Command, LabelArgs, ParseArgs, RunArgs};
use crate::config::{LoglabelConfig, StatsFormat};
use crate::decompression::{DecompressionReader, STDIN_PATH};
use crate::labels::Labeler;
use crate::parallel::{NoProgress, ParallelProcessor, ProgressObserver, StderrProgress};
use crate::parsers::HdfsLineParser;
use crate::platform::{create_output_file, Diagnostics};
use crate::stats::{format_elapsed, LabelStats, ParseStats};

/// Statistics of whichever stages a command ran
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse: Option<ParseStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelStats>,
}

impl RunSummary {
    pub fn format_table(&self) -> String {
        let mut lines = Vec::new();
        if let Some(parse) = &self.parse {
            lines.push(parse.format_stats());
        }
        if let Some(label) = &self.label {
            lines.push(label.format_stats());
        }
        lines.join("\n")
    }
}

/// Open an output table, `-` meaning stdout
fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == STDIN_PATH {
        Ok(Box::new(BufWriter::new(io::stdout().lock())))
    } else {
        Ok(Box::new(create_output_file(path)?))
    }
}

fn progress_for(config: &LoglabelConfig, diagnostics: Diagnostics) -> Arc<dyn ProgressObserver> {
    if config.output.quiet {
        Arc::new(NoProgress)
    } else {
        Arc::new(StderrProgress::new(diagnostics))
    }
}

/// Parse a raw log file into the parsed table
pub fn run_parse(
    args: &ParseArgs,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<ParseStats> {
    parse_file(&args.input, &args.output, config, diagnostics)
}

fn parse_file(
    input: &str,
    output: &str,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<ParseStats> {
    // Open the input first so a missing file never truncates an existing output
    let reader = DecompressionReader::open(input)?;
    let mut writer = open_output(output)?;

    let parser = Arc::new(HdfsLineParser::new()?);
    let processor = ParallelProcessor::new(config.parallel.clone())
        .with_progress(progress_for(config, diagnostics));

    diagnostics.info(&format!(
        "Parsing {} ({} input) with {} workers, {} lines per batch",
        input,
        reader.format_name(),
        processor.config().effective_workers(),
        processor.config().effective_batch_size()
    ));

    let stats = processor
        .process(reader, parser, &mut writer)
        .with_context(|| format!("Failed to parse '{}'", input))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush '{}'", output))?;

    diagnostics.info(&format!(
        "Completed! Output written to: {} ({} records in {})",
        output,
        stats.records_parsed,
        format_elapsed(stats.processing_time)
    ));
    Ok(stats)
}

/// Attach truth labels to a parsed table
pub fn run_label(
    args: &LabelArgs,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<LabelStats> {
    label_file(&args.parsed, &args.labels.truth, &args.output, config, diagnostics)
}

fn label_file(
    parsed: &str,
    truth: &str,
    output: &str,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<LabelStats> {
    if parsed == STDIN_PATH && truth == STDIN_PATH {
        return Err(anyhow!("Parsed table and truth table cannot both be read from stdin"));
    }

    diagnostics.info(&format!("Loading ground truth labels from {}", truth));
    let truth_reader = DecompressionReader::open(truth)?;
    let labeler = Labeler::from_truth_reader(truth_reader, &config.labels)
        .with_context(|| format!("Failed to load truth table '{}'", truth))?;
    diagnostics.info(&format!(
        "Loaded {} truth rows ({} distinct block ids listed more than once)",
        labeler.joiner().truth_rows(),
        labeler.joiner().duplicate_block_ids()
    ));

    let parsed_reader = DecompressionReader::open(parsed)?;
    let mut writer = open_output(output)?;

    let stats = labeler
        .label_table(parsed_reader, &mut writer)
        .with_context(|| format!("Failed to label '{}'", parsed))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush '{}'", output))?;

    diagnostics.info(&format!(
        "Labeled logs written to: {} ({} rows, {} anomalous)",
        output, stats.rows_out, stats.anomalies
    ));
    Ok(stats)
}

/// Parse, then label the freshly written parsed table
pub fn run_all(
    args: &RunArgs,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<RunSummary> {
    if args.parsed_output == STDIN_PATH {
        return Err(anyhow!(
            "--parsed-output must be a file; it is read back for labeling"
        ));
    }

    let parse = parse_file(&args.input, &args.parsed_output, config, diagnostics)?;
    let label = label_file(
        &args.parsed_output,
        &args.labels.truth,
        &args.output,
        config,
        diagnostics,
    )?;

    Ok(RunSummary {
        parse: Some(parse),
        label: Some(label),
    })
}

/// Execute one subcommand and return its statistics
pub fn run_command(
    command: &Command,
    config: &LoglabelConfig,
    diagnostics: Diagnostics,
) -> Result<RunSummary> {
    match command {
        Command::Parse(args) => Ok(RunSummary {
            parse: Some(run_parse(args, config, diagnostics)?),
            label: None,
        }),
        Command::Label(args) => Ok(RunSummary {
            parse: None,
            label: Some(run_label(args, config, diagnostics)?),
        }),
        Command::Run(args) => run_all(args, config, diagnostics),
    }
}

/// Render the summary in the requested stats format
pub fn format_summary(summary: &RunSummary, format: StatsFormat) -> Result<String> {
    match format {
        StatsFormat::Table => Ok(summary.format_table()),
        StatsFormat::Json => {
            serde_json::to_string_pretty(summary).context("Failed to serialize stats")
        }
    }
}
