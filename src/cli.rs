// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::{Args, Parser, Subcommand};

use crate::parallel::{DEFAULT_BATCH_SIZE, DEFAULT_NUM_WORKERS};

/// Default path of the parsed-records table
pub const DEFAULT_PARSED_OUTPUT: &str = "parsed_logs.csv";
/// Default path of the labeled-records table
pub const DEFAULT_LABELED_OUTPUT: &str = "parsed_logs_labeled_full.csv";

// CLI types - specific to command-line interface
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    Table,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownLabel {
    #[default]
    Normal,
    Anomaly,
    Fail,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Duplicates {
    #[default]
    FanOut,
    First,
    AnyAnomaly,
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "loglabel")]
#[command(about = "Parse HDFS logs into CSV records and attach block-level anomaly labels")]
#[command(
    long_about = "Parse HDFS logs into CSV records and attach block-level anomaly labels\n\nSTAGES:\n  parse   Log file -> parsed table (line_id,timestamp,log_level,message,block_id)\n  label   Parsed table + truth table -> labeled table (adds label 0/1)\n  run     Both stages back to back\n\nCOMMON EXAMPLES:\n  loglabel parse HDFS.log -o parsed_logs.csv --threads 8\n  loglabel label parsed_logs.csv --truth anomaly_label.csv\n  loglabel run HDFS.log.gz --truth anomaly_label.csv --stats=json"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print run statistics to stderr when finished
    #[arg(
        short = 's',
        long = "stats",
        value_enum,
        value_name = "FORMAT",
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = "table",
        global = true,
        help_heading = "Metrics and Stats"
    )]
    pub stats: Option<StatsFormat>,

    /// Suppress progress and informational messages
    #[arg(short = 'q', long = "quiet", global = true, help_heading = "Output Options")]
    pub quiet: bool,

    /// Disable emoji prefixes
    #[arg(long = "no-emoji", global = true, help_heading = "Display Options")]
    pub no_emoji: bool,

    /// Specify custom configuration file path
    #[arg(long = "config-file", global = true, help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Ignore configuration file
    #[arg(long = "ignore-config", global = true, help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Show configuration file and exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Parse a raw log file into the parsed-records table
    Parse(ParseArgs),
    /// Attach truth labels to a parsed-records table
    Label(LabelArgs),
    /// Parse a raw log file, then label the result
    Run(RunArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Parse(_) => "parse",
            Command::Label(_) => "label",
            Command::Run(_) => "run",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Raw log file (gzip and zstd are detected automatically, "-" reads stdin)
    pub input: String,

    /// Parsed table to write ("-" writes stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_PARSED_OUTPUT)]
    pub output: String,

    #[command(flatten)]
    pub performance: PerformanceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LabelArgs {
    /// Parsed table produced by `loglabel parse`
    pub parsed: String,

    /// Labeled table to write ("-" writes stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_LABELED_OUTPUT)]
    pub output: String,

    #[command(flatten)]
    pub labels: LabelPolicyArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Raw log file (gzip and zstd are detected automatically, "-" reads stdin)
    pub input: String,

    /// Where the intermediate parsed table is kept
    #[arg(long = "parsed-output", default_value = DEFAULT_PARSED_OUTPUT)]
    pub parsed_output: String,

    /// Labeled table to write ("-" writes stdout)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_LABELED_OUTPUT)]
    pub output: String,

    #[command(flatten)]
    pub performance: PerformanceArgs,

    #[command(flatten)]
    pub labels: LabelPolicyArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PerformanceArgs {
    /// Number of worker threads (0 = one per CPU)
    #[arg(
        long = "threads",
        default_value_t = DEFAULT_NUM_WORKERS,
        help_heading = "Performance Options"
    )]
    pub threads: usize,

    /// Lines per batch handed to a worker
    #[arg(
        long = "batch-size",
        default_value_t = DEFAULT_BATCH_SIZE,
        help_heading = "Performance Options"
    )]
    pub batch_size: usize,

    /// Batches dispatched but not yet written (0 = twice the thread count, at most 4096)
    #[arg(
        long = "max-in-flight",
        default_value_t = 0,
        help_heading = "Performance Options"
    )]
    pub max_in_flight: usize,
}

#[derive(Args, Debug, Clone)]
pub struct LabelPolicyArgs {
    /// Truth table with block_id and label columns
    #[arg(short = 't', long = "truth", help_heading = "Labeling Options")]
    pub truth: String,

    /// Label for truth rows whose label is missing or unrecognized
    #[arg(
        long = "unknown-label",
        value_enum,
        default_value_t = UnknownLabel::Normal,
        help_heading = "Labeling Options"
    )]
    pub unknown_label: UnknownLabel,

    /// How block ids listed more than once in the truth table are joined
    #[arg(
        long = "duplicates",
        value_enum,
        default_value_t = Duplicates::FanOut,
        help_heading = "Labeling Options"
    )]
    pub duplicates: Duplicates,
}
