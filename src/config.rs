use crate::cli::{self, Cli, Command};
use crate::labels::{DuplicatePolicy, UnknownLabelPolicy};
use crate::parallel::ParallelConfig;

/// Main configuration struct for loglabel
#[derive(Debug, Clone, Default)]
pub struct LoglabelConfig {
    pub parallel: ParallelConfig,
    pub labels: LabelConfig,
    pub output: OutputConfig,
}

/// Labeling configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelConfig {
    pub unknown_label: UnknownLabelPolicy,
    pub duplicates: DuplicatePolicy,
}

/// Diagnostics and statistics configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub stats: Option<StatsFormat>,
    pub quiet: bool,
    pub no_emoji: bool,
}

/// Statistics output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsFormat {
    #[default]
    Table,
    Json,
}

impl LoglabelConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self {
            output: OutputConfig {
                stats: cli.stats.map(Into::into),
                quiet: cli.quiet,
                no_emoji: cli.no_emoji,
            },
            ..Default::default()
        };

        match &cli.command {
            Some(Command::Parse(args)) => {
                config.parallel = (&args.performance).into();
            }
            Some(Command::Label(args)) => {
                config.labels = (&args.labels).into();
            }
            Some(Command::Run(args)) => {
                config.parallel = (&args.performance).into();
                config.labels = (&args.labels).into();
            }
            None => {}
        }

        config
    }
}

impl From<&cli::PerformanceArgs> for ParallelConfig {
    fn from(args: &cli::PerformanceArgs) -> Self {
        ParallelConfig {
            num_workers: args.threads,
            batch_size: args.batch_size,
            max_in_flight: args.max_in_flight,
        }
    }
}

impl From<&cli::LabelPolicyArgs> for LabelConfig {
    fn from(args: &cli::LabelPolicyArgs) -> Self {
        LabelConfig {
            unknown_label: args.unknown_label.into(),
            duplicates: args.duplicates.into(),
        }
    }
}

impl From<cli::UnknownLabel> for UnknownLabelPolicy {
    fn from(value: cli::UnknownLabel) -> Self {
        match value {
            cli::UnknownLabel::Normal => UnknownLabelPolicy::DefaultNormal,
            cli::UnknownLabel::Anomaly => UnknownLabelPolicy::DefaultAnomaly,
            cli::UnknownLabel::Fail => UnknownLabelPolicy::FailFast,
        }
    }
}

impl From<cli::Duplicates> for DuplicatePolicy {
    fn from(value: cli::Duplicates) -> Self {
        match value {
            cli::Duplicates::FanOut => DuplicatePolicy::FanOut,
            cli::Duplicates::First => DuplicatePolicy::First,
            cli::Duplicates::AnyAnomaly => DuplicatePolicy::AnyAnomaly,
        }
    }
}

impl From<cli::StatsFormat> for StatsFormat {
    fn from(format: cli::StatsFormat) -> Self {
        match format {
            cli::StatsFormat::Table => StatsFormat::Table,
            cli::StatsFormat::Json => StatsFormat::Json,
        }
    }
}
