use clap::{CommandFactory, FromArgMatches};

use loglabel::cli::Cli;
use loglabel::config::LoglabelConfig;
use loglabel::config_file::{extract_config_file_arg, ConfigFile};
use loglabel::platform::{Diagnostics, ExitCode};
use loglabel::runner::{format_summary, run_command};

fn main() {
    let cli = process_args_with_config();
    let config = LoglabelConfig::from_cli(&cli);
    let diagnostics = Diagnostics::new(config.output.quiet, config.output.no_emoji);

    let Some(command) = &cli.command else {
        let _ = Cli::command().print_help();
        ExitCode::InvalidUsage.exit();
    };

    let summary = match run_command(command, &config, diagnostics) {
        Ok(summary) => summary,
        Err(e) => {
            diagnostics.error(&format!("Error: {:#}", e));
            ExitCode::GeneralError.exit();
        }
    };

    if let Some(format) = config.output.stats {
        match format_summary(&summary, format) {
            Ok(text) => diagnostics.stats(&text),
            Err(e) => {
                diagnostics.error(&format!("Error: {:#}", e));
                ExitCode::GeneralError.exit();
            }
        }
    }

    ExitCode::Success.exit();
}

/// Process command line arguments with config file support
fn process_args_with_config() -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();
    let no_emoji =
        raw_args.iter().any(|arg| arg == "--no-emoji") || std::env::var("NO_EMOJI").is_ok();
    let early = Diagnostics::new(false, no_emoji);

    // Extract --config-file argument early for use by config commands
    let config_file_path = extract_config_file_arg(&raw_args);

    if raw_args.iter().any(|arg| arg == "--show-config") {
        ConfigFile::show_config(config_file_path.as_deref());
        ExitCode::Success.exit();
    }

    let processed_args = if raw_args.iter().any(|arg| arg == "--ignore-config") {
        raw_args
    } else {
        match ConfigFile::load_with_custom_path(config_file_path.as_deref())
            .and_then(|config_file| config_file.process_args(raw_args))
        {
            Ok(processed) => processed,
            Err(e) => {
                early.error(&format!("Config error: {:#}", e));
                ExitCode::GeneralError.exit();
            }
        }
    };

    let matches = Cli::command().get_matches_from(processed_args);
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| {
        early.error(&format!("Error: {}", e));
        ExitCode::InvalidUsage.exit();
    })
}
