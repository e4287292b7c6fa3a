use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Subcommands that may carry their own `defaults` section
pub const SUBCOMMANDS: [&str; 3] = ["parse", "label", "run"];

/// Global options whose value is passed as a separate argument
const GLOBAL_OPTIONS_WITH_VALUE: [&str; 1] = ["--config-file"];

const PROJECT_CONFIG_NAME: &str = ".loglabelrc";

/// Configuration file handler for loglabel
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Global arguments inserted right after the program name
    pub defaults: Option<String>,
    /// Per-subcommand arguments inserted right after the subcommand name
    pub command_defaults: HashMap<String, String>,
}

impl ConfigFile {
    /// Find project-level .loglabelrc by walking up from `start`
    pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let config_path = current.join(PROJECT_CONFIG_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                // Reached filesystem root
                break;
            }
        }
        None
    }

    pub fn find_project_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_config_from(&current)
    }

    /// User config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("loglabel").join("config.ini"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(PROJECT_CONFIG_NAME));
        }
        paths
    }

    /// Load configuration with proper precedence: project > user > defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Only the first existing user config file is used
        if let Some(path) = Self::get_user_config_paths().into_iter().find(|p| p.exists()) {
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            config = Self::merge_configs(config, Self::load_from_path(&project_path)?);
        }

        Ok(config)
    }

    /// Load configuration with optional custom config file path
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::parse_ini_content(&content))
    }

    /// Parse INI content; unknown keys and sections are ignored
    pub fn parse_ini_content(content: &str) -> Self {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != "defaults" {
                continue;
            }

            let value = value.trim().to_string();
            if current_section.is_empty() {
                config.defaults = Some(value);
            } else if SUBCOMMANDS.contains(&current_section.as_str()) {
                config.command_defaults.insert(current_section.clone(), value);
            }
        }

        config
    }

    /// Merge two configuration objects, with the second taking precedence
    fn merge_configs(base: Self, overlay: Self) -> Self {
        let mut command_defaults = base.command_defaults;
        command_defaults.extend(overlay.command_defaults);
        Self {
            defaults: overlay.defaults.or(base.defaults),
            command_defaults,
        }
    }

    /// Insert configured defaults in front of the user's own arguments
    ///
    /// Because the CLI keeps the last occurrence of a repeated option, anything
    /// the user types overrides the configured value.
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut args = args.into_iter();
        let mut result: Vec<String> = args.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            let default_args = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            result.extend(default_args);
        }

        let rest: Vec<String> = args.collect();
        let Some(position) = find_subcommand(&rest) else {
            result.extend(rest);
            return Ok(result);
        };

        let command = rest[position].as_str();
        result.extend(rest[..=position].iter().cloned());
        if let Some(section_defaults) = self.command_defaults.get(command) {
            let section_args = shell_words::split(section_defaults).with_context(|| {
                format!("Invalid defaults in [{}]: failed to parse arguments", command)
            })?;
            result.extend(section_args);
        }
        result.extend(rest[position + 1..].iter().cloned());

        Ok(result)
    }

    /// Show configuration information with precedence details
    pub fn show_config(custom_path: Option<&str>) {
        println!("Configuration precedence: CLI > project {} > user config > defaults\n", PROJECT_CONFIG_NAME);

        let project_config_path = Self::find_project_config();
        let user_config_paths = Self::get_user_config_paths();
        let user_config_path = user_config_paths.iter().find(|p| p.exists());

        match Self::load_with_custom_path(custom_path) {
            Ok(merged_config) => {
                let mut loaded_from = Vec::new();
                if let Some(path) = custom_path {
                    loaded_from.push(format!("Custom: {}", path));
                } else {
                    if let Some(project_path) = &project_config_path {
                        loaded_from.push(format!("Project: {}", project_path.display()));
                    }
                    if let Some(user_path) = user_config_path {
                        loaded_from.push(format!("User: {}", user_path.display()));
                    }
                }

                if loaded_from.is_empty() {
                    println!("No configuration files found. Using defaults.");
                } else {
                    println!("Configuration loaded from:");
                    for source in loaded_from {
                        println!("  {}", source);
                    }
                }

                if let Some(defaults) = &merged_config.defaults {
                    println!("\nActive defaults:");
                    println!("  defaults = {}", defaults);
                }

                for command in SUBCOMMANDS {
                    if let Some(value) = merged_config.command_defaults.get(command) {
                        println!("\n[{}]", command);
                        println!("  defaults = {}", value);
                    }
                }
            }
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
            }
        }

        println!("\nConfiguration search locations (in precedence order):");
        match &project_config_path {
            Some(project_path) => println!("  1. Project: {} (found)", project_path.display()),
            None => println!(
                "  1. Project: {} (searched up directory tree, not found)",
                PROJECT_CONFIG_NAME
            ),
        }
        for (i, path) in user_config_paths.iter().enumerate() {
            let status = if path.exists() { "(found)" } else { "(not found)" };
            println!("  {}. User: {} {}", i + 2, path.display(), status);
        }

        if project_config_path.is_none() && user_config_path.is_none() {
            println!("\nExample configuration file ({}):", PROJECT_CONFIG_NAME);
            println!();
            println!("# Global arguments applied to every loglabel command");
            println!("defaults = --no-emoji --stats");
            println!();
            println!("[parse]");
            println!("defaults = --threads 8 --batch-size 50000");
            println!();
            println!("[label]");
            println!("defaults = --duplicates any-anomaly");
        }
    }
}

/// Position of the subcommand name, skipping values of global options
fn find_subcommand(args: &[String]) -> Option<usize> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if GLOBAL_OPTIONS_WITH_VALUE.contains(&arg) {
            i += 2;
            continue;
        }
        if arg == "--" {
            return None;
        }
        if SUBCOMMANDS.contains(&arg) {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Extract --config-file argument from raw args
pub fn extract_config_file_arg(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--config-file" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--config-file=").map(str::to_string)
        }
    })
}
