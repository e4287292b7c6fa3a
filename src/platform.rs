use anyhow::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Stderr writer for diagnostics, honouring `--quiet` and `--no-emoji`
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    pub quiet: bool,
    pub no_emoji: bool,
}

impl Diagnostics {
    pub fn new(quiet: bool, no_emoji: bool) -> Self {
        Self {
            quiet,
            no_emoji: no_emoji || std::env::var("NO_EMOJI").is_ok(),
        }
    }

    pub fn format_info(&self, message: &str) -> String {
        let prefix = if self.no_emoji { "loglabel:" } else { "🔹" };
        format!("{} {}", prefix, message)
    }

    pub fn format_error(&self, message: &str) -> String {
        let prefix = if self.no_emoji { "loglabel:" } else { "⚠️ " };
        format!("{} {}", prefix, message)
    }

    /// Informational line, suppressed by `--quiet`
    pub fn info(&self, message: &str) {
        if !self.quiet {
            write_stderr(&self.format_info(message));
        }
    }

    /// Error line, always printed
    pub fn error(&self, message: &str) {
        write_stderr(&self.format_error(message));
    }

    /// Stats output is explicitly requested, so it ignores `--quiet`
    pub fn stats(&self, message: &str) {
        write_stderr(message);
    }
}

fn write_stderr(line: &str) {
    let mut stderr = io::stderr().lock();
    // A closed stderr leaves nowhere to report the failure
    let _ = writeln!(stderr, "{}", line);
}

/// Create a helpful error message for file creation failures
fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.exists()) {
                "Suggestion: Parent directory does not exist, create it first"
            } else {
                "Suggestion: Check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "Suggestion: Parent directory does not exist, create it first",
        _ if path.is_dir() => "Suggestion: Path points to a directory, specify a filename instead",
        io::ErrorKind::InvalidInput => "Suggestion: Check for invalid characters in filename",
        _ => return base_msg,
    };

    format!("{}\n{}", base_msg, suggestion)
}

/// Create (truncating) an output table file behind a buffered writer
pub fn create_output_file<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path_ref = path.as_ref();
    match File::create(path_ref) {
        Ok(file) => Ok(BufWriter::new(file)),
        Err(e) => Err(anyhow::anyhow!(
            "{}",
            create_helpful_error_message(path_ref, &e)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidUsage as i32, 2);
    }

    #[test]
    fn test_no_emoji_prefix() {
        let diagnostics = Diagnostics {
            quiet: false,
            no_emoji: true,
        };
        assert_eq!(diagnostics.format_info("done"), "loglabel: done");
        assert_eq!(diagnostics.format_error("failed"), "loglabel: failed");
    }

    #[test]
    fn test_emoji_prefix() {
        let diagnostics = Diagnostics {
            quiet: false,
            no_emoji: false,
        };
        assert_eq!(diagnostics.format_info("done"), "🔹 done");
        assert!(diagnostics.format_error("failed").starts_with("⚠️"));
    }

    #[test]
    fn test_create_output_file_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = create_output_file(&path).unwrap_err().to_string();
        assert!(err.contains("Cannot create output file"));
        assert!(err.contains("Parent directory does not exist"));
    }
}
