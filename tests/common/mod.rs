// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

pub const SAMPLE_LOG: &str = "\
081109 203615 148 INFO dfs.DataNode$PacketResponder: PacketResponder 1 for block blk_38865049064139660 terminating
081109 203807 222 INFO dfs.DataNode$PacketResponder: PacketResponder 0 for block blk_-6952295868487656571 terminating
this line does not match the pattern

081109 204005 35 INFO dfs.FSNamesystem: BLOCK* NameSystem.addStoredBlock: blockMap updated: 10.251.73.220:50010 is added to blk_7128370237687728475 size 67108864
081109 204015 308 INFO dfs.DataNode$PacketResponder: Received block blk_38865049064139660 of size 67108864 from /10.250.19.102
081109 204106 329 WARN dfs.FSNamesystem: Replication monitor idle
";

pub const SAMPLE_TRUTH: &str = "\
BlockId,block_id,label
x,blk_38865049064139660,Anomaly
x,blk_-6952295868487656571,Normal
x,blk_7128370237687728475,
";

/// Run the loglabel binary inside `dir`, ignoring any user configuration
pub fn run_loglabel_in(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let mut full_args = vec!["--ignore-config", "--no-emoji"];
    full_args.extend_from_slice(args);
    run_loglabel_raw(dir, &full_args, None)
}

/// Run the loglabel binary with exactly `args` and optional stdin
pub fn run_loglabel_raw(dir: &Path, args: &[&str], input: Option<&str>) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_loglabel"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("NO_EMOJI")
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start loglabel");

    if let (Some(input), Some(mut stdin)) = (input, cmd.stdin.take()) {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Temporary working directory seeded with the sample log and truth table
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        };
        workspace.write("HDFS.log", SAMPLE_LOG);
        workspace.write("anomaly_label.csv", SAMPLE_TRUTH);
        workspace
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("Failed to read output")
    }

    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        run_loglabel_in(self.dir.path(), args)
    }
}

/// CSV rows (without the header) as vectors of cells
pub fn csv_rows(content: &str) -> Vec<Vec<String>> {
    csv::Reader::from_reader(content.as_bytes())
        .records()
        .map(|r| r.expect("valid csv row").iter().map(str::to_string).collect())
        .collect()
}
