mod common;
use common::*;

fn batches_from_stats(stderr: &str) -> u64 {
    let stats: serde_json::Value = serde_json::from_str(stderr).expect("stats should be JSON");
    stats["parse"]["batches"].as_u64().expect("batches count")
}

#[test]
fn test_project_config_section_defaults_apply() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "[parse]\ndefaults = --batch-size 2 --threads 1\n");

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &["-q", "--stats=json", "parse", "HDFS.log", "-o", "parsed.csv"],
        None,
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(batches_from_stats(&stderr), 4);
}

#[test]
fn test_cli_arguments_override_config() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "[parse]\ndefaults = --batch-size 2\n");

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &[
            "-q",
            "--stats=json",
            "parse",
            "HDFS.log",
            "-o",
            "parsed.csv",
            "--batch-size",
            "3",
        ],
        None,
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(batches_from_stats(&stderr), 3);
}

#[test]
fn test_root_defaults_apply_to_every_command() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "defaults = -q --stats=json\n");

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &["parse", "HDFS.log", "-o", "parsed.csv"],
        None,
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(batches_from_stats(&stderr), 1);
}

#[test]
fn test_ignore_config() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "[parse]\ndefaults = --batch-size 2\n");

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &["--ignore-config", "-q", "--stats=json", "parse", "HDFS.log", "-o", "parsed.csv"],
        None,
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(batches_from_stats(&stderr), 1);
}

#[test]
fn test_custom_config_file() {
    let ws = Workspace::new();
    ws.write("custom.ini", "[label]\ndefaults = --unknown-label anomaly\n");
    let (_, _, exit_code) = ws.run(&["-q", "parse", "HDFS.log", "-o", "parsed.csv"]);
    assert_eq!(exit_code, 0);

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &[
            "--config-file",
            "custom.ini",
            "-q",
            "label",
            "parsed.csv",
            "-t",
            "anomaly_label.csv",
            "-o",
            "labeled.csv",
        ],
        None,
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    // The empty truth label for blk_7128370237687728475 now resolves to 1
    let rows = csv_rows(&ws.read("labeled.csv"));
    assert_eq!(rows[2][4], "blk_7128370237687728475");
    assert_eq!(rows[2][5], "1");
}

#[test]
fn test_broken_defaults_are_a_config_error() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "defaults = --stats 'unterminated\n");

    let (_, stderr, exit_code) = run_loglabel_raw(
        ws.dir.path(),
        &["--no-emoji", "parse", "HDFS.log"],
        None,
    );
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("loglabel: Config error"), "stderr: {}", stderr);
}

#[test]
fn test_show_config() {
    let ws = Workspace::new();
    ws.write(".loglabelrc", "defaults = --no-emoji\n[run]\ndefaults = --threads 2\n");

    let (stdout, _, exit_code) = run_loglabel_raw(ws.dir.path(), &["--show-config"], None);
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("Configuration precedence"));
    assert!(stdout.contains("defaults = --no-emoji"));
    assert!(stdout.contains("[run]"));
    assert!(stdout.contains("defaults = --threads 2"));
}
