//! End-to-end tests for the partload binary
//!
//! Every test runs against an isolated config directory and never reaches
//! the network: paths are derived from an explicit bucket and account id,
//! and the failure cases stop before authentication.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn run(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_partload"))
        .args(args)
        .env("PARTLOAD_CONFIG_DIR", config_dir)
        .env_remove("PARTLOAD_TOKEN")
        .env_remove("PARTLOAD_BUCKET")
        .env_remove("PARTLOAD_ACCOUNT_ID")
        .env_remove("PARTLOAD_AUTH_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute partload")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn paths_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["paths", "--bucket", "b", "--account-id", "1"];
    args.extend_from_slice(extra);
    args
}

#[test]
fn test_paths_single_experiment() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&[
            "--type",
            "decisions",
            "--date",
            "2020-07-01",
            "--experiment",
            "56789",
        ]),
        config_dir.path(),
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        vec!["s3://b/v1/account_id=1/type=decisions/date=2020-07-01/experiment=56789/"]
    );
}

#[test]
fn test_paths_date_range() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&[
            "--type",
            "events",
            "--start",
            "2020-12-30",
            "--end",
            "2021-01-03",
        ]),
        config_dir.path(),
    );

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![
            "s3://b/v1/account_id=1/type=events/date=2020-12-30/",
            "s3://b/v1/account_id=1/type=events/date=2020-12-31/",
            "s3://b/v1/account_id=1/type=events/date=2021-01-01/",
            "s3://b/v1/account_id=1/type=events/date=2021-01-02/",
            "s3://b/v1/account_id=1/type=events/date=2021-01-03/",
        ]
    );
}

#[test]
fn test_paths_base_only() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&paths_args(&[]), config_dir.path());

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["s3://b/v1/account_id=1/"]);
}

#[test]
fn test_paths_json() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&["--json", "--type", "decisions", "--date", "2020-07-01"]),
        config_dir.path(),
    );

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths = value["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0]["relative"], "type=decisions/date=2020-07-01");
    assert_eq!(
        paths[0]["absolute"],
        "s3://b/v1/account_id=1/type=decisions/date=2020-07-01/"
    );
}

#[test]
fn test_invalid_type_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&paths_args(&["--type", "clicks"]), config_dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_reversed_range_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&[
            "--type",
            "events",
            "--start",
            "2020-07-05",
            "--end",
            "2020-07-01",
        ]),
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid date range"), "stderr: {stderr}");
}

#[test]
fn test_malformed_date_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&["--type", "events", "--date", "2020-7-1"]),
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_base_path_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["paths", "--type", "events"], config_dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot determine base path"), "stderr: {stderr}");
}

#[test]
fn test_json_error_output() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["paths", "--json"], config_dir.path());

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(value["error"].as_str().unwrap().contains("base path"));
}

#[test]
fn test_experiment_and_event_conflict() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&[
            "--type",
            "events",
            "--date",
            "2020-07-01",
            "--experiment",
            "1",
            "--event",
            "click",
        ]),
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be used together"), "stderr: {stderr}");
}

#[test]
fn test_partition_value_with_slash_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(
        &paths_args(&["--type", "events", "--date", "2020-07-01", "--event", "a/b"]),
        config_dir.path(),
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_auth_without_token_fails() {
    let config_dir = TempDir::new().unwrap();
    let output = run(&["auth"], config_dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No access token"), "stderr: {stderr}");
}

#[test]
fn test_bucket_from_config_file() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(
        config_dir.path().join("config.toml"),
        "schema_version = 1\n\n[defaults]\nbucket = \"cfg-bucket\"\naccount_id = \"42\"\n",
    )
    .unwrap();

    let output = run(&["paths", "--type", "events"], config_dir.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        vec!["s3://cfg-bucket/v1/account_id=42/type=events/"]
    );
}
