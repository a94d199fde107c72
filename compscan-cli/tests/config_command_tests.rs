//! Integration tests for `compscan config` and `compscan rules`.
//!
//! Uses real TOML files in temp directories.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use compscan_cli::commands::{config, load_effective_config, rules};
use compscan_cli::error::CliError;

const VALID_CONFIG: &str = r#"
[general]
log_level = "debug"
log_format = "pretty"

[matcher]
run_deferred_pass = false
rules_dir = "/opt/compscan/contributors"
"#;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("compscan.toml");
    fs::write(&config_path, VALID_CONFIG).expect("should write config");

    let report = config::validate(&config_path).await;

    assert!(report.valid, "valid config should pass: {:?}", report.errors);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_config_validate_invalid_value() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("compscan.toml");
    fs::write(&config_path, "[matcher]\nmax_scanned_files = 0\n").expect("should write config");

    let report = config::validate(&config_path).await;

    assert!(!report.valid);
    assert!(report.errors[0].contains("max_scanned_files"));
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write config");

    let report = config::validate(&config_path).await;
    assert!(!report.valid, "malformed TOML should be invalid");
}

#[tokio::test]
async fn test_config_validate_missing_file() {
    let report = config::validate(std::path::Path::new("/nonexistent/compscan.toml")).await;
    assert!(!report.valid);
    assert!(report.errors[0].contains("not found"));
}

#[tokio::test]
#[serial]
async fn test_config_show_matcher_section() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("compscan.toml");
    fs::write(&config_path, VALID_CONFIG).expect("should write config");

    let report = config::show(&config_path, Some("matcher"))
        .await
        .expect("show should succeed");

    assert_eq!(report.section.as_deref(), Some("matcher"));
    assert!(report.config_toml.contains("/opt/compscan/contributors"));
    assert!(report.config_toml.contains("run_deferred_pass = false"));
    assert!(!report.config_toml.contains("log_format"));
}

#[tokio::test]
async fn test_config_show_unknown_section_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("compscan.toml");
    fs::write(&config_path, VALID_CONFIG).expect("should write config");

    let err = config::show(&config_path, Some("ebpf"))
        .await
        .expect_err("unknown section should fail");
    assert!(matches!(err, CliError::Command(_)));
    assert!(err.to_string().contains("general, matcher"));
}

#[tokio::test]
#[serial]
async fn test_effective_config_defaults_when_file_missing() {
    // SAFETY: serial 테스트에서만 환경변수를 변경
    unsafe { std::env::remove_var("COMPSCAN_MATCHER_RULES_DIR") };

    let config = load_effective_config(std::path::Path::new("/nonexistent/compscan.toml"))
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.matcher.rules_dir, "/etc/compscan/contributors");
}

#[tokio::test]
#[serial]
async fn test_effective_config_env_override_without_file() {
    // SAFETY: serial 테스트에서만 환경변수를 변경
    unsafe { std::env::set_var("COMPSCAN_MATCHER_RULES_DIR", "/srv/rules") };

    let result = load_effective_config(std::path::Path::new("/nonexistent/compscan.toml")).await;

    unsafe { std::env::remove_var("COMPSCAN_MATCHER_RULES_DIR") };

    let config = result.expect("missing file should fall back to defaults");
    assert_eq!(config.matcher.rules_dir, "/srv/rules");
}

#[tokio::test]
async fn test_effective_config_propagates_parse_errors() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("compscan.toml");
    fs::write(&config_path, "not = [valid").expect("should write config");

    assert!(load_effective_config(&config_path).await.is_err());
}

#[tokio::test]
async fn test_rules_validate_reports_per_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join("10-npm.toml"),
        r#"
[[contributor]]
id = "node-module"
suffixes = ["node_modules/*/package.json"]
component = "{dir}"
"#,
    )
    .expect("should write rules");
    fs::write(
        temp_dir.path().join("20-dup.toml"),
        r#"
[[contributor]]
id = "node-module"
suffixes = ["package.json"]
component = "app"
"#,
    )
    .expect("should write rules");
    fs::write(temp_dir.path().join("30-broken.toml"), "[[contributor]\n").expect("should write");
    fs::write(temp_dir.path().join("notes.txt"), "ignored").expect("should write");

    let report = rules::validate(temp_dir.path())
        .await
        .expect("directory should be readable");

    assert_eq!(report.total_files, 3);
    assert_eq!(report.valid, 2);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.contributors, vec!["node-module"]);
    assert_eq!(report.duplicates, vec!["node-module"]);
    assert!(report.errors[0].file.ends_with("30-broken.toml"));
}

#[tokio::test]
async fn test_rules_validate_flags_pinned_root_anchor() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join("os.toml"),
        r#"
[[contributor]]
id = "debian"
suffixes = ["etc/os-release"]
component = "debian"
version = "12"
anchor = "*"
pin_checksum = true
"#,
    )
    .expect("should write rules");

    let report = rules::validate(temp_dir.path())
        .await
        .expect("directory should be readable");

    assert_eq!(report.invalid, 1);
    assert!(report.contributors.is_empty());
}

#[tokio::test]
async fn test_rules_validate_missing_dir_is_io_error() {
    let err = rules::validate(std::path::Path::new("/nonexistent/rules"))
        .await
        .expect_err("missing dir should fail");
    assert_eq!(err.exit_code(), 10);
}
