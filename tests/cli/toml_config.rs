//! CLI TOML configuration tests
//!
//! Configuration files are written to temporary directories and loaded the
//! same way the binary loads them.

use modhost::app::cli::args::Args;
use modhost::app::cli::config::HostConfig;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use toml::Table;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_explicit_file() {
    let file = write_config(
        r#"
        exclude-module = "Template Mod"
        bundle = ["builtin"]
        log-level = "info"
        "#,
    );

    let config = HostConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.excluded_modules, vec!["Template Mod"]);
    assert_eq!(config.bundles, vec!["builtin"]);
    assert!(config.host_options().is_excluded("Template_Mod"));
}

#[test]
fn test_invalid_file_reports_path() {
    let file = write_config(r#"log-format = "fancy""#);

    let error = HostConfig::load(Some(file.path())).unwrap_err();

    assert!(error.message().contains("fancy"), "got: {}", error);
    assert!(
        error
            .message()
            .contains(&file.path().display().to_string()),
        "got: {}",
        error
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(HostConfig::load(Some(missing.as_path())).is_err());
}

#[test]
fn test_apply_values_from_table() {
    let mut config = HostConfig::new();
    let mut table = Table::new();
    table.insert("color".to_string(), toml::Value::Boolean(true));
    table.insert(
        "exclude-module".to_string(),
        toml::Value::Array(vec![
            toml::Value::String("a".to_string()),
            toml::Value::String("a, b".to_string()),
        ]),
    );

    config.apply_toml_values(&table).unwrap();

    assert_eq!(config.color, Some(true));
    assert!(config.use_color());
    assert_eq!(config.excluded_modules, vec!["a", "b"]);
}

#[test]
fn test_cli_flags_win_over_file() {
    let file = write_config(
        r#"
        log-level = "error"
        log-file = "/var/log/modhost.log"
        "#,
    );
    let mut config = HostConfig::load(Some(file.path())).unwrap();
    let args = Args::parse_from_args(["modhost", "--log-level", "debug", "--log-file", "none"])
        .unwrap();

    config.merge_args(&args);

    assert_eq!(config.log_level.as_deref(), Some("debug"));
    assert_eq!(config.log_file, None);
}
