//! CLI argument parsing tests

use modhost::app::cli::args::*;
use std::path::PathBuf;

#[test]
fn test_all_global_flags() {
    let args = Args::parse_from_args([
        "modhost",
        "--config-file",
        "/etc/modhost.toml",
        "--exclude-module",
        "status",
        "--bundle",
        "builtin,extra",
        "--log-level",
        "warn",
        "--log-format",
        "ext",
        "--log-file",
        "/tmp/modhost.log",
        "--no-color",
        "list",
        "--format",
        "json",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/etc/modhost.toml")));
    assert_eq!(args.excluded_modules(), vec!["status"]);
    assert_eq!(args.bundle_names(), vec!["builtin", "extra"]);
    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/modhost.log")));
    assert_eq!(args.color_override(), Some(false));
    assert_eq!(
        args.command,
        Some(Command::List {
            format: "json".to_string()
        })
    );
}

#[test]
fn test_info_requires_an_id() {
    assert!(Args::parse_from_args(["modhost", "info"]).is_err());
}

#[test]
fn test_run_accepts_hyphenated_arguments() {
    let args = Args::parse_from_args(["modhost", "run", "companion", "-x"]).unwrap();
    assert_eq!(
        args.command,
        Some(Command::Run {
            lines: vec!["companion".to_string(), "-x".to_string()]
        })
    );
}

#[test]
fn test_run_without_lines() {
    let args = Args::parse_from_args(["modhost", "run"]).unwrap();
    assert_eq!(args.command, Some(Command::Run { lines: Vec::new() }));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    assert!(Args::parse_from_args(["modhost", "explode"]).is_err());
}
