//! Subcommand tests against the built-in bundle

use modhost::app::cli::args::Command;
use modhost::app::cli::config::HostConfig;
use modhost::app::startup::{execute, StartupError};
use modhost::module::api::ModuleError;
use std::io::Write;
use tempfile::NamedTempFile;

fn builtin_only() -> HostConfig {
    HostConfig {
        bundles: vec!["builtin".to_string()],
        ..HostConfig::default()
    }
}

#[test]
fn test_list_json_reports_states() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "bundle = \"builtin\"").unwrap();
    writeln!(file, "exclude-module = [\"Template Mod\"]").unwrap();
    let config = HostConfig::load(Some(file.path())).unwrap();

    let output = execute(
        &Command::List {
            format: "json".to_string(),
        },
        &config,
        false,
    )
    .unwrap();

    let modules: serde_json::Value = serde_json::from_str(&output[0]).unwrap();
    let states: Vec<(String, String)> = modules
        .as_array()
        .unwrap()
        .iter()
        .map(|m| {
            (
                m["id"].as_str().unwrap().to_string(),
                m["state"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        states,
        vec![
            ("status".to_string(), "loaded".to_string()),
            ("template-companion".to_string(), "deferred".to_string()),
        ]
    );
}

#[test]
fn test_info_for_companion() {
    let output = execute(
        &Command::Info {
            id: "template-companion".to_string(),
        },
        &builtin_only(),
        false,
    )
    .unwrap();

    assert!(output.contains(&"Before: Template_Mod".to_string()));
    assert!(output.contains(&"Unloads with dependencies: yes".to_string()));
    assert!(output.contains(&"commands: 1".to_string()));
}

#[test]
fn test_run_reaches_module_commands() {
    let output = execute(
        &Command::Run {
            lines: vec!["companion".to_string(), "modules".to_string()],
        },
        &builtin_only(),
        false,
    )
    .unwrap();

    assert_eq!(output[0], "TempExe ran with 0 argument(s)");
    assert_eq!(output.len(), 4);
}

#[test]
fn test_run_with_excluded_command_owner_fails() {
    let config = HostConfig {
        excluded_modules: vec!["status".to_string()],
        ..builtin_only()
    };

    let result = execute(
        &Command::Run {
            lines: vec!["status".to_string()],
        },
        &config,
        false,
    );

    assert!(matches!(
        result,
        Err(StartupError::Module(ModuleError::NotFound { .. }))
    ));
}
