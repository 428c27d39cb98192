//! Tests for the application layer against the built-in bundle

use super::cli::args::Command;
use super::cli::config::HostConfig;
use super::commands::{list_modules, module_info, run_commands};
use super::startup::{build_host, execute, StartupError};
use crate::builtin::companion::COMPANION_ID;
use crate::module::api::{ModuleError, ModuleState};

fn builtin_config() -> HostConfig {
    HostConfig {
        bundles: vec![crate::builtin::BUNDLE.to_string()],
        ..HostConfig::default()
    }
}

#[test]
fn test_builtin_bundle_loads_completely() {
    let host = build_host(&builtin_config());

    let mut loaded = host.loaded_ids();
    loaded.sort();
    assert_eq!(loaded, vec!["Template_Mod", "status", COMPANION_ID]);
    assert!(host.pending_ids().is_empty());
    assert!(host.content().ports.contains_key("Template_Mod.tempPort"));
    assert!(host.content().conditions.contains_key("TemplateFlag"));

    // The companion always activates after the template module
    let order = host.loaded_ids();
    let template = order.iter().position(|id| id == "Template_Mod");
    let companion = order.iter().position(|id| id == COMPANION_ID);
    assert!(template < companion);
}

#[test]
fn test_excluding_template_leaves_companion_waiting() {
    let config = HostConfig {
        excluded_modules: vec!["Template Mod".to_string()],
        ..builtin_config()
    };
    let host = build_host(&config);

    assert_eq!(host.module_state(COMPANION_ID), Some(ModuleState::Deferred));
    assert_eq!(host.waiting_on("Template_Mod"), vec![COMPANION_ID]);
    assert!(host.known_module("Template_Mod").is_none());
}

#[test]
fn test_unloading_template_cascades_to_companion() {
    let host = build_host(&builtin_config());

    host.unload_by_id("Template Mod");

    assert_eq!(host.module_state(COMPANION_ID), Some(ModuleState::Unloaded));
    assert_eq!(host.loaded_ids(), vec!["status"]);
    assert!(host.content().ports.is_empty());
    assert!(!host.content().commands.contains_key("companion"));
}

#[test]
fn test_list_text_and_json() {
    let host = build_host(&builtin_config());

    let text = list_modules(&host, "text", false).unwrap();
    assert_eq!(text.len(), 3);
    assert!(text.iter().all(|line| line.ends_with("loaded")));

    let json = list_modules(&host, "json", false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json[0]).unwrap();
    let modules = value.as_array().unwrap();
    assert_eq!(modules.len(), 3);
    assert_eq!(modules[0]["id"], "Template_Mod");
    assert_eq!(modules[0]["after"][0], COMPANION_ID);
    assert_eq!(modules[2]["allow_order_unload"], true);
}

#[test]
fn test_info_reports_content_counts() {
    let host = build_host(&builtin_config());

    let lines = module_info(&host, "Template Mod", false).unwrap();

    assert_eq!(lines[0], "Id: Template_Mod");
    assert!(lines.contains(&"State: loaded".to_string()));
    assert!(lines.contains(&format!("After: {}", COMPANION_ID)));
    assert!(lines.contains(&"ports: 1".to_string()));
    assert!(lines.contains(&"conditions: 1".to_string()));

    assert!(matches!(
        module_info(&host, "ghost", false),
        Err(ModuleError::NotFound { .. })
    ));
}

#[test]
fn test_run_commands_in_order() {
    let host = build_host(&builtin_config());

    let output = run_commands(
        &host,
        &["companion one two".to_string(), "modules".to_string()],
    )
    .unwrap();

    assert_eq!(output[0], "TempExe ran with 2 argument(s)");
    assert_eq!(output.len(), 4);

    let help = run_commands(&host, &[]).unwrap();
    assert!(help.iter().any(|line| line.starts_with("status - ")));
}

#[test]
fn test_status_command_summarises_host() {
    let host = build_host(&builtin_config());

    let output = run_commands(&host, &["status".to_string()]).unwrap();

    assert_eq!(
        output[0],
        format!("API version: {}", crate::core::version::get_api_version())
    );
    assert!(output[1].starts_with("Loaded modules (3)"));
    assert!(output.contains(&"executables: 1".to_string()));
}

#[test]
fn test_execute_reports_unknown_command() {
    let result = execute(
        &Command::Run {
            lines: vec!["no-such-command".to_string()],
        },
        &builtin_config(),
        false,
    );

    assert!(matches!(
        result,
        Err(StartupError::Module(ModuleError::NotFound { .. }))
    ));
}

#[test]
fn test_unknown_bundle_loads_nothing() {
    let config = HostConfig {
        bundles: vec!["elsewhere".to_string()],
        ..HostConfig::default()
    };

    let output = execute(&Command::default(), &config, false).unwrap();

    assert_eq!(output, vec!["No modules discovered."]);
}
