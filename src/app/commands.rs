//! Handlers for the `list`, `info` and `run` subcommands
//!
//! Each handler returns the lines to print so callers and tests can inspect
//! the output without capturing stdout.

use crate::content::api::ContentKind;
use crate::module::api::{ModuleError, ModuleHandle, ModuleHost, ModuleResult, ModuleState};
use colored::Colorize;
use serde::Serialize;
use strum::IntoEnumIterator;

/// Serialisable view of one module for `list --format json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub bundle: String,
    pub state: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub allow_order_unload: bool,
}

impl From<&ModuleHandle> for ModuleSummary {
    fn from(handle: &ModuleHandle) -> Self {
        let info = handle.info();
        Self {
            id: handle.id().to_string(),
            name: info.name.clone(),
            version: info.version.clone(),
            author: info.author.clone(),
            bundle: handle.bundle().to_string(),
            state: handle.state().to_string(),
            before: handle.before_ids().to_vec(),
            after: handle.after_ids().to_vec(),
            allow_order_unload: handle.allows_order_unload(),
        }
    }
}

fn paint_state(state: ModuleState, use_color: bool) -> String {
    let text = state.to_string();
    if !use_color {
        return text;
    }
    match state {
        ModuleState::Loaded => text.green().to_string(),
        ModuleState::Deferred | ModuleState::MarkedForUnload => text.yellow().to_string(),
        ModuleState::Loading | ModuleState::Unloading => text.blue().to_string(),
        ModuleState::Unloaded => text.red().to_string(),
    }
}

/// Every known module, sorted by id
pub fn list_modules(
    host: &ModuleHost,
    format: &str,
    use_color: bool,
) -> Result<Vec<String>, serde_json::Error> {
    let modules = host.loader().known_modules();

    if format == "json" {
        let summaries: Vec<ModuleSummary> = modules.iter().map(ModuleSummary::from).collect();
        return Ok(vec![serde_json::to_string_pretty(&summaries)?]);
    }

    if modules.is_empty() {
        return Ok(vec!["No modules discovered.".to_string()]);
    }

    let width = modules
        .iter()
        .map(|handle| handle.id().len())
        .max()
        .unwrap_or(0);
    Ok(modules
        .iter()
        .map(|handle| {
            format!(
                "{:<width$}  {:<10}  {:<12}  {}",
                handle.id(),
                handle.info().version,
                handle.bundle(),
                paint_state(handle.state(), use_color),
                width = width
            )
        })
        .collect())
}

/// Details of one module, including what it has registered
pub fn module_info(host: &ModuleHost, id: &str, use_color: bool) -> ModuleResult<Vec<String>> {
    let handle = host
        .known_module(id)
        .ok_or_else(|| ModuleError::not_found(format!("module '{}'", id)))?;
    let info = handle.info();

    let label = |text: &str| {
        if use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    };
    let list = |ids: &[String]| {
        if ids.is_empty() {
            "-".to_string()
        } else {
            ids.join(", ")
        }
    };

    let mut lines = vec![
        format!("{} {}", label("Id:"), handle.id()),
        format!("{} {}", label("Name:"), info.name),
        format!("{} {}", label("Version:"), info.version),
        format!("{} {}", label("Author:"), info.author),
        format!("{} {}", label("Description:"), info.description),
        format!("{} {}", label("Bundle:"), handle.bundle()),
        format!(
            "{} {}",
            label("State:"),
            paint_state(handle.state(), use_color)
        ),
        format!("{} {}", label("Before:"), list(handle.before_ids())),
        format!("{} {}", label("After:"), list(handle.after_ids())),
        format!(
            "{} {}",
            label("Unloads with dependencies:"),
            if handle.allows_order_unload() { "yes" } else { "no" }
        ),
        format!(
            "{} {}",
            label("Waiting on it:"),
            list(host.waiting_on(handle.id()).as_slice())
        ),
    ];

    for kind in ContentKind::iter() {
        let count = host.content().count_for_owner(kind, handle.id());
        if count > 0 {
            lines.push(format!("{} {}", label(&format!("{}:", kind.plural())), count));
        }
    }
    Ok(lines)
}

/// Run each command line in turn, stopping at the first failure
pub fn run_commands(host: &ModuleHost, lines: &[String]) -> ModuleResult<Vec<String>> {
    if lines.is_empty() {
        return host.execute_line("help");
    }
    let mut output = Vec::new();
    for line in lines {
        log::debug!("Running '{}'", line);
        output.extend(host.execute_line(line)?);
    }
    Ok(output)
}
