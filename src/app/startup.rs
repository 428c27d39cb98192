//! Application startup
//!
//! Parses arguments, loads configuration, installs the logger, then builds a
//! host from the compiled-in bundles and runs the requested command.

use super::cli::args::{Args, Command};
use super::cli::config::HostConfig;
use super::commands;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version::{build_time, get_api_version, git_hash};
use crate::module::api::{BinarySource, InventorySource, ModuleError, ModuleHost};

/// Failure of a subcommand
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("could not render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Entry point for the binary
pub fn startup() {
    let args = match Args::parse_from_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let mut config = match HostConfig::load(args.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    config.merge_args(&args);

    let use_color = config.use_color();
    colored::control::set_override(use_color);

    let log_file = config.log_file.as_ref().and_then(|path| path.to_str());
    if let Err(e) = init_logging(
        config.log_level.as_deref(),
        config.log_format.as_deref(),
        log_file,
        use_color,
    ) {
        eprintln!("Error initialising logging: {}", e);
        std::process::exit(1);
    }

    log::info!(
        "modhost {} starting (module API {}, built {} from {})",
        env!("CARGO_PKG_VERSION"),
        get_api_version(),
        build_time(),
        git_hash()
    );

    match execute(&args.command_or_default(), &config, use_color) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(StartupError::Module(e)) => {
            log_error_with_context(&e, "Command failed");
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("FATAL: {}", e);
            std::process::exit(1);
        }
    }
}

/// Build a host and load every enabled compiled-in bundle, content included
pub fn build_host(config: &HostConfig) -> ModuleHost {
    let host = ModuleHost::new(config.host_options());
    let source = InventorySource::with_bundles(config.bundles.clone());

    let available = source.locations();
    for bundle in &config.bundles {
        if !available.contains(bundle) {
            log::warn!("Bundle '{}' is not compiled into this host", bundle);
        }
    }

    let loaded = host.load_all(&source);
    log::debug!("Discovery produced {} module(s)", loaded.len());

    let pending = host.pending_ids();
    if !pending.is_empty() {
        log::warn!("Modules still waiting on: {}", pending.join(", "));
    }

    host.load_content();
    host
}

/// Run one subcommand against a freshly built host and shut it down again
pub fn execute(
    command: &Command,
    config: &HostConfig,
    use_color: bool,
) -> Result<Vec<String>, StartupError> {
    let host = build_host(config);

    let result = match command {
        Command::List { format } => {
            commands::list_modules(&host, format, use_color).map_err(StartupError::from)
        }
        Command::Info { id } => {
            commands::module_info(&host, id, use_color).map_err(StartupError::from)
        }
        Command::Run { lines } => {
            commands::run_commands(&host, lines).map_err(StartupError::from)
        }
    };

    host.shutdown_with_reason("command finished");
    result
}
