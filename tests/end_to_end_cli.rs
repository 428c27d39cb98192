//! CLI Integration Tests
//!
//! Tests are organized by functionality:
//! - `cli::argument_parsing` - command line parsing
//! - `cli::toml_config` - configuration files and CLI overrides
//! - `cli::commands` - running subcommands against the built-in bundle

mod cli;
