//! Command line arguments
//!
//! Global flags may appear before or after the subcommand. List-valued flags
//! accept repeated use as well as comma separated values.

use crate::core::validation::{parse_comma_separated, LOG_FORMATS, LOG_LEVELS};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "modhost")]
#[command(about = "Load, order and run host modules")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Modules to skip during discovery*
    #[arg(long = "exclude-module", value_name = "IDS", action = ArgAction::Append, global = true)]
    pub exclude_modules: Vec<String>,

    /// Bundles to load (default: all)*
    #[arg(short = 'b', long = "bundle", value_name = "NAMES", action = ArgAction::Append, global = true)]
    pub bundles: Vec<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS.to_vec(), global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = LOG_FORMATS.to_vec(), global = true)]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(long = "color", global = true)]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", conflicts_with = "color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every module the host knows about
    List {
        /// Output format
        #[arg(long = "format", value_name = "FORMAT", default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show details for one module
    Info {
        /// Module identifier
        id: String,
    },

    /// Run host commands once modules are loaded
    ///
    /// Each value is one command line, e.g. `run status "companion a b"`.
    /// With no values `help` is run.
    Run {
        #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
        lines: Vec<String>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::List {
            format: "text".to_string(),
        }
    }
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from an explicit argument list, program name first
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Excluded module ids with comma separated values expanded
    pub fn excluded_modules(&self) -> Vec<String> {
        parse_comma_separated(&self.exclude_modules)
    }

    /// Bundle names with comma separated values expanded
    pub fn bundle_names(&self) -> Vec<String> {
        parse_comma_separated(&self.bundles)
    }

    /// `--color` gives `Some(true)`, `--no-color` `Some(false)`, neither `None`
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// The command to run, `list` when none was given
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_list() {
        let args = Args::parse_from_args(["modhost"]).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(
            args.command_or_default(),
            Command::List {
                format: "text".to_string()
            }
        );
        assert_eq!(args.color_override(), None);
    }

    #[test]
    fn test_list_values_accept_commas_and_repeats() {
        let args = Args::parse_from_args([
            "modhost",
            "--exclude-module",
            "a,b",
            "--exclude-module",
            "c",
            "--bundle",
            "builtin",
            "list",
        ])
        .unwrap();
        assert_eq!(args.excluded_modules(), vec!["a", "b", "c"]);
        assert_eq!(args.bundle_names(), vec!["builtin"]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::parse_from_args(["modhost", "info", "status", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(
            args.command,
            Some(Command::Info {
                id: "status".to_string()
            })
        );
    }

    #[test]
    fn test_run_collects_command_lines() {
        let args = Args::parse_from_args(["modhost", "run", "status", "companion a b"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Run {
                lines: vec!["status".to_string(), "companion a b".to_string()]
            })
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Args::parse_from_args(["modhost", "--log-level", "loud"]).is_err());
        assert!(Args::parse_from_args(["modhost", "list", "--format", "xml"]).is_err());
        assert!(Args::parse_from_args(["modhost", "--color", "--no-color"]).is_err());
    }

    #[test]
    fn test_color_override() {
        let args = Args::parse_from_args(["modhost", "--no-color"]).unwrap();
        assert_eq!(args.color_override(), Some(false));
        let args = Args::parse_from_args(["modhost", "--color"]).unwrap();
        assert_eq!(args.color_override(), Some(true));
    }
}
