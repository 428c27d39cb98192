//! TOML configuration file parsing and loading
//!
//! Handles default config file discovery, validation of config values and
//! merging with command line arguments, which always take precedence.

use crate::core::validation::{
    parse_comma_separated, validate_log_format, validate_log_level, ValidationError,
};
use crate::module::api::HostOptions;
use std::path::{Path, PathBuf};

use super::args::Args;

const CONFIG_DIR_NAME: &str = "Modhost";
const CONFIG_FILE_NAME: &str = "modhost.toml";

/// Keys understood in the configuration file
const KNOWN_KEYS: &[&str] = &[
    "exclude-module",
    "bundle",
    "log-level",
    "log-format",
    "log-file",
    "color",
    "no-color",
];

/// Settings that shape the host and the logger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    pub excluded_modules: Vec<String>,
    /// Bundles to load; empty means every bundle
    pub bundles: Vec<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    /// `None` leaves the decision to terminal detection
    pub color: Option<bool>,
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config dir>/Modhost/modhost.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration file
    ///
    /// A file named explicitly must exist. Without one the default path is
    /// used when present; otherwise the defaults apply.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ValidationError> {
        let path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ValidationError::new(format!(
                        "The specified configuration file does not exist: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        log::debug!("Reading configuration from {}", path.display());
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            ValidationError::new(format!(
                "Error reading configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents).map_err(|e| {
            ValidationError::new(format!(
                "Error in configuration file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ValidationError> {
        let table = toml::from_str::<toml::Table>(contents)
            .map_err(|e| ValidationError::new(format!("invalid TOML: {}", e)))?;
        let mut config = Self::default();
        config.apply_toml_values(&table)?;
        Ok(config)
    }

    /// Apply TOML configuration values
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> Result<(), ValidationError> {
        for key in config.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("Ignoring unknown configuration key '{}'", key);
            }
        }

        Self::apply_string_array_field(config, "exclude-module", &mut self.excluded_modules)?;
        Self::apply_string_array_field(config, "bundle", &mut self.bundles)?;

        if let Some(level) = Self::string_field(config, "log-level")? {
            self.log_level = Some(validate_log_level(level)?);
        }
        if let Some(format) = Self::string_field(config, "log-format")? {
            self.log_format = Some(validate_log_format(format)?);
        }
        if let Some(log_file) = Self::string_field(config, "log-file")? {
            // "none" and "-" disable file logging
            if log_file.eq_ignore_ascii_case("none") || log_file == "-" {
                self.log_file = None;
            } else {
                self.log_file = Some(PathBuf::from(log_file));
            }
        }

        if let Some(color) = Self::bool_field(config, "color")? {
            self.color = Some(color);
        }
        if let Some(no_color) = Self::bool_field(config, "no-color")? {
            self.color = Some(!no_color);
        }
        Ok(())
    }

    /// Apply command line arguments over the file values
    pub fn merge_args(&mut self, args: &Args) {
        for id in args.excluded_modules() {
            if !self.excluded_modules.contains(&id) {
                self.excluded_modules.push(id);
            }
        }
        let bundles = args.bundle_names();
        if !bundles.is_empty() {
            self.bundles = bundles;
        }
        if args.log_level.is_some() {
            self.log_level = args.log_level.clone();
        }
        if args.log_format.is_some() {
            self.log_format = args.log_format.clone();
        }
        if let Some(log_file) = &args.log_file {
            let disabled = log_file
                .to_str()
                .is_some_and(|s| s.eq_ignore_ascii_case("none") || s == "-");
            self.log_file = if disabled { None } else { Some(log_file.clone()) };
        }
        if let Some(color) = args.color_override() {
            self.color = Some(color);
        }
    }

    /// Whether output should be coloured
    ///
    /// An explicit setting wins; otherwise colour is used on a terminal unless
    /// `NO_COLOR` is set.
    pub fn use_color(&self) -> bool {
        use std::io::IsTerminal;

        self.color.unwrap_or_else(|| {
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        })
    }

    pub fn host_options(&self) -> HostOptions {
        HostOptions::default().with_excluded(&self.excluded_modules)
    }

    fn string_field<'a>(
        config: &'a toml::Table,
        key: &str,
    ) -> Result<Option<&'a str>, ValidationError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| {
                ValidationError::new(format!("'{}' must be a string", key))
            }),
        }
    }

    fn bool_field(config: &toml::Table, key: &str) -> Result<Option<bool>, ValidationError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => value.as_bool().map(Some).ok_or_else(|| {
                ValidationError::new(format!("'{}' must be true or false", key))
            }),
        }
    }

    /// Apply a field given either as a single (comma separated) string or as an array
    fn apply_string_array_field(
        config: &toml::Table,
        key: &str,
        target: &mut Vec<String>,
    ) -> Result<(), ValidationError> {
        let Some(value) = config.get(key) else {
            return Ok(());
        };

        let mut values = Vec::new();
        if let Some(single) = value.as_str() {
            values.push(single.to_string());
        } else if let Some(array) = value.as_array() {
            for item in array {
                let item = item.as_str().ok_or_else(|| {
                    ValidationError::new(format!("'{}' entries must be strings", key))
                })?;
                values.push(item.to_string());
            }
        } else {
            return Err(ValidationError::new(format!(
                "'{}' must be a string or an array of strings",
                key
            )));
        }

        for item in parse_comma_separated(&values) {
            if !target.contains(&item) {
                target.push(item);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = HostConfig::from_toml_str(
            r#"
            exclude-module = ["template-companion", "a,b"]
            bundle = "builtin"
            log-level = "DEBUG"
            log-format = "json"
            log-file = "/tmp/modhost.log"
            no-color = true
            "#,
        )
        .unwrap();

        assert_eq!(
            config.excluded_modules,
            vec!["template-companion", "a", "b"]
        );
        assert_eq!(config.bundles, vec!["builtin"]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_format.as_deref(), Some("json"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/modhost.log")));
        assert_eq!(config.color, Some(false));
        assert!(!config.use_color());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for contents in [
            r#"log-level = "loud""#,
            r#"log-format = "xml""#,
            r#"color = "yes""#,
            r#"bundle = 3"#,
            r#"exclude-module = ["ok", 1]"#,
            "not toml at all = = =",
        ] {
            assert!(
                HostConfig::from_toml_str(contents).is_err(),
                "accepted: {}",
                contents
            );
        }
    }

    #[test]
    fn test_log_file_none_disables_file_logging() {
        let config = HostConfig::from_toml_str(r#"log-file = "none""#).unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config = HostConfig::from_toml_str(r#"mystery = 1"#).unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = HostConfig::from_toml_str(
            r#"
            exclude-module = "a"
            bundle = ["one", "two"]
            log-level = "warn"
            color = true
            "#,
        )
        .unwrap();
        let args = Args::parse_from_args([
            "modhost",
            "--exclude-module",
            "b,a",
            "--bundle",
            "three",
            "--log-level",
            "trace",
            "--no-color",
        ])
        .unwrap();

        config.merge_args(&args);

        assert_eq!(config.excluded_modules, vec!["a", "b"]);
        assert_eq!(config.bundles, vec!["three"]);
        assert_eq!(config.log_level.as_deref(), Some("trace"));
        assert_eq!(config.color, Some(false));
    }

    #[test]
    fn test_host_options_clean_excluded_ids() {
        let config = HostConfig {
            excluded_modules: vec!["Template Mod".to_string()],
            ..HostConfig::default()
        };
        assert!(config.host_options().is_excluded("Template_Mod"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = Path::new("/definitely/not/here/modhost.toml");
        assert!(HostConfig::load(Some(missing)).is_err());
    }
}
