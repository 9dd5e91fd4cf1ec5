//! Parser behavior switches.
//!
//! [`ParserOptions`] can be built in code from one of the presets or loaded
//! from a YAML file; missing keys take their defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! require_strict_command_name: false
//! require_strict_option_name: true
//! auto_alias: true
//! version: "2.1.0"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use optline_core::{BindSettings, Result};
use serde::{Deserialize, Serialize};

/// Version printed for `version` when none is configured.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Settings for command resolution, binding and help output.
///
/// # Examples
///
/// ```
/// use optline_engine::ParserOptions;
///
/// let options = ParserOptions::strict_option_name();
/// assert!(options.require_strict_option_name);
/// assert!(options.omit_option_names_for_required_options);
/// assert_eq!(options.version_text(), "1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Never fall back to a default command.
    pub require_strict_command_name: bool,
    /// Report option names the command's option type does not know.
    pub require_strict_option_name: bool,
    /// Bind bare values to required options in declaration order.
    pub omit_option_names_for_required_options: bool,
    /// Give commands without an alias the initials of their name, and accept `h` for `help`.
    pub auto_alias: bool,
    /// Leave the usage line out of help output.
    pub do_not_display_usage: bool,
    /// Show only the command names when help has no target.
    pub display_command_list_as_help: bool,
    /// Program name shown in the usage line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,
    /// Text printed for `version`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            require_strict_command_name: false,
            require_strict_option_name: false,
            omit_option_names_for_required_options: true,
            auto_alias: false,
            do_not_display_usage: false,
            display_command_list_as_help: false,
            program_name: None,
            version: None,
        }
    }
}

impl ParserOptions {
    /// Lenient defaults.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Defaults without a default command.
    pub fn strict_command_name() -> Self {
        Self {
            require_strict_command_name: true,
            ..Self::default()
        }
    }

    /// Defaults with unknown option names reported.
    pub fn strict_option_name() -> Self {
        Self {
            require_strict_option_name: true,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_program_name(mut self, name: &str) -> Self {
        self.program_name = Some(name.to_string());
        self
    }

    /// The switches the binder needs.
    pub fn bind_settings(&self) -> BindSettings {
        BindSettings {
            require_strict_option_name: self.require_strict_option_name,
            omit_option_names_for_required_options: self.omit_option_names_for_required_options,
        }
    }

    /// Version text, falling back to [`DEFAULT_VERSION`].
    pub fn version_text(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Parses options from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads options from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](optline_core::ConfigError::IoError) if the file
    /// cannot be read, or [`YamlError`](optline_core::ConfigError::YamlError)
    /// if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let options = serde_yaml::from_reader(reader)?;
        Ok(options)
    }

    /// Saves the options as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let standard = ParserOptions::standard();
        assert!(!standard.require_strict_command_name);
        assert!(!standard.require_strict_option_name);
        assert!(standard.omit_option_names_for_required_options);
        assert!(!standard.auto_alias);

        assert!(ParserOptions::strict_command_name().require_strict_command_name);
        assert_eq!(
            ParserOptions::strict_option_name().bind_settings(),
            BindSettings {
                require_strict_option_name: true,
                omit_option_names_for_required_options: true,
            }
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let options = ParserOptions::from_yaml_str("auto_alias: true\nversion: \"2.0\"\n").unwrap();
        assert!(options.auto_alias);
        assert!(options.omit_option_names_for_required_options);
        assert_eq!(options.version_text(), "2.0");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.yaml");

        let options = ParserOptions::strict_command_name().with_program_name("tool");
        options.save(&path).unwrap();
        assert_eq!(ParserOptions::load(&path).unwrap(), options);
    }
}
