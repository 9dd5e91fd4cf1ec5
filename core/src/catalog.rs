use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::{CommandDescriptor, EnumDescriptor, OptionTypeDescriptor};

/// Source of command and option descriptors.
///
/// The schema builder and the command registry only read metadata through
/// this trait, so descriptors can come from a [`Catalog`], generated code, or
/// any other registry the host keeps.
pub trait MetadataProvider {
    /// Commands in registration order.
    fn commands(&self) -> &[CommandDescriptor];

    /// Looks up an option type by exact name.
    fn option_type(&self, name: &str) -> Option<&OptionTypeDescriptor>;

    /// Looks up an enum type by exact name.
    fn enum_type(&self, name: &str) -> Option<&EnumDescriptor>;
}

/// Serializable descriptor bundle.
///
/// A catalog groups command, option type and enum descriptors with version
/// metadata, so a whole command-line surface can be kept in one YAML or JSON
/// file.
///
/// # Examples
///
/// ```
/// use optline_core::*;
///
/// let catalog = Catalog::new()
///     .with_option_type(
///         OptionTypeDescriptor::new("CopyOptions")
///             .with_field(FieldDescriptor::new("source", "string").required()),
///     )
///     .with_command(CommandDescriptor::new("copy").with_options("CopyOptions"));
///
/// assert_eq!(catalog.commands().len(), 1);
/// assert!(catalog.option_type("CopyOptions").is_some());
/// assert!(catalog.enum_type("Level").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Descriptor contract version (populated from
    /// [`DESCRIPTOR_CONTRACT_VERSION`](crate::DESCRIPTOR_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Optional catalog name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional catalog description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Option type descriptors.
    #[serde(default)]
    pub option_types: Vec<OptionTypeDescriptor>,
    /// Enum descriptors.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    /// Command descriptors, in registration order.
    #[serde(default)]
    pub commands: Vec<CommandDescriptor>,
}

impl Catalog {
    /// Creates an empty catalog stamped with the current contract version.
    pub fn new() -> Self {
        Self {
            schema_version: Some(crate::DESCRIPTOR_CONTRACT_VERSION.to_string()),
            ..Default::default()
        }
    }

    /// Appends a command.
    pub fn with_command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }

    /// Appends an option type.
    pub fn with_option_type(mut self, option_type: OptionTypeDescriptor) -> Self {
        self.option_types.push(option_type);
        self
    }

    /// Appends an enum type.
    pub fn with_enum(mut self, enum_type: EnumDescriptor) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Parses a catalog from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a catalog from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::ConfigError::YamlError) if parsing fails.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let catalog = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let catalog = serde_json::from_reader(BufReader::new(file))?;
        Ok(catalog)
    }

    /// Loads a catalog, picking JSON for `.json` files and YAML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::load_json(path)
        } else {
            Self::load_yaml(path)
        }
    }

    /// Saves the catalog as YAML.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}

impl MetadataProvider for Catalog {
    fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    fn option_type(&self, name: &str) -> Option<&OptionTypeDescriptor> {
        self.option_types.iter().find(|t| t.name == name)
    }

    fn enum_type(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }
}
