//! Descriptor records fed to the schema builder and the command registry.
//!
//! These types are the plain-data form of command and option metadata. They
//! are designed for serialization with [`serde`] so a descriptor feed can be
//! written by hand in YAML/JSON, generated by a build step, or assembled in
//! code with the builder methods below.

use serde::{Deserialize, Serialize};

/// Version of the descriptor contract (semver).
///
/// Embedded in every [`Catalog`](crate::Catalog) to track compatibility of
/// serialized descriptor feeds.
pub const DESCRIPTOR_CONTRACT_VERSION: &str = "1.0.0";

/// How a string option value is normalized after binding.
///
/// # Examples
///
/// ```
/// use optline_core::ArgumentProcessing;
///
/// assert_eq!(ArgumentProcessing::default(), ArgumentProcessing::UnwrapOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentProcessing {
    /// Remove surrounding `"""`, `"` or `'` quotes (the default).
    #[default]
    UnwrapOnly,
    /// Keep the token exactly as written.
    AsIs,
    /// Unwrap, then replace each line break with a single space.
    UnwrapAndReplaceNewlinesWithSpace,
    /// Unwrap, then drop line breaks.
    UnwrapAndRemoveNewlines,
}

/// Descriptor of one option field.
///
/// `kind` names the value type: a scalar (`"i32"`, `"string"`, `"bool"`,
/// ...), an enum declared with [`EnumDescriptor`], or another option type,
/// which makes the field a nested option object.
///
/// # Examples
///
/// ```
/// use optline_core::FieldDescriptor;
///
/// let port = FieldDescriptor::new("port", "u16")
///     .with_short("p")
///     .with_default("8080")
///     .with_description("Listening port")
///     .from_env();
/// assert_eq!(port.short_name.as_deref(), Some("p"));
/// assert!(port.env);
/// assert!(!port.required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Long option name, used as `-long_name`.
    pub long_name: String,
    /// Optional short option name, used as `-s`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Value type name.
    pub kind: String,
    /// Description for help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial value, written the way it would appear on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Default shown in help output instead of the initial value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_text: Option<String>,
    /// Must the option be supplied (on the command line or via the environment)?
    #[serde(default)]
    pub required: bool,
    /// Fall back to an environment variable named after the short, then long name.
    #[serde(default)]
    pub env: bool,
    /// Normalization applied to string values.
    #[serde(default)]
    pub processing: ArgumentProcessing,
}

impl FieldDescriptor {
    /// Creates an optional field of the given kind.
    pub fn new(long_name: &str, kind: &str) -> Self {
        Self {
            long_name: long_name.to_string(),
            short_name: None,
            kind: kind.to_string(),
            description: None,
            default: None,
            default_text: None,
            required: false,
            env: false,
            processing: ArgumentProcessing::default(),
        }
    }

    /// Adds a short name.
    pub fn with_short(mut self, short: &str) -> Self {
        self.short_name = Some(short.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the initial value.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    /// Sets the default shown in help output.
    pub fn with_default_text(mut self, text: &str) -> Self {
        self.default_text = Some(text.to_string());
        self
    }

    /// Sets string normalization.
    pub fn with_processing(mut self, processing: ArgumentProcessing) -> Self {
        self.processing = processing;
        self
    }

    /// Marks as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks as readable from the environment.
    pub fn from_env(mut self) -> Self {
        self.env = true;
        self
    }
}

/// Descriptor of an option type: an ordered set of fields, optionally
/// extending a base type whose fields come first.
///
/// # Examples
///
/// ```
/// use optline_core::{FieldDescriptor, OptionTypeDescriptor};
///
/// let options = OptionTypeDescriptor::new("ServerOptions")
///     .with_base("CommonOptions")
///     .with_field(FieldDescriptor::new("port", "u16"));
/// assert_eq!(options.base.as_deref(), Some("CommonOptions"));
/// assert_eq!(options.fields.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTypeDescriptor {
    /// Unique type name.
    pub name: String,
    /// Base type whose fields are inherited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Description for help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared fields, in binding order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl OptionTypeDescriptor {
    /// Creates an option type with no fields.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the base type.
    pub fn with_base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Descriptor of an enum value type.
///
/// Values match variant names case-insensitively. The first variant is the
/// default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Unique type name.
    pub name: String,
    /// Variant names, in declaration order.
    pub variants: Vec<String>,
}

impl EnumDescriptor {
    /// Creates an enum descriptor.
    ///
    /// # Examples
    ///
    /// ```
    /// use optline_core::EnumDescriptor;
    ///
    /// let level = EnumDescriptor::new("Level", &["Low", "High"]);
    /// assert_eq!(level.variants, vec!["Low", "High"]);
    /// ```
    pub fn new(name: &str, variants: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Descriptor of a command.
///
/// # Examples
///
/// ```
/// use optline_core::CommandDescriptor;
///
/// let cmd = CommandDescriptor::new("remove-file")
///     .with_alias("rm")
///     .with_options("RemoveOptions")
///     .with_handler("remove");
/// assert_eq!(cmd.handler_key(), "remove");
///
/// let plain = CommandDescriptor::new("list");
/// assert_eq!(plain.handler_key(), "list");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Command name; an empty name marks the command as default.
    pub name: String,
    /// Explicit alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Run this command when no command name is given.
    #[serde(default)]
    pub default: bool,
    /// Accept unknown option names without error.
    #[serde(default)]
    pub subcommand: bool,
    /// Description for help output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Option type bound for this command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// Key of the registered handler; defaults to the command name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub handler: String,
}

impl CommandDescriptor {
    /// Creates a command descriptor whose handler key is its name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the alias.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Sets the option type.
    pub fn with_options(mut self, type_name: &str) -> Self {
        self.options = Some(type_name.to_string());
        self
    }

    /// Sets the handler key.
    pub fn with_handler(mut self, key: &str) -> Self {
        self.handler = key.to_string();
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks as default-eligible.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Marks as a subcommand (unknown option names are accepted).
    pub fn as_subcommand(mut self) -> Self {
        self.subcommand = true;
        self
    }

    /// Returns the handler key, falling back to the command name.
    pub fn handler_key(&self) -> &str {
        if self.handler.trim().is_empty() {
            self.name.trim()
        } else {
            self.handler.trim()
        }
    }
}
