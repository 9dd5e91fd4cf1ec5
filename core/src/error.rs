//! Error types for schema construction, argument binding and descriptor
//! loading.
//!
//! Build-time problems ([`ConstructionError`]) are fatal and surface as `Err`
//! when schemas or registries are assembled. Per-call problems
//! ([`ParseError`], [`ValidationError`]) are never returned as `Err`; they are
//! collected into an [`ArgumentError`] list for the caller to render.

use thiserror::Error;

/// Fatal errors raised while compiling descriptors into option schemas or
/// wiring commands to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// Two fields of one option type (inherited fields included) share a long name.
    #[error("long option name '{name}' ({type_name}) already exists")]
    DuplicateLongName { name: String, type_name: String },
    /// A short name collides with another long or short name.
    #[error("short option name '{name}' ({type_name}) already exists")]
    DuplicateShortName { name: String, type_name: String },
    /// A field declares an empty long name.
    #[error("option name cannot be empty ({0})")]
    EmptyOptionName(String),
    /// An option type contains itself, directly or through nested fields or bases.
    #[error("circular dependency of option types is detected ({0})")]
    CircularDependency(String),
    /// A field kind is neither a scalar, an enum, nor a known option type.
    #[error("type '{kind}' of option '{field}' is not supported")]
    UnsupportedType { field: String, kind: String },
    /// A nested option type has no bindable fields.
    #[error("type '{0}' has no options and cannot be used as a nested option")]
    EmptyOptionType(String),
    /// An enum type declares no variants.
    #[error("enum '{0}' has no variants")]
    EmptyEnum(String),
    /// Two option types or enums in one catalog share a name.
    #[error("type name '{0}' is declared more than once")]
    DuplicateTypeName(String),
    /// A command or base refers to an option type the provider does not know.
    #[error("option type '{0}' is not defined")]
    UnknownOptionType(String),
    /// A declared default cannot be converted to the field's kind.
    #[error("default value '{value}' of option '{field}' cannot be converted to '{kind}'")]
    InvalidDefault {
        field: String,
        value: String,
        kind: String,
    },
    /// A command's handler key has no registered handler.
    #[error("no handler '{handler}' is registered for command '{command}'")]
    MissingHandler { command: String, handler: String },
    /// A handler's call shape does not fit its command.
    #[error("handler '{handler}' of command '{command}' {reason}")]
    HandlerShapeMismatch {
        command: String,
        handler: String,
        reason: String,
    },
}

/// Recoverable errors collected while scanning tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Unknown option name against a schema without an option type.
    #[error("Option '{name}' is invalid")]
    InvalidOption { name: String },
    /// Unknown option name against a typed schema.
    #[error("Option '{name}' is not found in Type: {type_name}")]
    UnknownOption { name: String, type_name: String },
    /// A recognized option is not followed by a value.
    #[error("No corresponding value found for option '{option}'")]
    MissingValue { option: String },
    /// A value could not be converted to the option's kind.
    #[error("Could not convert '{value}' to Type '{type_name}' ({context})")]
    ConversionFailed {
        value: String,
        type_name: String,
        context: String,
    },
    /// No command was given and no default command exists.
    #[error("Specify the command name")]
    MissingCommand,
}

/// Errors found after scanning; any of them prevents execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is still unset after the command line and the environment.
    #[error("Value is required for option '{option}' <{type_name}>")]
    RequiredValue { option: String, type_name: String },
}

/// One entry of the per-call error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ArgumentError {
    /// Returns `true` for validation errors, which leave no usable instance.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ArgumentError::Validation(_))
    }
}

/// Errors that can occur while loading or saving descriptor and option files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
