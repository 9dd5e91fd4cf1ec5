//! Tokenizer, option schemas and binder for declarative command lines.
//!
//! This crate is the engine-independent half of optline:
//!
//! - [`tokenize`]: splits a raw command line, keeping quoted spans and
//!   balanced `{...}` groups as single tokens.
//! - [`Catalog`] and the descriptor types ([`CommandDescriptor`],
//!   [`OptionTypeDescriptor`], [`FieldDescriptor`], [`EnumDescriptor`]): the
//!   plain-data feed describing commands and their option types, read through
//!   the [`MetadataProvider`] trait.
//! - [`SchemaBuilder`]: compiles option types into cached [`OptionSchema`]s,
//!   rejecting duplicate names, unsupported kinds and containment cycles.
//! - [`Binder`]: binds tokens into a [`Record`], with positional values for
//!   required fields, environment fallback and nested option objects.
//! - [`regroup`]: splits a `|`-separated command line into groups.
//!
//! Validation ([`validate_catalog`]) reports every construction problem of a
//! catalog at once.
//!
//! # Example
//!
//! ```
//! use optline_core::*;
//!
//! let catalog = Catalog::new()
//!     .with_enum(EnumDescriptor::new("Level", &["Low", "High"]))
//!     .with_option_type(
//!         OptionTypeDescriptor::new("Limits")
//!             .with_field(FieldDescriptor::new("max", "u32").with_default("10")),
//!     )
//!     .with_option_type(
//!         OptionTypeDescriptor::new("ServeOptions")
//!             .with_field(FieldDescriptor::new("port", "u16").with_short("p").required())
//!             .with_field(FieldDescriptor::new("level", "Level"))
//!             .with_field(FieldDescriptor::new("limits", "Limits")),
//!     );
//! assert!(validate_catalog(&catalog).is_empty());
//!
//! let schema = SchemaBuilder::new(&catalog).build("ServeOptions").unwrap();
//! let binder = Binder::new(BindSettings::default(), &ProcessEnv);
//! let tokens = tokenize("-p 8080 -level high -limits {-max 3}");
//! let outcome = binder.bind(&schema, &tokens, 0, false);
//!
//! assert!(outcome.is_success());
//! let record = outcome.instance.unwrap();
//! assert_eq!(record.get_as::<u16>("port"), Some(8080));
//! assert_eq!(record.get_as::<String>("level").as_deref(), Some("High"));
//! assert_eq!(record.get_as::<Record>("limits").unwrap().get_as::<u32>("max"), Some(3));
//! ```

mod batch;
mod binder;
mod catalog;
mod convert;
mod error;
mod helpers;
mod schema;
mod tokenizer;
mod types;
mod validate;
mod value;

pub use batch::{regroup, regroup_str};
pub use binder::{BindOutcome, BindSettings, Binder, EnvSource, ProcessEnv, try_parse_options};
pub use catalog::{Catalog, MetadataProvider};
pub use convert::{ConvertError, Converter, ConverterRegistry, ScalarKind, unwrap_quotes};
pub use error::{
    ArgumentError, ConfigError, ConstructionError, ParseError, Result, ValidationError,
};
pub use helpers::{
    create_alias_from_command, is_option_reference, option_equals, peek_command,
    strip_program_path, try_get_and_remove_argument, try_unwrap_double_quote, unwrap_bracket,
};
pub use schema::{EnumType, FieldKind, OptionField, OptionSchema, SchemaBuilder};
pub use tokenizer::{OPTION_PREFIX, SEPARATOR, tokenize};
pub use types::*;
pub use validate::validate_catalog;
pub use value::{FromRecord, FromValue, Record, Value};
