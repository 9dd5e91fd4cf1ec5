//! Catalog validation.
//!
//! Compiles every option type of a [`Catalog`] up front and reports all
//! construction problems at once, instead of failing on the first command
//! that happens to use a broken type.
//!
//! # Examples
//!
//! ```
//! use optline_core::*;
//!
//! let catalog = Catalog::new()
//!     .with_option_type(
//!         OptionTypeDescriptor::new("Opts").with_field(FieldDescriptor::new("n", "i32")),
//!     )
//!     .with_command(CommandDescriptor::new("run").with_options("Opts"));
//! assert!(validate_catalog(&catalog).is_empty());
//!
//! // A command pointing at a missing option type
//! let broken = catalog.with_command(CommandDescriptor::new("stop").with_options("Missing"));
//! let errors = validate_catalog(&broken);
//! assert!(errors.iter().any(|e| matches!(e, ConstructionError::UnknownOptionType(_))));
//! ```

use std::collections::HashSet;

use crate::{Catalog, ConstructionError, SchemaBuilder};

/// Validates a catalog, returning every construction error found.
pub fn validate_catalog(catalog: &Catalog) -> Vec<ConstructionError> {
    let mut errors = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    let names = catalog
        .option_types
        .iter()
        .map(|t| t.name.as_str())
        .chain(catalog.enums.iter().map(|e| e.name.as_str()));
    for name in names {
        if !seen.insert(name) {
            errors.push(ConstructionError::DuplicateTypeName(name.to_string()));
        }
    }

    for enum_type in &catalog.enums {
        if enum_type.variants.is_empty() {
            errors.push(ConstructionError::EmptyEnum(enum_type.name.clone()));
        }
    }

    let mut builder = SchemaBuilder::new(catalog);
    for option_type in &catalog.option_types {
        if let Err(e) = builder.build(&option_type.name) {
            if !errors.contains(&e) {
                errors.push(e);
            }
        }
    }

    for command in &catalog.commands {
        if let Some(type_name) = command.options.as_deref().map(str::trim) {
            if !type_name.is_empty() && !seen.contains(type_name) {
                errors.push(ConstructionError::UnknownOptionType(type_name.to_string()));
            }
        }
    }

    errors
}
