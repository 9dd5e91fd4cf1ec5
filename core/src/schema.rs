//! Compiled option schemas.
//!
//! [`SchemaBuilder`] turns [`OptionTypeDescriptor`]s into immutable
//! [`OptionSchema`]s: fields are collected base type first, every kind is
//! resolved to a scalar converter, an enum, or a nested schema, and name
//! collisions or containment cycles are rejected before any parsing happens.
//!
//! # Examples
//!
//! ```
//! use optline_core::*;
//!
//! let catalog = Catalog::new()
//!     .with_option_type(
//!         OptionTypeDescriptor::new("CopyOptions")
//!             .with_field(FieldDescriptor::new("source", "string").with_short("s").required())
//!             .with_field(FieldDescriptor::new("retries", "u8").with_default("3")),
//!     );
//!
//! let mut builder = SchemaBuilder::new(&catalog);
//! let schema = builder.build("CopyOptions").unwrap();
//!
//! assert_eq!(schema.find("S").unwrap().long_name(), "source");
//! let record = schema.new_instance();
//! assert_eq!(record.get_as::<u8>("retries"), Some(3));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::convert::{ConverterRegistry, ScalarKind};
use crate::error::ConstructionError;
use crate::{ArgumentProcessing, EnumDescriptor, FieldDescriptor, MetadataProvider, Record, Value};

/// Enum value type resolved from an [`EnumDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    variants: Vec<String>,
}

impl EnumType {
    fn from_descriptor(descriptor: &EnumDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            variants: descriptor.variants.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Matches a variant name case-insensitively, returning the declared spelling.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        let text = text.trim();
        self.variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(text))
            .map(String::as_str)
    }
}

/// What a field binds to.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Enum(EnumType),
    Nested(Arc<OptionSchema>),
}

impl FieldKind {
    /// Type name shown in messages and usage text.
    pub fn type_name(&self) -> &str {
        match self {
            FieldKind::Scalar(kind) => kind.name(),
            FieldKind::Enum(e) => e.name(),
            FieldKind::Nested(schema) => schema.type_name().unwrap_or_default(),
        }
    }
}

/// One bindable field of an [`OptionSchema`].
#[derive(Debug, Clone)]
pub struct OptionField {
    long_name: String,
    short_name: Option<String>,
    description: Option<String>,
    default_text: Option<String>,
    required: bool,
    env: bool,
    processing: ArgumentProcessing,
    kind: FieldKind,
    default: Option<Value>,
    slot: usize,
}

impl OptionField {
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Default shown in help output, if one was declared for display.
    pub fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    /// Declared initial value, converted at build time.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn reads_env(&self) -> bool {
        self.env
    }

    pub fn processing(&self) -> ArgumentProcessing {
        self.processing
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Nested schema, for nested option fields.
    pub fn nested(&self) -> Option<&Arc<OptionSchema>> {
        match &self.kind {
            FieldKind::Nested(schema) => Some(schema),
            _ => None,
        }
    }

    /// Position of this field in the owning schema.
    pub fn index(&self) -> usize {
        self.slot
    }

    /// Reads this field's value from a record of the owning schema.
    pub fn get<'r>(&self, record: &'r Record) -> Option<&'r Value> {
        record.slot(self.slot)
    }

    /// Writes this field's value into a record of the owning schema.
    pub fn set(&self, record: &mut Record, value: Value) -> bool {
        record.set_slot(self.slot, value)
    }

    /// Usage form, e.g. `-port, -p <u16>` or `-child {ChildOptions}`.
    pub fn usage_text(&self) -> String {
        let mut text = format!("-{}", self.long_name);
        if let Some(short) = &self.short_name {
            text.push_str(", -");
            text.push_str(short);
        }
        match &self.kind {
            FieldKind::Nested(_) => format!("{text} {{{}}}", self.type_name()),
            _ => format!("{text} <{}>", self.type_name()),
        }
    }

    /// Value a fresh instance starts with; nested fields start unset.
    fn initial_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match &self.kind {
            FieldKind::Scalar(kind) => Some(kind.zero()),
            FieldKind::Enum(e) => e.variants().first().cloned().map(Value::Enum),
            FieldKind::Nested(_) => None,
        }
    }
}

/// Compiled, immutable description of one option type.
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    type_name: Option<String>,
    description: Option<String>,
    fields: Vec<OptionField>,
    long_names: HashMap<String, usize>,
    short_names: HashMap<String, usize>,
}

impl OptionSchema {
    /// Schema of a command without an option type.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in binding order (base type fields first).
    pub fn fields(&self) -> &[OptionField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves an option name case-insensitively, long names first.
    pub fn find(&self, name: &str) -> Option<&OptionField> {
        let key = name.to_lowercase();
        self.long_names
            .get(&key)
            .or_else(|| self.short_names.get(&key))
            .map(|&i| &self.fields[i])
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Fresh instance: scalars hold their defaults, nested fields are unset.
    pub fn new_instance(&self) -> Record {
        let mut record = Record::new(self.type_name());
        for field in &self.fields {
            record.push(&field.long_name, field.initial_value());
        }
        record
    }

    /// Instance with every nested field filled with its own default instance.
    pub fn default_instance(&self) -> Record {
        let mut record = self.new_instance();
        for field in &self.fields {
            if let FieldKind::Nested(nested) = &field.kind {
                field.set(&mut record, Value::Record(nested.default_instance()));
            }
        }
        record
    }

    fn add_field(&mut self, mut field: OptionField) -> Result<(), ConstructionError> {
        let type_name = self.type_name.clone().unwrap_or_default();

        let long_key = field.long_name.to_lowercase();
        if self.long_names.contains_key(&long_key) || self.short_names.contains_key(&long_key) {
            return Err(ConstructionError::DuplicateLongName {
                name: field.long_name,
                type_name,
            });
        }

        let index = self.fields.len();
        if let Some(short) = &field.short_name {
            let short_key = short.to_lowercase();
            if short_key == long_key
                || self.long_names.contains_key(&short_key)
                || self.short_names.contains_key(&short_key)
            {
                return Err(ConstructionError::DuplicateShortName {
                    name: short.clone(),
                    type_name,
                });
            }
            self.short_names.insert(short_key, index);
        }

        self.long_names.insert(long_key, index);
        field.slot = index;
        self.fields.push(field);
        Ok(())
    }
}

/// Builds and caches [`OptionSchema`]s from a [`MetadataProvider`].
///
/// One builder should be shared by everything that compiles schemas from the
/// same provider, so each option type is compiled once and shared.
pub struct SchemaBuilder<'a> {
    provider: &'a dyn MetadataProvider,
    cache: HashMap<String, Arc<OptionSchema>>,
    /// Option types currently being compiled, outermost first.
    in_progress: Vec<String>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(provider: &'a dyn MetadataProvider) -> Self {
        Self {
            provider,
            cache: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Builds the schema for an optional option type; `None` yields the empty schema.
    pub fn build_optional(
        &mut self,
        type_name: Option<&str>,
    ) -> Result<Arc<OptionSchema>, ConstructionError> {
        match type_name {
            Some(name) if !name.trim().is_empty() => self.build(name.trim()),
            _ => Ok(Arc::new(OptionSchema::empty())),
        }
    }

    /// Builds (or returns the cached) schema of an option type.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] for unknown types, duplicate names,
    /// unsupported field kinds, invalid defaults, empty nested types and
    /// containment cycles.
    pub fn build(&mut self, type_name: &str) -> Result<Arc<OptionSchema>, ConstructionError> {
        if let Some(schema) = self.cache.get(type_name) {
            return Ok(Arc::clone(schema));
        }

        if self.in_progress.iter().any(|t| t == type_name) {
            let mut path = self.in_progress.clone();
            path.push(type_name.to_string());
            return Err(ConstructionError::CircularDependency(path.join(" -> ")));
        }

        self.in_progress.push(type_name.to_string());
        let compiled = self.compile(type_name);
        self.in_progress.pop();

        let schema = Arc::new(compiled?);
        debug!(
            option_type = type_name,
            fields = schema.fields.len(),
            "Built option schema"
        );
        self.cache
            .insert(type_name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    fn compile(&mut self, type_name: &str) -> Result<OptionSchema, ConstructionError> {
        let provider = self.provider;
        let descriptor = provider
            .option_type(type_name)
            .ok_or_else(|| ConstructionError::UnknownOptionType(type_name.to_string()))?;

        // Walk the base chain; fields are added base first.
        let mut chain = vec![descriptor];
        let mut current = descriptor;
        while let Some(base) = current.base.as_deref().filter(|b| !b.trim().is_empty()) {
            let base = base.trim();
            if chain.iter().any(|d| d.name == base) {
                let mut path: Vec<&str> = chain.iter().map(|d| d.name.as_str()).collect();
                path.push(base);
                return Err(ConstructionError::CircularDependency(path.join(" -> ")));
            }
            current = provider
                .option_type(base)
                .ok_or_else(|| ConstructionError::UnknownOptionType(base.to_string()))?;
            chain.push(current);
        }

        let mut schema = OptionSchema {
            type_name: Some(type_name.to_string()),
            description: descriptor.description.clone(),
            ..Default::default()
        };
        for option_type in chain.iter().rev() {
            for field in &option_type.fields {
                let field = self.compile_field(type_name, field)?;
                schema.add_field(field)?;
            }
        }
        Ok(schema)
    }

    fn compile_field(
        &mut self,
        owner: &str,
        descriptor: &FieldDescriptor,
    ) -> Result<OptionField, ConstructionError> {
        let long_name = descriptor.long_name.trim().trim_matches('-').to_string();
        if long_name.is_empty() {
            return Err(ConstructionError::EmptyOptionName(owner.to_string()));
        }
        let short_name = descriptor
            .short_name
            .as_deref()
            .map(|s| s.trim().trim_matches('-'))
            .filter(|s| !s.is_empty())
            .map(String::from);

        let kind = self.resolve_kind(&long_name, descriptor.kind.trim())?;
        let default = match &descriptor.default {
            Some(text) => Some(convert_default(&long_name, &kind, text)?),
            None => None,
        };

        Ok(OptionField {
            long_name,
            short_name,
            description: descriptor.description.clone(),
            default_text: descriptor.default_text.clone(),
            required: descriptor.required,
            env: descriptor.env,
            processing: descriptor.processing,
            kind,
            default,
            slot: 0,
        })
    }

    fn resolve_kind(&mut self, field: &str, kind: &str) -> Result<FieldKind, ConstructionError> {
        if let Some(scalar) = ConverterRegistry::global().resolve(kind) {
            return Ok(FieldKind::Scalar(scalar));
        }

        let provider = self.provider;
        if let Some(descriptor) = provider.enum_type(kind) {
            if descriptor.variants.is_empty() {
                return Err(ConstructionError::EmptyEnum(kind.to_string()));
            }
            return Ok(FieldKind::Enum(EnumType::from_descriptor(descriptor)));
        }

        if provider.option_type(kind).is_some() {
            let nested = self.build(kind)?;
            if nested.is_empty() {
                return Err(ConstructionError::EmptyOptionType(kind.to_string()));
            }
            return Ok(FieldKind::Nested(nested));
        }

        Err(ConstructionError::UnsupportedType {
            field: field.to_string(),
            kind: kind.to_string(),
        })
    }
}

fn convert_default(field: &str, kind: &FieldKind, text: &str) -> Result<Value, ConstructionError> {
    let invalid = || ConstructionError::InvalidDefault {
        field: field.to_string(),
        value: text.to_string(),
        kind: kind.type_name().to_string(),
    };

    match kind {
        FieldKind::Scalar(ScalarKind::String) => Ok(Value::Str(text.to_string())),
        FieldKind::Scalar(scalar) => ConverterRegistry::global()
            .convert(*scalar, text)
            .map_err(|_| invalid()),
        FieldKind::Enum(e) => e
            .resolve(text)
            .map(|v| Value::Enum(v.to_string()))
            .ok_or_else(invalid),
        FieldKind::Nested(_) => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, OptionTypeDescriptor};

    fn level() -> EnumDescriptor {
        EnumDescriptor::new("Level", &["Low", "Medium", "High"])
    }

    #[test]
    fn test_fields_and_lookup() {
        let catalog = Catalog::new().with_enum(level()).with_option_type(
            OptionTypeDescriptor::new("Opts")
                .with_field(FieldDescriptor::new("-name-", "string").with_short("n"))
                .with_field(FieldDescriptor::new("level", "Level"))
                .with_field(FieldDescriptor::new("count", "int").with_default("5")),
        );
        let schema = SchemaBuilder::new(&catalog).build("Opts").unwrap();

        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.find("NAME").unwrap().long_name(), "name");
        assert_eq!(schema.find("N").unwrap().long_name(), "name");
        assert!(schema.find("missing").is_none());
        assert_eq!(schema.find("count").unwrap().usage_text(), "-count <i32>");
        assert_eq!(schema.find("name").unwrap().usage_text(), "-name, -n <string>");

        let record = schema.new_instance();
        assert_eq!(record.get("name"), Some(&Value::Str(String::new())));
        assert_eq!(record.get("level"), Some(&Value::Enum("Low".into())));
        assert_eq!(record.get("count"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_inherited_fields_come_first() {
        let catalog = Catalog::new()
            .with_option_type(
                OptionTypeDescriptor::new("Base").with_field(FieldDescriptor::new("verbose", "bool")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Derived")
                    .with_base("Base")
                    .with_field(FieldDescriptor::new("path", "string")),
            );
        let schema = SchemaBuilder::new(&catalog).build("Derived").unwrap();

        let names: Vec<_> = schema.fields().iter().map(|f| f.long_name()).collect();
        assert_eq!(names, vec!["verbose", "path"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let catalog = Catalog::new()
            .with_option_type(
                OptionTypeDescriptor::new("Base").with_field(FieldDescriptor::new("Path", "string")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Derived")
                    .with_base("Base")
                    .with_field(FieldDescriptor::new("path", "string")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Shorts")
                    .with_field(FieldDescriptor::new("alpha", "string").with_short("a"))
                    .with_field(FieldDescriptor::new("beta", "string").with_short("alpha")),
            );
        let mut builder = SchemaBuilder::new(&catalog);

        assert!(matches!(
            builder.build("Derived"),
            Err(ConstructionError::DuplicateLongName { .. })
        ));
        assert!(matches!(
            builder.build("Shorts"),
            Err(ConstructionError::DuplicateShortName { .. })
        ));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let catalog = Catalog::new()
            .with_option_type(
                OptionTypeDescriptor::new("A").with_field(FieldDescriptor::new("b", "B")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("B").with_field(FieldDescriptor::new("a", "A")),
            )
            .with_option_type(OptionTypeDescriptor::new("Loop").with_base("Loop"));
        let mut builder = SchemaBuilder::new(&catalog);

        match builder.build("A") {
            Err(ConstructionError::CircularDependency(path)) => assert_eq!(path, "A -> B -> A"),
            other => panic!("expected a cycle, got {other:?}"),
        }
        assert!(matches!(
            builder.build("Loop"),
            Err(ConstructionError::CircularDependency(_))
        ));
        // A failed build leaves the builder usable.
        assert!(builder.in_progress.is_empty());
    }

    #[test]
    fn test_unsupported_and_empty_nested_types() {
        let catalog = Catalog::new()
            .with_option_type(OptionTypeDescriptor::new("Empty"))
            .with_option_type(
                OptionTypeDescriptor::new("UsesEmpty").with_field(FieldDescriptor::new("e", "Empty")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("UsesDecimal")
                    .with_field(FieldDescriptor::new("amount", "decimal")),
            );
        let mut builder = SchemaBuilder::new(&catalog);

        assert_eq!(
            builder.build("UsesEmpty").unwrap_err(),
            ConstructionError::EmptyOptionType("Empty".into())
        );
        assert!(matches!(
            builder.build("UsesDecimal"),
            Err(ConstructionError::UnsupportedType { .. })
        ));
        assert!(matches!(
            builder.build("Nope"),
            Err(ConstructionError::UnknownOptionType(_))
        ));
    }

    #[test]
    fn test_invalid_defaults_are_rejected() {
        let catalog = Catalog::new()
            .with_enum(level())
            .with_option_type(
                OptionTypeDescriptor::new("BadInt")
                    .with_field(FieldDescriptor::new("n", "u8").with_default("300")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("BadEnum")
                    .with_field(FieldDescriptor::new("level", "Level").with_default("Extreme")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("GoodEnum")
                    .with_field(FieldDescriptor::new("level", "Level").with_default("high")),
            );
        let mut builder = SchemaBuilder::new(&catalog);

        assert!(matches!(
            builder.build("BadInt"),
            Err(ConstructionError::InvalidDefault { .. })
        ));
        assert!(matches!(
            builder.build("BadEnum"),
            Err(ConstructionError::InvalidDefault { .. })
        ));
        let schema = builder.build("GoodEnum").unwrap();
        assert_eq!(
            schema.new_instance().get("level"),
            Some(&Value::Enum("High".into()))
        );
    }

    #[test]
    fn test_schemas_are_cached_and_nested_defaults_filled() {
        let catalog = Catalog::new()
            .with_option_type(
                OptionTypeDescriptor::new("Child")
                    .with_field(FieldDescriptor::new("depth", "i32").with_default("2")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Parent")
                    .with_field(FieldDescriptor::new("left", "Child"))
                    .with_field(FieldDescriptor::new("right", "Child")),
            );
        let mut builder = SchemaBuilder::new(&catalog);
        let parent = builder.build("Parent").unwrap();
        let child = builder.build("Child").unwrap();

        let left = parent.find("left").unwrap().nested().unwrap();
        assert!(Arc::ptr_eq(left, &child));
        assert_eq!(parent.find("right").unwrap().usage_text(), "-right {Child}");

        assert!(parent.new_instance().get("left").is_none());
        let defaults = parent.default_instance();
        let right = defaults.get_as::<Record>("right").unwrap();
        assert_eq!(right.get_as::<i32>("depth"), Some(2));
    }
}
