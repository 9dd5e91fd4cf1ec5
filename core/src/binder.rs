//! Token-to-record binding.
//!
//! The binder walks a token list against one [`OptionSchema`], filling a
//! [`Record`] from named options (`-name value`), positional values for
//! required fields, and environment variables, then validates what is still
//! missing. Problems are collected, never returned as `Err`: the caller gets
//! every message from one pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::convert::{ConverterRegistry, ScalarKind};
use crate::error::{ArgumentError, ParseError, ValidationError};
use crate::helpers::{is_option_reference, unwrap_bracket};
use crate::schema::{FieldKind, OptionField, OptionSchema};
use crate::tokenizer::{tokenize, OPTION_PREFIX, SEPARATOR};
use crate::{Record, Value};

/// Read access to environment variables.
pub trait EnvSource {
    /// Returns the variable's value; any lookup failure is `None`.
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Binder switches taken from the parser options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindSettings {
    /// Report option names the schema does not know.
    pub require_strict_option_name: bool,
    /// Bind bare values to the first unset required field.
    pub omit_option_names_for_required_options: bool,
}

impl Default for BindSettings {
    fn default() -> Self {
        Self {
            require_strict_option_name: false,
            omit_option_names_for_required_options: true,
        }
    }
}

/// Result of one binder pass.
#[derive(Debug, Clone, Default)]
pub struct BindOutcome {
    /// Bound record; `None` after a validation error.
    pub instance: Option<Record>,
    /// Tokens that were neither options nor positional values.
    pub remainder: Vec<String>,
    /// Problems in the order they were found.
    pub errors: Vec<ArgumentError>,
    /// A required value is missing.
    pub fatal: bool,
}

impl BindOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Binds token lists against option schemas.
///
/// # Examples
///
/// ```
/// use optline_core::*;
///
/// let catalog = Catalog::new().with_option_type(
///     OptionTypeDescriptor::new("Opts")
///         .with_field(FieldDescriptor::new("name", "string").required())
///         .with_field(FieldDescriptor::new("count", "i32").with_short("c")),
/// );
/// let schema = SchemaBuilder::new(&catalog).build("Opts").unwrap();
///
/// let binder = Binder::new(BindSettings::default(), &ProcessEnv);
/// let tokens = tokenize("\"a b\" -c 3 extra");
/// let outcome = binder.bind(&schema, &tokens, 0, false);
///
/// assert!(outcome.is_success());
/// let record = outcome.instance.unwrap();
/// assert_eq!(record.get_as::<String>("name").as_deref(), Some("a b"));
/// assert_eq!(record.get_as::<i32>("count"), Some(3));
/// assert_eq!(outcome.remainder, vec!["extra"]);
/// ```
pub struct Binder<'e> {
    settings: BindSettings,
    env: &'e dyn EnvSource,
}

impl<'e> Binder<'e> {
    pub fn new(settings: BindSettings, env: &'e dyn EnvSource) -> Self {
        Self { settings, env }
    }

    pub fn settings(&self) -> BindSettings {
        self.settings
    }

    /// Binds `tokens[start..]` into a fresh instance of `schema`.
    pub fn bind(
        &self,
        schema: &OptionSchema,
        tokens: &[String],
        start: usize,
        accept_unknown: bool,
    ) -> BindOutcome {
        self.bind_into(schema, schema.new_instance(), tokens, start, accept_unknown)
    }

    /// Binds `tokens[start..]` on top of an existing record of `schema`.
    ///
    /// With `accept_unknown`, option names the schema does not know are kept
    /// in the remainder without an error even under strict option names.
    pub fn bind_into(
        &self,
        schema: &OptionSchema,
        mut record: Record,
        tokens: &[String],
        start: usize,
        accept_unknown: bool,
    ) -> BindOutcome {
        let mut is_set = vec![false; schema.fields().len()];
        let mut remainder = Vec::new();
        let mut errors = Vec::new();

        let mut n = start;
        while n < tokens.len() {
            let token = &tokens[n];
            if is_option_reference(token) {
                let name = token.trim_matches(OPTION_PREFIX);
                match schema.find(name) {
                    Some(field) => match tokens.get(n + 1) {
                        Some(next) if !is_option_reference(next) => {
                            n += 1;
                            match self.convert(field, next, accept_unknown, &mut errors) {
                                Some(value) => {
                                    field.set(&mut record, value);
                                    is_set[field.index()] = true;
                                }
                                None => errors.push(
                                    ParseError::ConversionFailed {
                                        value: next.clone(),
                                        type_name: field.type_name().to_string(),
                                        context: format!("{token} {next}"),
                                    }
                                    .into(),
                                ),
                            }
                        }
                        _ => errors.push(
                            ParseError::MissingValue {
                                option: field.long_name().to_string(),
                            }
                            .into(),
                        ),
                    },
                    None => {
                        remainder.push(token.clone());
                        if self.settings.require_strict_option_name && !accept_unknown {
                            let error = match schema.type_name() {
                                Some(type_name) => ParseError::UnknownOption {
                                    name: name.to_string(),
                                    type_name: type_name.to_string(),
                                },
                                None => ParseError::InvalidOption {
                                    name: name.to_string(),
                                },
                            };
                            errors.push(error.into());
                        }
                    }
                }
            } else if token == SEPARATOR {
                // Group separators belong to the caller.
            } else if let Some(field) = self.positional_target(schema, &is_set) {
                match self.convert(field, token, accept_unknown, &mut errors) {
                    Some(value) => {
                        field.set(&mut record, value);
                        is_set[field.index()] = true;
                    }
                    // Index 0 is usually the command name itself.
                    None if n > 0 => errors.push(
                        ParseError::ConversionFailed {
                            value: token.clone(),
                            type_name: field.type_name().to_string(),
                            context: format!("{} {token}", tokens[n - 1]),
                        }
                        .into(),
                    ),
                    None => trace!(token = %token, "Skipped unconvertible leading token"),
                }
            } else {
                remainder.push(token.clone());
            }
            n += 1;
        }

        self.load_env(schema, &mut record, &mut is_set, accept_unknown);

        let mut fatal = false;
        for field in schema.fields() {
            if field.is_required() && !is_set[field.index()] {
                errors.push(
                    ValidationError::RequiredValue {
                        option: field.long_name().to_string(),
                        type_name: schema.type_name().unwrap_or_default().to_string(),
                    }
                    .into(),
                );
                fatal = true;
            }

            if let FieldKind::Nested(nested) = field.kind() {
                // A nested record carried in from the caller is kept.
                if !is_set[field.index()] && field.get(&record).is_none() {
                    field.set(&mut record, Value::Record(nested.default_instance()));
                }
            }
        }

        debug!(
            option_type = schema.type_name().unwrap_or("-"),
            errors = errors.len(),
            remainder = remainder.len(),
            fatal,
            "Bound arguments"
        );

        BindOutcome {
            instance: (!fatal).then_some(record),
            remainder,
            errors,
            fatal,
        }
    }

    fn positional_target<'s>(
        &self,
        schema: &'s OptionSchema,
        is_set: &[bool],
    ) -> Option<&'s OptionField> {
        if !self.settings.omit_option_names_for_required_options {
            return None;
        }
        schema
            .fields()
            .iter()
            .find(|f| f.is_required() && !is_set[f.index()])
    }

    fn load_env(
        &self,
        schema: &OptionSchema,
        record: &mut Record,
        is_set: &mut [bool],
        accept_unknown: bool,
    ) {
        for field in schema.fields() {
            if is_set[field.index()] || !field.reads_env() {
                continue;
            }

            let value = field
                .short_name()
                .and_then(|name| self.env.var(name))
                .or_else(|| self.env.var(field.long_name()));
            let Some(text) = value else {
                continue;
            };

            // Environment values that do not convert count as absent.
            let mut discarded = Vec::new();
            if let Some(value) = self.convert(field, &text, accept_unknown, &mut discarded) {
                field.set(record, value);
                is_set[field.index()] = true;
            } else {
                trace!(option = field.long_name(), "Ignored unconvertible environment value");
            }
        }
    }

    /// Converts one value token; nested bind errors are appended to `errors`.
    fn convert(
        &self,
        field: &OptionField,
        text: &str,
        accept_unknown: bool,
        errors: &mut Vec<ArgumentError>,
    ) -> Option<Value> {
        let registry = ConverterRegistry::global();
        match field.kind() {
            FieldKind::Scalar(ScalarKind::String) => {
                Some(registry.convert_string(text, field.processing()))
            }
            FieldKind::Scalar(kind) => match registry.convert(*kind, text) {
                Ok(value) => Some(value),
                Err(e) => {
                    trace!(option = field.long_name(), error = %e, "Conversion failed");
                    None
                }
            },
            FieldKind::Enum(e) => e.resolve(text).map(|v| Value::Enum(v.to_string())),
            FieldKind::Nested(schema) => {
                let tokens = tokenize(unwrap_bracket(text));
                let outcome = self.bind(schema, &tokens, 0, accept_unknown);
                let success = outcome.is_success();
                errors.extend(outcome.errors);
                if success {
                    outcome.instance.map(Value::Record)
                } else {
                    None
                }
            }
        }
    }
}

/// Binds a raw string against one schema with the standard settings,
/// starting from `original` when given.
///
/// Unknown option names are accepted. Returns `None` only when a required
/// value is missing; other problems leave the affected fields untouched.
///
/// # Examples
///
/// ```
/// use optline_core::*;
///
/// let catalog = Catalog::new().with_option_type(
///     OptionTypeDescriptor::new("Opts").with_field(FieldDescriptor::new("n", "i32")),
/// );
/// let schema = SchemaBuilder::new(&catalog).build("Opts").unwrap();
///
/// let record = try_parse_options(&schema, "-n 7 -unknown 1", None).unwrap();
/// assert_eq!(record.get_as::<i32>("n"), Some(7));
/// ```
pub fn try_parse_options(
    schema: &OptionSchema,
    raw: &str,
    original: Option<Record>,
) -> Option<Record> {
    let binder = Binder::new(BindSettings::default(), &ProcessEnv);
    let record = original.unwrap_or_else(|| schema.new_instance());
    binder
        .bind_into(schema, record, &tokenize(raw), 0, true)
        .instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Catalog, EnumDescriptor, FieldDescriptor, OptionTypeDescriptor, SchemaBuilder,
    };
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_enum(EnumDescriptor::new("Level", &["Low", "High"]))
            .with_option_type(
                OptionTypeDescriptor::new("Child")
                    .with_field(FieldDescriptor::new("level", "Level"))
                    .with_field(FieldDescriptor::new("depth", "i32").with_default("1")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Opts")
                    .with_field(FieldDescriptor::new("name", "string").with_short("n"))
                    .with_field(FieldDescriptor::new("count", "i32").with_short("c"))
                    .with_field(FieldDescriptor::new("flag", "bool"))
                    .with_field(FieldDescriptor::new("child", "Child")),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Required")
                    .with_field(FieldDescriptor::new("first", "i32").required())
                    .with_field(FieldDescriptor::new("second", "string").required()),
            )
            .with_option_type(
                OptionTypeDescriptor::new("Env")
                    .with_field(FieldDescriptor::new("token", "string").with_short("T").from_env())
                    .with_field(FieldDescriptor::new("port", "u16").required().from_env()),
            )
    }

    fn schema(name: &str) -> Arc<OptionSchema> {
        let catalog = catalog();
        SchemaBuilder::new(&catalog).build(name).unwrap()
    }

    fn tokens(raw: &str) -> Vec<String> {
        tokenize(raw)
    }

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_named_options_and_remainder() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(
            &schema("Opts"),
            &tokens("-N \"x y\" --count -3 -flag TRUE rest -other"),
            0,
            false,
        );

        // `-3` looks like an option, so `count` has no value.
        assert_eq!(
            outcome.errors,
            vec![ArgumentError::from(ParseError::MissingValue {
                option: "count".into()
            })]
        );
        assert_eq!(outcome.remainder, vec!["-3", "rest", "-other"]);
        let record = outcome.instance.unwrap();
        assert_eq!(record.get_as::<String>("name").as_deref(), Some("x y"));
        assert_eq!(record.get_as::<bool>("flag"), Some(true));
        assert_eq!(record.get_as::<i32>("count"), Some(0));
    }

    #[test]
    fn test_conversion_failure_message() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Opts"), &tokens("-c abc -name"), 0, false);

        let messages: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Could not convert 'abc' to Type 'i32' (-c abc)",
                "No corresponding value found for option 'name'",
            ]
        );
        assert!(!outcome.fatal);
    }

    #[test]
    fn test_strict_option_names() {
        let env = no_env();
        let settings = BindSettings {
            require_strict_option_name: true,
            ..Default::default()
        };
        let binder = Binder::new(settings, &env);

        let outcome = binder.bind(&schema("Opts"), &tokens("-zzz 1"), 0, false);
        assert_eq!(
            outcome.errors[0].to_string(),
            "Option 'zzz' is not found in Type: Opts"
        );

        let outcome = binder.bind(&OptionSchema::empty(), &tokens("-zzz"), 0, false);
        assert_eq!(outcome.errors[0].to_string(), "Option 'zzz' is invalid");

        let outcome = binder.bind(&schema("Opts"), &tokens("-zzz 1"), 0, true);
        assert!(outcome.is_success());
        assert_eq!(outcome.remainder, vec!["-zzz", "1"]);
    }

    #[test]
    fn test_positional_fill_of_required_fields() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Required"), &tokens("cmd 12 \"two words\" x"), 1, false);

        assert!(outcome.is_success());
        let record = outcome.instance.unwrap();
        assert_eq!(record.get_as::<i32>("first"), Some(12));
        assert_eq!(record.get_as::<String>("second").as_deref(), Some("two words"));
        assert_eq!(outcome.remainder, vec!["x"]);
    }

    #[test]
    fn test_positional_failure_at_index_zero_is_silent() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Required"), &tokens("abc 5 s"), 0, false);
        assert!(outcome.is_success());
        assert_eq!(outcome.instance.unwrap().get_as::<i32>("first"), Some(5));

        let outcome = binder.bind(&schema("Required"), &tokens("5 abc"), 0, false);
        // "abc" fills `second`; nothing is left to fail.
        assert!(outcome.is_success());

        let outcome = binder.bind(&schema("Required"), &tokens("x abc"), 0, false);
        assert_eq!(
            outcome.errors[0].to_string(),
            "Could not convert 'abc' to Type 'i32' (x abc)"
        );
    }

    #[test]
    fn test_missing_required_is_fatal() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Required"), &tokens("-first 1"), 0, false);

        assert!(outcome.fatal);
        assert!(outcome.instance.is_none());
        assert_eq!(
            outcome.errors[0].to_string(),
            "Value is required for option 'second' <Required>"
        );
    }

    #[test]
    fn test_positional_fill_disabled() {
        let env = no_env();
        let settings = BindSettings {
            omit_option_names_for_required_options: false,
            ..Default::default()
        };
        let binder = Binder::new(settings, &env);
        let outcome = binder.bind(&schema("Required"), &tokens("1 two"), 0, false);

        assert_eq!(outcome.remainder, vec!["1", "two"]);
        assert!(outcome.fatal);
    }

    #[test]
    fn test_env_fallback_short_then_long() {
        let mut env = no_env();
        env.insert("T".into(), "from-short".into());
        env.insert("token".into(), "from-long".into());
        env.insert("port".into(), "8080".into());
        let binder = Binder::new(BindSettings::default(), &env);

        let record = binder
            .bind(&schema("Env"), &[], 0, false)
            .instance
            .unwrap();
        assert_eq!(record.get_as::<String>("token").as_deref(), Some("from-short"));
        assert_eq!(record.get_as::<u16>("port"), Some(8080));

        // Command line wins over the environment.
        let record = binder
            .bind(&schema("Env"), &tokens("-port 1"), 0, false)
            .instance
            .unwrap();
        assert_eq!(record.get_as::<u16>("port"), Some(1));
    }

    #[test]
    fn test_env_conversion_failure_is_ignored() {
        let mut env = no_env();
        env.insert("port".into(), "not-a-port".into());
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Env"), &[], 0, false);

        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].is_fatal());
    }

    #[test]
    fn test_nested_records() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);

        let outcome = binder.bind(&schema("Opts"), &tokens("-child {-level high}"), 0, false);
        assert!(outcome.is_success());
        let child = outcome.instance.unwrap().get_as::<Record>("child").unwrap();
        assert_eq!(child.get_as::<String>("level").as_deref(), Some("High"));
        assert_eq!(child.get_as::<i32>("depth"), Some(1));

        // Unset nested fields get the nested default instance.
        let record = binder.bind(&schema("Opts"), &[], 0, false).instance.unwrap();
        let child = record.get_as::<Record>("child").unwrap();
        assert_eq!(child.get("level"), Some(&Value::Enum("Low".into())));
    }

    #[test]
    fn test_nested_errors_precede_outer_error() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Opts"), &tokens("-child {-depth x}"), 0, false);

        let messages: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "Could not convert 'x' to Type 'i32' (-depth x)",
                "Could not convert '{-depth x}' to Type 'Child' (-child {-depth x})",
            ]
        );
    }

    #[test]
    fn test_separator_passes_through() {
        let env = no_env();
        let binder = Binder::new(BindSettings::default(), &env);
        let outcome = binder.bind(&schema("Opts"), &tokens("-c 1 | -c 2"), 0, false);

        assert!(outcome.remainder.is_empty());
        assert_eq!(outcome.instance.unwrap().get_as::<i32>("count"), Some(2));
    }

    #[test]
    fn test_try_parse_options_keeps_original() {
        let opts = schema("Opts");
        let mut original = opts.new_instance();
        original.set("name", Value::Str("kept".into()));

        let record = try_parse_options(&opts, "-count 4 -bogus", Some(original)).unwrap();
        assert_eq!(record.get_as::<String>("name").as_deref(), Some("kept"));
        assert_eq!(record.get_as::<i32>("count"), Some(4));

        assert!(try_parse_options(&schema("Required"), "", None).is_none());
    }

    #[test]
    fn test_try_parse_options_keeps_original_nested_record() {
        let opts = schema("Opts");
        let mut child = schema("Child").default_instance();
        child.set("depth", Value::Int(42));
        let mut original = opts.new_instance();
        original.set("child", Value::Record(child));

        let record = try_parse_options(&opts, "-n 1", Some(original)).unwrap();
        let child = record.get_as::<Record>("child").unwrap();
        assert_eq!(child.get_as::<i32>("depth"), Some(42));
        assert_eq!(record.get_as::<String>("name").as_deref(), Some("1"));

        // Without an original the nested default is still filled.
        let record = try_parse_options(&opts, "-n 1", None).unwrap();
        let child = record.get_as::<Record>("child").unwrap();
        assert_eq!(child.get_as::<i32>("depth"), Some(1));
    }
}
