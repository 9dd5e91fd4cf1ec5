//! Scalar string-to-value converters.
//!
//! The registry is process-wide and initialized once on first use; it is
//! read-only afterwards. Field kinds are resolved against it by type name, so
//! a kind that is not a registered scalar is treated as an enum or a nested
//! option type by the schema builder.

use std::collections::HashMap;
use std::num::{ParseFloatError, ParseIntError};
use std::sync::OnceLock;

use thiserror::Error;

use crate::ArgumentProcessing;
use crate::Value;

const TRIPLE_QUOTES: &str = "\"\"\"";

/// Scalar value kinds understood by the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Char,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 13] = [
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::U8,
        ScalarKind::I16,
        ScalarKind::U16,
        ScalarKind::I32,
        ScalarKind::U32,
        ScalarKind::I64,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Char,
        ScalarKind::String,
    ];

    /// Canonical type name used in descriptors and messages.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::U16 => "u16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "i64",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
        }
    }

    /// Value of a field of this kind that declares no default.
    pub fn zero(self) -> Value {
        match self {
            ScalarKind::Bool => Value::Bool(false),
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64 => Value::Int(0),
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 => {
                Value::UInt(0)
            }
            ScalarKind::F32 | ScalarKind::F64 => Value::Float(0.0),
            ScalarKind::Char => Value::Char('\0'),
            ScalarKind::String => Value::Str(String::new()),
        }
    }
}

/// Why a scalar conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("'{0}' is not 'true' or 'false'")]
    NotBoolean(String),
    #[error("invalid integer: {0}")]
    Integer(#[from] ParseIntError),
    #[error("invalid number: {0}")]
    Float(#[from] ParseFloatError),
    #[error("'{0}' is out of range")]
    OutOfRange(String),
    #[error("'{0}' is not a single character")]
    NotChar(String),
    #[error("no converter registered for '{}'", .0.name())]
    Unregistered(ScalarKind),
}

/// A scalar converter.
pub type Converter = fn(&str) -> Result<Value, ConvertError>;

/// Table of scalar converters keyed by type name.
///
/// # Examples
///
/// ```
/// use optline_core::{ConverterRegistry, ScalarKind, Value};
///
/// let registry = ConverterRegistry::global();
/// let kind = registry.resolve("Int").unwrap();
/// assert_eq!(kind, ScalarKind::I32);
/// assert_eq!(registry.convert(kind, " 42 ").unwrap(), Value::Int(42));
/// assert!(registry.convert(kind, "4e9").is_err());
/// ```
pub struct ConverterRegistry {
    names: HashMap<String, ScalarKind>,
    converters: HashMap<ScalarKind, Converter>,
}

static REGISTRY: OnceLock<ConverterRegistry> = OnceLock::new();

impl ConverterRegistry {
    /// Returns the process-wide registry, building it on first use.
    pub fn global() -> &'static ConverterRegistry {
        REGISTRY.get_or_init(Self::standard)
    }

    fn standard() -> Self {
        let mut registry = Self {
            names: HashMap::new(),
            converters: HashMap::new(),
        };

        registry.add(ScalarKind::Bool, &["bool", "boolean"], convert_bool);
        registry.add(ScalarKind::I8, &["i8", "sbyte"], |s| signed::<i8>(s));
        registry.add(ScalarKind::U8, &["u8", "byte"], |s| unsigned::<u8>(s));
        registry.add(ScalarKind::I16, &["i16", "short"], |s| signed::<i16>(s));
        registry.add(ScalarKind::U16, &["u16", "ushort"], |s| unsigned::<u16>(s));
        registry.add(ScalarKind::I32, &["i32", "int"], |s| signed::<i32>(s));
        registry.add(ScalarKind::U32, &["u32", "uint"], |s| unsigned::<u32>(s));
        registry.add(ScalarKind::I64, &["i64", "long"], |s| signed::<i64>(s));
        registry.add(ScalarKind::U64, &["u64", "ulong"], |s| unsigned::<u64>(s));
        registry.add(ScalarKind::F32, &["f32", "float", "single"], convert_f32);
        registry.add(ScalarKind::F64, &["f64", "double"], convert_f64);
        registry.add(ScalarKind::Char, &["char"], convert_char);
        registry.add(ScalarKind::String, &["string", "str"], |s| {
            Ok(Value::Str(unwrap_quotes(s).to_string()))
        });

        registry
    }

    fn add(&mut self, kind: ScalarKind, names: &[&str], converter: Converter) {
        for name in names {
            self.names.insert(name.to_string(), kind);
        }
        self.converters.insert(kind, converter);
    }

    /// Resolves a type name (case-insensitive) to a scalar kind.
    pub fn resolve(&self, type_name: &str) -> Option<ScalarKind> {
        self.names.get(&type_name.trim().to_lowercase()).copied()
    }

    /// Converts text to a value of the given kind.
    pub fn convert(&self, kind: ScalarKind, text: &str) -> Result<Value, ConvertError> {
        match self.converters.get(&kind) {
            Some(converter) => converter(text),
            None => Err(ConvertError::Unregistered(kind)),
        }
    }

    /// Converts a string value, honoring the field's normalization mode.
    pub fn convert_string(&self, text: &str, processing: ArgumentProcessing) -> Value {
        let unwrapped = match processing {
            ArgumentProcessing::AsIs => return Value::Str(text.to_string()),
            _ => unwrap_quotes(text),
        };

        let normalized = match processing {
            ArgumentProcessing::UnwrapAndReplaceNewlinesWithSpace => {
                unwrapped.replace("\r\n", " ").replace(['\r', '\n'], " ")
            }
            ArgumentProcessing::UnwrapAndRemoveNewlines => unwrapped.replace(['\r', '\n'], ""),
            _ => unwrapped.to_string(),
        };
        Value::Str(normalized)
    }
}

/// Strips one layer of `"""..."""`, `"..."` or `'...'`.
///
/// # Examples
///
/// ```
/// use optline_core::unwrap_quotes;
///
/// assert_eq!(unwrap_quotes("\"\"\"a \"b\"\"\"\""), "a \"b\"");
/// assert_eq!(unwrap_quotes("'abc'"), "abc");
/// assert_eq!(unwrap_quotes("\"abc"), "\"abc");
/// ```
pub fn unwrap_quotes(text: &str) -> &str {
    if text.len() >= 6 && text.starts_with(TRIPLE_QUOTES) && text.ends_with(TRIPLE_QUOTES) {
        &text[3..text.len() - 3]
    } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn convert_bool(text: &str) -> Result<Value, ConvertError> {
    match text.to_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(ConvertError::NotBoolean(text.to_string())),
    }
}

fn signed<T>(text: &str) -> Result<Value, ConvertError>
where
    T: std::str::FromStr<Err = ParseIntError> + Into<i64>,
{
    let n: T = text.trim().parse()?;
    Ok(Value::Int(n.into()))
}

fn unsigned<T>(text: &str) -> Result<Value, ConvertError>
where
    T: std::str::FromStr<Err = ParseIntError> + Into<u64>,
{
    let n: T = text.trim().parse()?;
    Ok(Value::UInt(n.into()))
}

fn convert_f32(text: &str) -> Result<Value, ConvertError> {
    let text = text.trim();
    let narrow: f32 = text.parse()?;
    if narrow.is_infinite() && !text.to_lowercase().contains("inf") {
        return Err(ConvertError::OutOfRange(text.to_string()));
    }
    // Keep the decimal text's own precision rather than the widened f32 bits.
    Ok(Value::Float(text.parse::<f64>()?))
}

fn convert_f64(text: &str) -> Result<Value, ConvertError> {
    Ok(Value::Float(text.trim().parse::<f64>()?))
}

fn convert_char(text: &str) -> Result<Value, ConvertError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err(ConvertError::NotChar(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(name: &str, text: &str) -> Result<Value, ConvertError> {
        let registry = ConverterRegistry::global();
        registry.convert(registry.resolve(name).unwrap(), text)
    }

    #[test]
    fn test_every_kind_has_a_converter() {
        let registry = ConverterRegistry::global();
        for kind in ScalarKind::ALL {
            assert!(registry.converters.contains_key(&kind), "{kind:?}");
        }
    }

    #[test]
    fn test_missing_converter_is_an_error() {
        let registry = ConverterRegistry {
            names: HashMap::new(),
            converters: HashMap::new(),
        };
        let err = registry.convert(ScalarKind::I32, "1").unwrap_err();
        assert_eq!(err, ConvertError::Unregistered(ScalarKind::I32));
        assert_eq!(err.to_string(), "no converter registered for 'i32'");
    }

    #[test]
    fn test_resolve_names_and_aliases() {
        let registry = ConverterRegistry::global();
        for kind in ScalarKind::ALL {
            assert_eq!(registry.resolve(kind.name()), Some(kind));
        }
        assert_eq!(registry.resolve("Boolean"), Some(ScalarKind::Bool));
        assert_eq!(registry.resolve("Double"), Some(ScalarKind::F64));
        assert_eq!(registry.resolve("ServerOptions"), None);
    }

    #[test]
    fn test_bool_accepts_only_true_false() {
        assert_eq!(convert("bool", "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(convert("bool", "False").unwrap(), Value::Bool(false));
        assert!(convert("bool", "1").is_err());
        assert!(convert("bool", "yes").is_err());
    }

    #[test]
    fn test_integer_ranges() {
        assert_eq!(convert("i8", "-128").unwrap(), Value::Int(-128));
        assert!(convert("i8", "128").is_err());
        assert_eq!(convert("u16", "+65535").unwrap(), Value::UInt(65535));
        assert!(convert("u32", "-1").is_err());
        assert!(convert("i32", "1.5").is_err());
        assert!(convert("i64", "").is_err());
    }

    #[test]
    fn test_floats() {
        assert_eq!(convert("f64", "-10.5").unwrap(), Value::Float(-10.5));
        assert_eq!(convert("f32", "9.1").unwrap(), Value::Float(9.1));
        assert!(convert("f32", "1e39").is_err());
        assert!(convert("f64", "abc").is_err());
    }

    #[test]
    fn test_char_and_string() {
        assert_eq!(convert("char", "@").unwrap(), Value::Char('@'));
        assert!(convert("char", "ab").is_err());
        assert!(convert("char", "").is_err());
        assert_eq!(convert("string", "\"a b\"").unwrap(), Value::Str("a b".into()));
        assert_eq!(convert("string", "plain").unwrap(), Value::Str("plain".into()));
    }

    #[test]
    fn test_string_processing_modes() {
        let registry = ConverterRegistry::global();
        let text = "\"\"\"a\r\nb\nc\"\"\"";
        assert_eq!(
            registry.convert_string(text, ArgumentProcessing::AsIs),
            Value::Str(text.into())
        );
        assert_eq!(
            registry.convert_string(text, ArgumentProcessing::UnwrapOnly),
            Value::Str("a\r\nb\nc".into())
        );
        assert_eq!(
            registry.convert_string(text, ArgumentProcessing::UnwrapAndReplaceNewlinesWithSpace),
            Value::Str("a b c".into())
        );
        assert_eq!(
            registry.convert_string(text, ArgumentProcessing::UnwrapAndRemoveNewlines),
            Value::Str("abc".into())
        );
    }
}
