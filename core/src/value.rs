//! Bound option values.
//!
//! A [`Record`] is the live instance populated by one binder call: one slot
//! per schema field, in declaration order. Scalar slots always hold a value
//! (the declared default or the kind's zero value); nested slots stay empty
//! until bound or filled with the nested default after validation.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Any signed integer kind.
    Int(i64),
    /// Any unsigned integer kind.
    UInt(u64),
    /// `f32` or `f64`.
    Float(f64),
    Char(char),
    Str(String),
    /// Canonical variant name of an enum.
    Enum(String),
    /// Nested option object.
    Record(Record),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns signed integers, and unsigned ones that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns unsigned integers, and non-negative signed ones.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns string values and enum variant names.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) | Value::Enum(s) => f.write_str(s),
            Value::Record(r) => write!(f, "{r}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::UInt(n) => serializer.serialize_u64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Str(s) | Value::Enum(s) => serializer.serialize_str(s),
            Value::Record(r) => r.serialize(serializer),
        }
    }
}

/// Bound instance of an option type.
///
/// # Examples
///
/// ```
/// use optline_core::{Record, Value};
///
/// let mut record = Record::new(Some("Opts"));
/// record.push("count", Some(Value::Int(3)));
/// record.push("child", None);
///
/// assert_eq!(record.get_as::<i32>("COUNT"), Some(3));
/// assert!(record.get("child").is_none());
/// assert!(record.set("Child", Value::Str("x".into())));
/// assert_eq!(record.get("child"), Some(&Value::Str("x".into())));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    type_name: Option<String>,
    slots: Vec<(String, Option<Value>)>,
}

impl Record {
    /// Creates an empty record for the given option type.
    pub fn new(type_name: Option<&str>) -> Self {
        Self {
            type_name: type_name.map(String::from),
            slots: Vec::new(),
        }
    }

    /// Appends a slot.
    pub fn push(&mut self, name: &str, value: Option<Value>) {
        self.slots.push((name.to_string(), value));
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Looks up a value by field name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).and_then(|i| self.slot(i))
    }

    /// Looks up and converts a value.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(T::from_value)
    }

    /// Replaces a value by field name; returns `false` when no such field exists.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        match self.position(name) {
            Some(i) => self.set_slot(i, value),
            None => false,
        }
    }

    /// Iterates `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.slots.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(|(_, v)| v.as_ref())
    }

    pub(crate) fn set_slot(&mut self, index: usize, value: Value) -> bool {
        match self.slots.get_mut(index) {
            Some((_, slot)) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.slots.iter().position(|(n, _)| n.to_lowercase() == name)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match value {
                Some(Value::Str(s)) => write!(f, "-{name} \"{s}\"")?,
                Some(v) => write!(f, "-{name} {v}")?,
                None => write!(f, "-{name} {{}}")?,
            }
        }
        f.write_str("}")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (name, value) in &self.slots {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Conversion from a bound [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_signed {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: &Value) -> Option<Self> {
                value.as_i64().and_then(|n| <$t>::try_from(n).ok())
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: &Value) -> Option<Self> {
                value.as_u64().and_then(|n| <$t>::try_from(n).ok())
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|x| x as f32)
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_char()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromValue for Record {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_record().cloned()
    }
}

/// Conversion from a bound [`Record`] into a host option struct.
///
/// # Examples
///
/// ```
/// use optline_core::{FromRecord, Record, Value};
///
/// struct Greeting {
///     name: String,
///     times: u32,
/// }
///
/// impl FromRecord for Greeting {
///     fn from_record(record: &Record) -> Option<Self> {
///         Some(Self {
///             name: record.get_as("name")?,
///             times: record.get_as("times")?,
///         })
///     }
/// }
///
/// let mut record = Record::new(Some("Greeting"));
/// record.push("name", Some(Value::Str("ada".into())));
/// record.push("times", Some(Value::UInt(2)));
/// let greeting = Greeting::from_record(&record).unwrap();
/// assert_eq!(greeting.name, "ada");
/// assert_eq!(greeting.times, 2);
/// ```
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Option<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut child = Record::new(Some("Child"));
        child.push("level", Some(Value::Enum("High".into())));

        let mut record = Record::new(Some("Parent"));
        record.push("name", Some(Value::Str("a b".into())));
        record.push("count", Some(Value::Int(-2)));
        record.push("child", Some(Value::Record(child)));
        record
    }

    #[test]
    fn test_integer_range_checks() {
        let record = sample();
        assert_eq!(record.get_as::<i8>("count"), Some(-2));
        assert_eq!(record.get_as::<u32>("count"), None);
        assert_eq!(Value::UInt(300).as_i64(), Some(300));
        assert_eq!(u8::from_value(&Value::UInt(300)), None);
    }

    #[test]
    fn test_serialize_as_json_map() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "a b", "count": -2, "child": {"level": "High"}})
        );
    }

    #[test]
    fn test_display_reads_like_command_line() {
        assert_eq!(
            sample().to_string(),
            "{-name \"a b\" -count -2 -child {-level High}}"
        );
    }
}
