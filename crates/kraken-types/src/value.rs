//! Dynamic field values
//!
//! [`Value`] is both the raw input accepted by a field and the canonical
//! value a field stores after [`FieldSchema::check_value`](crate::FieldSchema::check_value).
//! Decimal quantities are always held as [`Decimal`], never as binary floats.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::model::Model;

/// Raw key-value input, in the order it was supplied
pub type RawMap = Vec<(String, Value)>;

/// A field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence marker
    Null,
    Bool(bool),
    /// Integer input (coerced by decimal fields)
    Int(i64),
    /// Floating-point input (coerced by decimal fields)
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    List(Vec<Value>),
    /// Unvalidated mapping, e.g. the raw input for a nested model
    Map(RawMap),
    /// Validated nested model
    Model(Box<Model>),
}

impl Value {
    /// Check if this is the absence marker
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the text content, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the decimal content, if this is a decimal value
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the boolean content, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the nested model, if this is a model value
    pub fn as_model(&self) -> Option<&Model> {
        match self {
            Self::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Get the elements, if this is a list value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Model(_) => "model",
        }
    }

    /// Render this value in wire shape
    ///
    /// Decimals become exact decimal text, booleans become `"true"`/`"false"`,
    /// nested models become their own wire shape and `Null` list elements are
    /// dropped.
    pub fn to_wire(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::String(b.to_string()),
            Self::Int(i) => JsonValue::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Decimal(d) => JsonValue::String(d.to_string()),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => {
                JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::List(items) => JsonValue::Array(
                items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(Value::to_wire)
                    .collect(),
            ),
            Self::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_wire()))
                    .collect(),
            ),
            Self::Model(m) => m.to_wire(),
        }
    }
}

/// Parse decimal text without losing precision
///
/// Plain notation is parsed exactly; scientific notation is accepted as a
/// fallback.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str_exact(text)
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Convert a float through its shortest round-trip text
///
/// `0.1_f64` becomes exactly `0.1`, not the binary expansion.
pub fn decimal_from_f64(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    Decimal::from_str(&f.to_string()).ok()
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                let text = n.to_string();
                match parse_decimal(&text) {
                    Some(d) => Self::Decimal(d),
                    None => n.as_f64().map(Self::Float).unwrap_or(Self::Text(text)),
                }
            }
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Self::from(&json)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Self::Decimal(Decimal::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Model> for Value {
    fn from(m: Model) -> Self {
        Self::Model(Box::new(m))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}
