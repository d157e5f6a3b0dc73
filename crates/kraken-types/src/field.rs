//! Typed field descriptors
//!
//! A [`FieldSchema`] describes one named field of a model: its kind, where
//! its value goes in an outgoing request, its wire alias, whether it is
//! required, and its default. Schemas are plain `const` data so a model's
//! field table can live in a `static`.
//!
//! # Example
//!
//! ```
//! use kraken_types::{FieldSchema, Location, Value};
//! use rust_decimal::Decimal;
//!
//! const COUNT: FieldSchema = FieldSchema::decimal("count")
//!     .min(Decimal::ONE)
//!     .max(Decimal::ONE_THOUSAND)
//!     .location(Location::Query);
//!
//! assert_eq!(COUNT.check_value(Value::from("25")).unwrap(), Value::from(Decimal::from(25)));
//! assert!(COUNT.check_value(Value::from(0)).is_err());
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, ModelSchema};
use crate::value::{decimal_from_f64, parse_decimal, Value};

/// Where a field's value is placed in an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Query,
    Body,
    Header,
    Path,
    Files,
    /// Unspecified; treated as body data
    None,
}

impl Location {
    /// Lowercase name of the location
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
            Self::Path => "path",
            Self::Files => "files",
            Self::None => "none",
        }
    }

    /// Check if a field declared at `self` belongs to the `group` partition
    pub fn belongs_to(&self, group: Location) -> bool {
        *self == group || (group == Location::Body && *self == Location::None)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field kind, with kind-specific constraints
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Text, optionally restricted to an enumerated set
    Char {
        values: Option<&'static [&'static str]>,
    },
    /// Exact decimal with optional inclusive bounds
    Decimal {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    Bool,
    Date,
    DateTime,
    /// Pass-through identifier
    Uuid,
    /// Pass-through file attachment
    File,
    /// Sequence whose elements are checked against the inner kind
    List(&'static FieldKind),
    /// Nested model
    Model(&'static ModelSchema),
}

impl FieldKind {
    /// Short name of the kind, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Char { .. } => "CharField",
            Self::Decimal { .. } => "DecimalField",
            Self::Bool => "BoolField",
            Self::Date => "DateField",
            Self::DateTime => "DateTimeField",
            Self::Uuid => "UuidField",
            Self::File => "FileField",
            Self::List(_) => "ListField",
            Self::Model(_) => "ChildModelField",
        }
    }
}

/// Declared default for a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Text(&'static str),
    Decimal(Decimal),
    Bool(bool),
}

impl DefaultValue {
    /// Convert to a stored value
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(s) => Value::Text((*s).to_string()),
            Self::Decimal(d) => Value::Decimal(*d),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Immutable descriptor for one named field
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    name: &'static str,
    kind: FieldKind,
    location: Location,
    alias: Option<&'static str>,
    required: bool,
    default: Option<DefaultValue>,
}

impl FieldSchema {
    const fn with_kind(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            location: Location::None,
            alias: None,
            required: false,
            default: None,
        }
    }

    /// Free-form text field
    pub const fn char(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Char { values: None })
    }

    /// Text field restricted to `values`
    pub const fn enumerated(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::with_kind(
            name,
            FieldKind::Char {
                values: Some(values),
            },
        )
    }

    /// Decimal field
    pub const fn decimal(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Decimal { min: None, max: None })
    }

    /// Boolean field
    pub const fn bool(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Bool)
    }

    /// Calendar date field
    pub const fn date(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Date)
    }

    /// UTC timestamp field
    pub const fn datetime(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::DateTime)
    }

    /// Identifier field
    pub const fn uuid(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Uuid)
    }

    /// File attachment field, placed in the `files` group
    pub const fn file(name: &'static str) -> Self {
        Self {
            location: Location::Files,
            ..Self::with_kind(name, FieldKind::File)
        }
    }

    /// Sequence field whose elements have kind `item`
    pub const fn list(name: &'static str, item: &'static FieldKind) -> Self {
        Self::with_kind(name, FieldKind::List(item))
    }

    /// Nested model field
    pub const fn model(name: &'static str, schema: &'static ModelSchema) -> Self {
        Self::with_kind(name, FieldKind::Model(schema))
    }

    /// Mark the field required
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Set the external wire name
    pub const fn alias(self, alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..self
        }
    }

    /// Set the request location
    pub const fn location(self, location: Location) -> Self {
        Self { location, ..self }
    }

    /// Set the inclusive minimum (decimal fields only)
    pub const fn min(self, min: Decimal) -> Self {
        let kind = match self.kind {
            FieldKind::Decimal { max, .. } => FieldKind::Decimal {
                min: Some(min),
                max,
            },
            other => other,
        };
        Self { kind, ..self }
    }

    /// Set the inclusive maximum (decimal fields only)
    pub const fn max(self, max: Decimal) -> Self {
        let kind = match self.kind {
            FieldKind::Decimal { min, .. } => FieldKind::Decimal {
                min,
                max: Some(max),
            },
            other => other,
        };
        Self { kind, ..self }
    }

    /// Set a text default
    pub const fn default_text(self, value: &'static str) -> Self {
        Self {
            default: Some(DefaultValue::Text(value)),
            ..self
        }
    }

    /// Set a decimal default
    ///
    /// On a text field the default is stored as its decimal text.
    pub const fn default_decimal(self, value: Decimal) -> Self {
        Self {
            default: Some(DefaultValue::Decimal(value)),
            ..self
        }
    }

    /// Set a boolean default
    pub const fn default_bool(self, value: bool) -> Self {
        Self {
            default: Some(DefaultValue::Bool(value)),
            ..self
        }
    }

    /// Internal field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name used on the wire: the alias if set, else the field name
    pub fn wire_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    pub fn alias_name(&self) -> Option<&'static str> {
        self.alias
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn location_of(&self) -> Location {
        self.location
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The declared default, coerced to the field's storage form
    ///
    /// Text fields store non-text defaults as text.
    pub fn declared_default(&self) -> Option<Value> {
        let default = self.default?;
        Some(match (&self.kind, default) {
            (FieldKind::Char { .. }, DefaultValue::Decimal(d)) => Value::Text(d.to_string()),
            (FieldKind::Char { .. }, DefaultValue::Bool(b)) => Value::Text(b.to_string()),
            (_, d) => d.to_value(),
        })
    }

    /// Value used when the field is absent from the input
    ///
    /// Lists default to an empty sequence and nested models to a freshly
    /// constructed child; other kinds use the declared default or `Null`.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::List(_) => Value::List(Vec::new()),
            FieldKind::Model(schema) => Value::Model(Box::new(Model::new(schema))),
            _ => self.declared_default().unwrap_or(Value::Null),
        }
    }

    /// Required-ness check applied to an already canonical value
    pub fn validate(&self, value: &Value) -> ModelResult<()> {
        if self.required && value.is_null() {
            return Err(ModelError::invalid(
                self.name,
                value,
                format!("{} is required", self.kind.name()),
            ));
        }
        Ok(())
    }

    /// Validate `raw` and return the canonical stored value
    ///
    /// Re-applying this to its own output yields the same value.
    pub fn check_value(&self, raw: Value) -> ModelResult<Value> {
        if raw.is_null() {
            self.validate(&raw)?;
            return Ok(Value::Null);
        }
        check_kind(self.name, &self.kind, raw)
    }
}

fn check_kind(field: &str, kind: &FieldKind, raw: Value) -> ModelResult<Value> {
    match kind {
        FieldKind::Char { values } => check_char(field, *values, raw),
        FieldKind::Decimal { min, max } => check_decimal(field, *min, *max, raw),
        FieldKind::Bool => check_bool(field, raw),
        FieldKind::Date => check_date(field, raw),
        FieldKind::DateTime => check_datetime(field, raw),
        FieldKind::Uuid | FieldKind::File => Ok(raw),
        FieldKind::List(item) => match raw {
            Value::List(items) => items
                .into_iter()
                .map(|v| {
                    if v.is_null() {
                        Ok(Value::Null)
                    } else {
                        check_kind(field, item, v)
                    }
                })
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::List),
            other => Err(ModelError::invalid(field, &other, "expected a list")),
        },
        FieldKind::Model(schema) => match raw {
            Value::Model(m) if m.schema().name() == schema.name() => Ok(Value::Model(m)),
            Value::Map(entries) => Ok(Value::Model(Box::new(Model::with_values(
                schema, entries,
            )?))),
            other => Err(ModelError::invalid(
                field,
                &other,
                format!("expected a mapping for {}", schema.name()),
            )),
        },
    }
}

fn check_char(field: &str, values: Option<&'static [&'static str]>, raw: Value) -> ModelResult<Value> {
    let text = match raw {
        Value::Text(s) => s,
        Value::Int(i) => i.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Float(f) => match decimal_from_f64(f) {
            Some(d) => d.to_string(),
            None => return Err(ModelError::invalid(field, f, "not a finite number")),
        },
        Value::Bool(b) => b.to_string(),
        other => return Err(ModelError::invalid(field, &other, "expected text")),
    };

    if let Some(allowed) = values {
        if !allowed.contains(&text.as_str()) {
            return Err(ModelError::invalid(
                field,
                &text,
                format!("expected one of {:?}", allowed),
            ));
        }
    }
    Ok(Value::Text(text))
}

fn check_decimal(
    field: &str,
    min: Option<Decimal>,
    max: Option<Decimal>,
    raw: Value,
) -> ModelResult<Value> {
    let value = match &raw {
        Value::Decimal(d) => Some(*d),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::Float(f) => decimal_from_f64(*f),
        Value::Text(s) => parse_decimal(s),
        Value::DateTime(dt) => Some(epoch_seconds(dt)),
        _ => None,
    };
    let Some(value) = value else {
        return Err(ModelError::invalid(field, &raw, "expected a decimal"));
    };

    if let Some(min) = min {
        if value < min {
            return Err(ModelError::invalid(
                field,
                value,
                format!("below minimum {}", min),
            ));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ModelError::invalid(
                field,
                value,
                format!("above maximum {}", max),
            ));
        }
    }
    Ok(Value::Decimal(value))
}

fn check_bool(field: &str, raw: Value) -> ModelResult<Value> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Text(ref s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
        Value::Text(ref s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        other => Err(ModelError::invalid(field, &other, "expected a boolean")),
    }
}

fn check_date(field: &str, raw: Value) -> ModelResult<Value> {
    match raw {
        Value::Date(d) => Ok(Value::Date(d)),
        Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
        Value::Text(ref s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).date_naive())
            })
            .map(Value::Date)
            .ok_or_else(|| ModelError::invalid(field, s, "expected a YYYY-MM-DD date")),
        other => Err(ModelError::invalid(field, &other, "expected a date")),
    }
}

fn check_datetime(field: &str, raw: Value) -> ModelResult<Value> {
    let parsed = match &raw {
        Value::DateTime(dt) => Some(*dt),
        Value::Date(d) => Some(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))),
        Value::Text(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
        Value::Decimal(d) => from_epoch_seconds(*d),
        _ => None,
    };
    parsed
        .map(Value::DateTime)
        .ok_or_else(|| ModelError::invalid(field, &raw, "expected a timestamp"))
}

/// Seconds since the Unix epoch, with microsecond precision
fn epoch_seconds(dt: &DateTime<Utc>) -> Decimal {
    Decimal::new(dt.timestamp_micros(), 6).normalize()
}

fn from_epoch_seconds(secs: Decimal) -> Option<DateTime<Utc>> {
    let whole = secs.trunc();
    let nanos = ((secs - whole) * Decimal::from(1_000_000_000)).trunc();
    DateTime::from_timestamp(whole.to_i64()?, nanos.to_u32()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SIDE: FieldSchema = FieldSchema::enumerated("type", &["buy", "sell"]).required();
    const PRICE: FieldSchema = FieldSchema::decimal("price")
        .min(Decimal::ZERO)
        .max(Decimal::ONE_THOUSAND);

    fn samples() -> Vec<(FieldSchema, Value)> {
        vec![
            (FieldSchema::char("pair"), Value::from("XBTUSD")),
            (SIDE, Value::from("sell")),
            (PRICE, Value::from("12.50")),
            (PRICE, Value::from(7.25)),
            (FieldSchema::bool("trades"), Value::from("TRUE")),
            (FieldSchema::date("day"), Value::from("2023-07-06")),
            (FieldSchema::datetime("at"), Value::from(1688671834)),
            (
                FieldSchema::list("ids", &FieldKind::Decimal { min: None, max: None }),
                Value::from(vec!["1", "2.5"]),
            ),
        ]
    }

    #[test]
    fn test_check_value_is_idempotent() {
        for (field, raw) in samples() {
            let once = field.check_value(raw).unwrap();
            let twice = field.check_value(once.clone()).unwrap();
            assert_eq!(once, twice, "{} not idempotent", field.name());
        }
    }

    #[test]
    fn test_decimal_coercions_agree() {
        let from_int = PRICE.check_value(Value::from(3)).unwrap();
        let from_text = PRICE.check_value(Value::from("3")).unwrap();
        let from_float = PRICE.check_value(Value::from(3.0)).unwrap();
        assert_eq!(from_int, from_text);
        assert_eq!(from_int, from_float);
    }

    #[test]
    fn test_decimal_preserves_precision() {
        let v = PRICE.check_value(Value::from("0.1")).unwrap();
        assert_eq!(v, Value::Decimal(dec!(0.1)));
        let v = PRICE.check_value(Value::from(0.1)).unwrap();
        assert_eq!(v, Value::Decimal(dec!(0.1)));
    }

    #[test]
    fn test_decimal_bounds_are_inclusive() {
        assert!(PRICE.check_value(Value::from(0)).is_ok());
        assert!(PRICE.check_value(Value::from(1000)).is_ok());
        assert!(PRICE.check_value(Value::from("-0.01")).is_err());
        assert!(PRICE.check_value(Value::from("1000.01")).is_err());
    }

    #[test]
    fn test_decimal_from_timestamp() {
        let dt = DateTime::from_timestamp(1688671834, 500_000_000).unwrap();
        let v = FieldSchema::decimal("since").check_value(Value::from(dt)).unwrap();
        assert_eq!(v, Value::Decimal(dec!(1688671834.5)));
    }

    #[test]
    fn test_decimal_bounds_apply_to_converted_timestamp() {
        let field = FieldSchema::decimal("since").max(Decimal::ONE_THOUSAND);
        let dt = DateTime::from_timestamp(1688671834, 0).unwrap();
        assert!(field.check_value(Value::from(dt)).is_err());
    }

    #[test]
    fn test_enumerated_rejects_unknown() {
        let err = SIDE.check_value(Value::from("hold")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { .. }));
    }

    #[test]
    fn test_required_rejects_null() {
        assert!(SIDE.check_value(Value::Null).is_err());
        assert_eq!(FieldSchema::char("pair").check_value(Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_default_values() {
        let list = FieldSchema::list("ids", &FieldKind::Bool);
        assert_eq!(list.default_value(), Value::List(vec![]));

        let aclass = FieldSchema::char("aclass").default_text("currency");
        assert_eq!(aclass.default_value(), Value::from("currency"));

        let limit = FieldSchema::char("limit").default_decimal(dec!(500));
        assert_eq!(limit.default_value(), Value::from("500"));

        assert!(FieldSchema::char("pair").default_value().is_null());
    }

    #[test]
    fn test_location_partition() {
        assert!(Location::None.belongs_to(Location::Body));
        assert!(Location::Body.belongs_to(Location::Body));
        assert!(!Location::None.belongs_to(Location::Query));
        assert_eq!(FieldSchema::file("doc").location_of(), Location::Files);
    }

    #[test]
    fn test_alias_wire_name() {
        let field = FieldSchema::char("transaction_id").alias("txid");
        assert_eq!(field.wire_name(), "txid");
        assert_eq!(FieldSchema::char("pair").wire_name(), "pair");
    }
}
