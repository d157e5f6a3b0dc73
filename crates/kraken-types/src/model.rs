//! Model instances backed by a static schema table
//!
//! A [`ModelSchema`] is the immutable, shared list of fields for one model
//! type. A [`Model`] owns the current value of every one of those fields.
//! Values only change through [`Model::update`] and [`Model::set`], both of
//! which run each value through its field's [`check_value`](FieldSchema::check_value).
//!
//! # Example
//!
//! ```
//! use kraken_types::{FieldSchema, Location, Model, ModelSchema, Value};
//!
//! static TICKER: ModelSchema = ModelSchema::new(
//!     "TickerShowRequest",
//!     &[FieldSchema::char("pair").location(Location::Body)],
//! );
//!
//! let mut model = Model::new(&TICKER);
//! model.set("pair", "XBTUSD").unwrap();
//! assert_eq!(model.get("pair"), Some(&Value::from("XBTUSD")));
//! assert_eq!(model.to_wire(), serde_json::json!({ "pair": "XBTUSD" }));
//! ```

use std::cell::Cell;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{ModelError, ModelResult};
use crate::field::{FieldSchema, Location};
use crate::value::{RawMap, Value};

/// Static field table for one model type
#[derive(Debug)]
pub struct ModelSchema {
    name: &'static str,
    fields: &'static [FieldSchema],
}

impl ModelSchema {
    /// Declare a schema
    pub const fn new(name: &'static str, fields: &'static [FieldSchema]) -> Self {
        Self { name, fields }
    }

    /// Model type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order
    pub fn fields(&self) -> &'static [FieldSchema] {
        self.fields
    }

    /// Look up a field by its internal name
    pub fn field(&self, name: &str) -> Option<&'static FieldSchema> {
        self.fields.iter().find(|f| f.name() == name)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }
}

/// Field values for one request or response object
#[derive(Debug, Clone)]
pub struct Model {
    schema: &'static ModelSchema,
    /// One entry per schema field, same order
    values: Vec<Value>,
    original: RawMap,
    structure_verified: Cell<bool>,
}

impl Model {
    /// Create an instance with every field at its default
    ///
    /// No validation runs, so required fields without a default hold `Null`
    /// until they are set.
    pub fn new(schema: &'static ModelSchema) -> Self {
        Self {
            schema,
            values: schema.fields.iter().map(FieldSchema::default_value).collect(),
            original: Vec::new(),
            structure_verified: Cell::new(false),
        }
    }

    /// Create an instance from a raw mapping
    pub fn with_values<I, K>(schema: &'static ModelSchema, raw: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut model = Self::new(schema);
        model.update(raw)?;
        Ok(model)
    }

    /// Create an instance from a JSON object
    pub fn from_json(schema: &'static ModelSchema, raw: &JsonMap<String, JsonValue>) -> ModelResult<Self> {
        Self::with_values(
            schema,
            raw.iter().map(|(k, v)| (k.clone(), Value::from(v))),
        )
    }

    /// Re-derive every field value from `raw`
    ///
    /// Each field is looked up by its alias, falling back to its internal
    /// name, and fed through `check_value`; absent fields take their default
    /// value. On error the instance is left unchanged.
    pub fn update<I, K>(&mut self, raw: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let raw: RawMap = raw.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let values = self
            .schema
            .fields
            .iter()
            .map(|field| {
                let supplied = lookup(&raw, field.wire_name())
                    .or_else(|| lookup(&raw, field.name()))
                    .cloned();
                field.check_value(supplied.unwrap_or_else(|| field.default_value()))
            })
            .collect::<ModelResult<Vec<_>>>()?;

        self.values = values;
        self.original = raw;
        Ok(())
    }

    /// Update from a JSON object
    pub fn update_json(&mut self, raw: &JsonMap<String, JsonValue>) -> ModelResult<()> {
        self.update(raw.iter().map(|(k, v)| (k.clone(), Value::from(v))))
    }

    pub fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    /// The raw mapping last passed to `update`
    pub fn original(&self) -> &RawMap {
        &self.original
    }

    /// Current value of a field, or `None` if the field is not declared
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema.index_of(field).map(|i| &self.values[i])
    }

    /// One field rendered in wire shape
    pub fn get_wire(&self, field: &str) -> Option<JsonValue> {
        self.get(field).map(Value::to_wire)
    }

    /// Validate and store a field value
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> ModelResult<()> {
        let index = self
            .schema
            .index_of(field)
            .ok_or_else(|| ModelError::unknown_field(self.schema.name, field))?;
        let checked = self.schema.fields[index].check_value(value.into())?;
        self.values[index] = checked;
        Ok(())
    }

    /// Reset a field to the absence marker
    pub fn unset(&mut self, field: &str) -> ModelResult<()> {
        let index = self
            .schema
            .index_of(field)
            .ok_or_else(|| ModelError::unknown_field(self.schema.name, field))?;
        self.values[index] = Value::Null;
        Ok(())
    }

    /// Render the whole model in wire shape
    ///
    /// Optional fields holding `Null` are omitted. Required fields holding
    /// `Null` emit their declared default if one exists, else `null`.
    pub fn to_wire(&self) -> JsonValue {
        let mut out = JsonMap::new();
        for (field, value) in self.entries() {
            let rendered = match value {
                Value::Null if field.is_required() => field
                    .declared_default()
                    .map(|d| d.to_wire())
                    .unwrap_or(JsonValue::Null),
                Value::Null => continue,
                other => other.to_wire(),
            };
            out.insert(field.wire_name().to_string(), rendered);
        }
        JsonValue::Object(out)
    }

    /// Non-null fields placed at `location`, keyed by wire name
    ///
    /// Fields without a location count as body data.
    pub fn properties_in(&self, location: Location) -> JsonMap<String, JsonValue> {
        self.entries()
            .filter(|(field, value)| field.location_of().belongs_to(location) && !value.is_null())
            .map(|(field, value)| (field.wire_name().to_string(), value.to_wire()))
            .collect()
    }

    /// Iterate `(field, value)` pairs in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&'static FieldSchema, &Value)> {
        self.schema.fields.iter().zip(self.values.iter())
    }

    /// Whether the one-time structure verification already passed
    pub fn structure_verified(&self) -> bool {
        self.structure_verified.get()
    }

    /// Record that structure verification passed
    pub fn mark_structure_verified(&self) {
        self.structure_verified.set(true);
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.values == other.values
    }
}

fn lookup<'a>(raw: &'a RawMap, key: &str) -> Option<&'a Value> {
    raw.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
