//! Minimal record serializer built on the field pruner.
//!
//! A [`Schema`] is an ordered field list. Serializing a JSON record walks
//! the pruned fields and hands each nested schema the narrowed context of
//! the field that wraps it.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::pruner::{prune_fields, FieldDescriptor};
use crate::types::MaskContext;

/// What a field produces.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Copied from the record as-is.
    Value,
    /// A nested object written by another schema.
    Object(Arc<Schema>),
    /// A list of nested objects written by another schema.
    Many(Arc<Schema>),
}

#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

impl FieldDescriptor for Field {
    fn field_name(&self) -> &str {
        &self.name
    }
}

/// Ordered field list for one record type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain value field.
    pub fn value(mut self, name: impl Into<String>) -> Self {
        self.fields.push(Field::new(name, FieldKind::Value));
        self
    }

    /// Add a nested object field.
    pub fn object(mut self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.fields.push(Field::new(name, FieldKind::Object(schema)));
        self
    }

    /// Add a nested list-of-objects field.
    pub fn many(mut self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.fields.push(Field::new(name, FieldKind::Many(schema)));
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Serialize one record under `ctx`.
    ///
    /// Missing attributes serialize as `null`, as do nested objects whose
    /// value is not an object (or list, for [`FieldKind::Many`]).
    pub fn serialize(&self, record: &Value, ctx: &MaskContext) -> Value {
        let mut result = Map::new();

        for pruned in prune_fields(&self.fields, ctx) {
            let field = pruned.field;
            let raw = record.get(field.name()).unwrap_or(&Value::Null);

            let value = match field.kind() {
                FieldKind::Value => raw.clone(),
                FieldKind::Object(schema) => match raw {
                    Value::Object(_) => schema.serialize(raw, &pruned.context),
                    _ => Value::Null,
                },
                FieldKind::Many(schema) => match raw {
                    Value::Array(items) => schema.serialize_many(items, &pruned.context),
                    _ => Value::Null,
                },
            };
            result.insert(field.name().to_string(), value);
        }

        Value::Object(result)
    }

    /// Serialize a list of records, every one under the same context.
    pub fn serialize_many(&self, records: &[Value], ctx: &MaskContext) -> Value {
        Value::Array(
            records
                .iter()
                .map(|record| self.serialize(record, ctx))
                .collect(),
        )
    }
}
