use crate::domain::model::{ColumnSchema, Record};
use serde_json::{Map, Value};

/// Reshape a raw record to exactly the schema's columns, in schema order.
/// Fields outside the schema are dropped; schema columns the record lacks are null.
pub fn normalize(raw: &Record, schema: &ColumnSchema) -> Record {
    let data: Map<String, Value> = schema
        .names()
        .map(|name| {
            let value = raw.get(name).cloned().unwrap_or(Value::Null);
            (name.to_string(), value)
        })
        .collect();

    Record::new(data)
}
