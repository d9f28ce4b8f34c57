use crate::core::fetcher::decode_page;
use crate::domain::model::{CollectionDescriptor, ColumnSchema, ColumnType, PageRequest, Record};
use crate::domain::ports::ApiClient;
use crate::utils::error::Result;
use serde_json::Value;

/// Column type for one sampled value. `null` falls back to `string`: a column
/// sampled as null stays a string column for the rest of the run.
pub fn infer_type(value: &Value) -> ColumnType {
    match value {
        Value::Null | Value::String(_) => ColumnType::String,
        Value::Bool(_) => ColumnType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => ColumnType::Integer,
        Value::Number(_) => ColumnType::Float,
        Value::Array(_) => ColumnType::Array,
        Value::Object(_) => ColumnType::Object,
    }
}

pub fn schema_from_sample(sample: &Record) -> ColumnSchema {
    sample
        .data
        .iter()
        .map(|(name, value)| (name.as_str(), infer_type(value)))
        .collect()
}

/// Sample the first record of a collection with a single `skip=0&take=1` request
/// and derive its columns. An empty collection yields an empty schema.
///
/// The sample request is not retried; a failure here aborts the collection.
pub async fn infer_schema<C: ApiClient>(
    client: &C,
    collection: &CollectionDescriptor,
) -> Result<ColumnSchema> {
    let body = client
        .get_json(collection.api_path, Some(PageRequest::new(0, 1)))
        .await?;
    let page = decode_page(body, collection.paginated);

    let schema = page
        .results
        .first()
        .map(schema_from_sample)
        .unwrap_or_default();

    if schema.is_empty() {
        tracing::debug!("{}: no sample record, schema has no columns", collection.name);
    }

    Ok(schema)
}
