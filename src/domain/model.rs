use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column name Bloomerang uses for entity identifiers.
pub const ID_COLUMN: &str = "Id";

/// One entry of the collection catalog: a logical name bound to an API path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDescriptor {
    pub name: &'static str,
    pub api_path: &'static str,
    pub paginated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Timestamp,
    TimestampTz,
}

impl ColumnType {
    /// Type name written into SCHEMA messages. Arrays and objects share `json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Array | ColumnType::Object => "json",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestamp-tz",
        }
    }
}

/// Ordered column-name → type mapping. Order follows the sampled record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<(String, ColumnType)>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同名欄位會覆寫型別，但保留原本的位置
    pub fn insert(&mut self, name: impl Into<String>, column_type: ColumnType) {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = column_type,
            None => self.columns.push((name, column_type)),
        }
    }

    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, column_type)| *column_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `["Id"]` when the collection exposes an `Id` column, otherwise empty.
    pub fn unique_keys(&self) -> Vec<String> {
        if self.contains(ID_COLUMN) {
            vec![ID_COLUMN.to_string()]
        } else {
            Vec::new()
        }
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        let mut schema = ColumnSchema::new();
        for (name, column_type) in iter {
            schema.insert(name, column_type);
        }
        schema
    }
}

/// A single API entity, raw or normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Offset window of one page request (`skip` / `take` query parameters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: usize,
    pub take: usize,
}

impl PageRequest {
    pub fn new(skip: usize, take: usize) -> Self {
        Self { skip, take }
    }

    /// Window of the 1-indexed page `page` at a fixed page size.
    pub fn nth(page: usize, page_size: usize) -> Self {
        Self::new(page_size * page.saturating_sub(1), page_size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub results: Vec<Record>,
    /// Number of records decoded from this page.
    pub result_count: usize,
    /// The upstream `ResultCount` field, cast to an integer. `None` for unpaginated bodies.
    pub reported_count: Option<i64>,
    pub has_more: bool,
}

/// Per-collection totals kept only for the closing metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRun {
    pub collection: String,
    pub total_records: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub metric_type: MetricKind,
    pub metric: String,
    pub value: u64,
    pub tags: Map<String, Value>,
}

impl Metric {
    pub fn record_count(run: &SyncRun) -> Self {
        let mut tags = Map::new();
        tags.insert("table".to_string(), Value::String(run.collection.clone()));
        Self {
            metric_type: MetricKind::Counter,
            metric: "record_count".to_string(),
            value: run.total_records as u64,
            tags,
        }
    }
}
