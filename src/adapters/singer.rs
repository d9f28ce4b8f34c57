use crate::domain::model::{ColumnSchema, Metric, MetricKind, Record};
use crate::domain::ports::Sink;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Write;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum SingerMessage<'a> {
    Schema {
        stream: &'a str,
        schema: Value,
        key_properties: &'a [String],
    },
    Record {
        stream: &'a str,
        record: &'a Record,
        time_extracted: DateTime<Utc>,
    },
    Delete {
        stream: &'a str,
        record: &'a Record,
        soft_delete: bool,
    },
    Metric {
        metric_type: MetricKind,
        metric: &'a str,
        value: u64,
        tags: &'a Map<String, Value>,
    },
    Meta {
        metadata: Map<String, Value>,
    },
}

/// Writes one Singer message per line to any `Write`, stdout in production.
pub struct SingerWriter<W: Write> {
    out: W,
}

impl SingerWriter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> SingerWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, message: &SingerMessage<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

fn json_schema(schema: &ColumnSchema) -> Value {
    let properties: Map<String, Value> = schema
        .iter()
        .map(|(name, column_type)| (name.to_string(), json!({"type": column_type.as_str()})))
        .collect();
    json!({"type": "object", "properties": properties})
}

impl<W: Write> Sink for SingerWriter<W> {
    fn emit_schema(&mut self, stream: &str, schema: &ColumnSchema, key_properties: &[String]) -> Result<()> {
        self.write(&SingerMessage::Schema {
            stream,
            schema: json_schema(schema),
            key_properties,
        })
    }

    fn emit_record(&mut self, stream: &str, record: &Record) -> Result<()> {
        self.write(&SingerMessage::Record {
            stream,
            record,
            time_extracted: Utc::now(),
        })
    }

    fn emit_delete(&mut self, stream: &str, key: &Record) -> Result<()> {
        self.write(&SingerMessage::Delete {
            stream,
            record: key,
            soft_delete: true,
        })
    }

    fn emit_metric(&mut self, metric: &Metric) -> Result<()> {
        self.write(&SingerMessage::Metric {
            metric_type: metric.metric_type,
            metric: &metric.metric,
            value: metric.value,
            tags: &metric.tags,
        })
    }

    fn emit_meta(&mut self, metadata: Map<String, Value>) -> Result<()> {
        self.write(&SingerMessage::Meta { metadata })
    }
}
