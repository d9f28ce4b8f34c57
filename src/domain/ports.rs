use crate::domain::model::{ColumnSchema, Metric, PageRequest, Record};
use crate::utils::error::{RequestError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Paged HTTP GET against the upstream API. One call is one attempt; retrying
/// is the caller's business.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `page = None` sends the bare path without `skip`/`take`.
    async fn get_json(
        &self,
        path: &str,
        page: Option<PageRequest>,
    ) -> std::result::Result<Value, RequestError>;
}

/// Downstream consumer of schema, record, delete, metric and meta directives.
pub trait Sink {
    fn emit_schema(
        &mut self,
        stream: &str,
        schema: &ColumnSchema,
        key_properties: &[String],
    ) -> Result<()>;

    fn emit_record(&mut self, stream: &str, record: &Record) -> Result<()>;

    /// Always a soft delete: the sink marks the row inactive.
    fn emit_delete(&mut self, stream: &str, key: &Record) -> Result<()>;

    fn emit_metric(&mut self, metric: &Metric) -> Result<()>;

    fn emit_meta(&mut self, metadata: Map<String, Value>) -> Result<()>;
}

/// Schedules the pause between retry attempts.
#[async_trait]
pub trait Backoff: Send + Sync {
    async fn wait(&self, delay: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackoff;

#[async_trait]
impl Backoff for TokioBackoff {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
