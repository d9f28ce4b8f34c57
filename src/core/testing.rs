//! Test doubles for the core layer: a scripted API client, a recording sink
//! and a backoff that records delays instead of sleeping.

use crate::domain::model::{ColumnSchema, Metric, PageRequest, Record};
use crate::domain::ports::{ApiClient, Backoff, Sink};
use crate::utils::error::{RequestError, Result};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

type Handler = Box<dyn Fn(&str, Option<PageRequest>) -> std::result::Result<Value, RequestError> + Send + Sync>;

pub struct MockClient {
    handler: Handler,
    calls: Mutex<Vec<(String, Option<PageRequest>)>>,
}

impl MockClient {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, Option<PageRequest>) -> std::result::Result<Value, RequestError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves a paginated collection of `total` records built by `make`.
    pub fn paged(total: usize, make: fn(usize) -> Value) -> Self {
        Self::new(move |_, page| {
            let page = page.unwrap_or(PageRequest::new(0, total));
            let end = (page.skip + page.take).min(total);
            let results: Vec<Value> = (page.skip.min(end)..end).map(make).collect();
            Ok(json!({"ResultCount": results.len(), "Results": results}))
        })
    }

    /// Returns the queued responses in order, then 500s.
    pub fn scripted(responses: Vec<std::result::Result<Value, RequestError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_, _| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(RequestError::Status { status: 500 }))
        })
    }

    pub fn failing_status(status: u16) -> Self {
        Self::new(move |_, _| Err(RequestError::Status { status }))
    }

    pub fn unauthorized() -> Self {
        Self::new(|_, _| Err(RequestError::InvalidCredentials))
    }

    pub fn calls(&self) -> Vec<(String, Option<PageRequest>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requested_pages(&self) -> Vec<Option<PageRequest>> {
        self.calls().into_iter().map(|(_, page)| page).collect()
    }
}

#[async_trait]
impl ApiClient for MockClient {
    async fn get_json(
        &self,
        path: &str,
        page: Option<PageRequest>,
    ) -> std::result::Result<Value, RequestError> {
        self.calls.lock().unwrap().push((path.to_string(), page));
        (self.handler)(path, page)
    }
}

pub fn paged_records(i: usize) -> Value {
    json!({"Id": i, "Name": format!("Constituent {}", i), "IsActive": true})
}

#[derive(Default)]
pub struct RecordingBackoff {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingBackoff {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backoff for RecordingBackoff {
    async fn wait(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Emitted {
    Schema {
        stream: String,
        columns: Vec<(String, &'static str)>,
        key_properties: Vec<String>,
    },
    Record {
        stream: String,
        record: Value,
    },
    Delete {
        stream: String,
        key: Value,
    },
    Metric(Metric),
    Meta(Value),
}

#[derive(Default)]
pub struct MockSink {
    pub events: Vec<Emitted>,
}

impl Sink for MockSink {
    fn emit_schema(&mut self, stream: &str, schema: &ColumnSchema, key_properties: &[String]) -> Result<()> {
        self.events.push(Emitted::Schema {
            stream: stream.to_string(),
            columns: schema.iter().map(|(n, t)| (n.to_string(), t.as_str())).collect(),
            key_properties: key_properties.to_vec(),
        });
        Ok(())
    }

    fn emit_record(&mut self, stream: &str, record: &Record) -> Result<()> {
        self.events.push(Emitted::Record {
            stream: stream.to_string(),
            record: Value::Object(record.data.clone()),
        });
        Ok(())
    }

    fn emit_delete(&mut self, stream: &str, key: &Record) -> Result<()> {
        self.events.push(Emitted::Delete {
            stream: stream.to_string(),
            key: Value::Object(key.data.clone()),
        });
        Ok(())
    }

    fn emit_metric(&mut self, metric: &Metric) -> Result<()> {
        self.events.push(Emitted::Metric(metric.clone()));
        Ok(())
    }

    fn emit_meta(&mut self, metadata: Map<String, Value>) -> Result<()> {
        self.events.push(Emitted::Meta(Value::Object(metadata)));
        Ok(())
    }
}
