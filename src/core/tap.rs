use crate::core::catalog::Catalog;
use crate::core::fetcher::{PagedFetcher, RetryPolicy};
use crate::core::normalize::normalize;
use crate::core::schema::infer_schema;
use crate::domain::model::{CollectionDescriptor, ColumnSchema, Metric, Record, SyncRun, ID_COLUMN};
use crate::domain::ports::{ApiClient, Backoff, Sink, TokioBackoff};
use crate::utils::error::Result;
use serde_json::{json, Map, Value};

/// Collection probed by the connectivity check; every account has addresses.
pub const CONNECTION_PROBE_PATH: &str = "addresses";

/// Drives schema emission, paged fetch, normalization and replace-style
/// emission for each collection. Collaborators are injected, nothing is global.
pub struct BloomerangTap<C: ApiClient, S: Sink, B: Backoff = TokioBackoff> {
    client: C,
    sink: S,
    backoff: B,
    catalog: Catalog,
    retry: RetryPolicy,
}

impl<C: ApiClient, S: Sink, B: Backoff> BloomerangTap<C, S, B> {
    pub fn new(client: C, sink: S, backoff: B, catalog: Catalog, retry: RetryPolicy) -> Self {
        Self {
            client,
            sink,
            backoff,
            catalog,
            retry,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Single unretried probe. Any failure, 401 included, is `false`.
    pub async fn test_connection(&self) -> bool {
        match self.client.get_json(CONNECTION_PROBE_PATH, None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Connection test failed: {}", e);
                false
            }
        }
    }

    /// Runs the connectivity check and reports it as `{test_result: bool}`.
    pub async fn check(&mut self) -> Result<bool> {
        let ok = self.test_connection().await;
        self.sink.emit_meta(meta("test_result", json!(ok)))?;
        Ok(ok)
    }

    pub fn list_tables(&mut self) -> Result<Vec<&'static str>> {
        emit_tables(&self.catalog, &mut self.sink)
    }

    /// Emit schemas (and unique-key meta) for the selected collections, no records.
    pub async fn discover(&mut self, selection: Option<&[String]>) -> Result<Vec<ColumnSchema>> {
        tracing::debug!("Starting discover for tap Bloomerang");
        let collections = self.selected(selection)?;

        let mut schemas = Vec::with_capacity(collections.len());
        for collection in &collections {
            schemas.push(self.announce_schema(collection).await?);
        }
        Ok(schemas)
    }

    /// Sync the selected collections in catalog order. The first failure ends the run.
    pub async fn sync(&mut self, selection: Option<&[String]>) -> Result<Vec<SyncRun>> {
        tracing::debug!("Starting sync for tap Bloomerang");
        let collections = self.selected(selection)?;

        let mut runs = Vec::with_capacity(collections.len());
        for collection in &collections {
            runs.push(self.sync_collection(collection).await?);
        }
        Ok(runs)
    }

    pub async fn sync_collection(&mut self, collection: &CollectionDescriptor) -> Result<SyncRun> {
        let schema = self.announce_schema(collection).await?;
        let replace = schema.contains(ID_COLUMN);

        tracing::debug!("Starting sync for {}", collection.name);

        let fetcher = PagedFetcher::new(&self.client, &self.backoff, self.retry);
        let mut pages = fetcher.fetch_all(collection);
        let mut total_records = 0;

        while let Some(page) = pages.next_page().await? {
            let records: Vec<Record> = page
                .results
                .iter()
                .map(|raw| normalize(raw, &schema))
                .collect();

            emit_page(&mut self.sink, collection.name, &records, replace)?;
            total_records += records.len();
        }

        let run = SyncRun {
            collection: collection.name.to_string(),
            total_records,
        };
        self.sink.emit_metric(&Metric::record_count(&run))?;

        tracing::debug!(
            "Finished sync for {} ({} records, {} pages)",
            collection.name,
            total_records,
            pages.pages_fetched()
        );
        Ok(run)
    }

    async fn announce_schema(&mut self, collection: &CollectionDescriptor) -> Result<ColumnSchema> {
        tracing::debug!("Writing schema for {}", collection.name);
        let schema = infer_schema(&self.client, collection).await?;

        let key_properties = schema.unique_keys();
        if !key_properties.is_empty() {
            self.sink
                .emit_meta(meta("unique_keys", json!(key_properties)))?;
        }
        self.sink
            .emit_schema(collection.name, &schema, &key_properties)?;

        Ok(schema)
    }

    fn selected(&self, selection: Option<&[String]>) -> Result<Vec<CollectionDescriptor>> {
        Ok(self
            .catalog
            .select(selection)?
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Emits `{tables: [...]}` for the whole catalog. Needs no credentials.
pub fn emit_tables<S: Sink>(catalog: &Catalog, sink: &mut S) -> Result<Vec<&'static str>> {
    let tables = catalog.names();
    sink.emit_meta(meta("tables", json!(tables)))?;
    Ok(tables)
}

// 先刪後寫：同一頁的所有 delete 都在 insert 之前
fn emit_page<S: Sink>(sink: &mut S, stream: &str, records: &[Record], replace: bool) -> Result<()> {
    if replace {
        for record in records {
            let id = record.get(ID_COLUMN).cloned().unwrap_or(Value::Null);
            let key = Record::new(meta(ID_COLUMN, id));
            sink.emit_delete(stream, &key)?;
        }
    }

    for record in records {
        sink.emit_record(stream, record)?;
    }
    Ok(())
}

fn meta(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}
