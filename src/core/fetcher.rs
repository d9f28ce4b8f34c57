use crate::domain::model::{CollectionDescriptor, PageRequest, PageResult, Record};
use crate::domain::ports::{ApiClient, Backoff};
use crate::utils::error::{Result, TapError};
use serde_json::Value;
use std::time::Duration;

/// Fixed page size used for every paginated collection.
pub const RECORDS_PER_PAGE: usize = 50;

/// Bounded retry applied to each individual page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

/// `addresses?skip=50&take=50`, used in logs and errors.
pub fn request_uri(path: &str, page: Option<PageRequest>) -> String {
    match page {
        Some(page) => format!("{}?skip={}&take={}", path, page.skip, page.take),
        None => path.to_string(),
    }
}

/// Turn a decoded response body into a page.
///
/// Paginated bodies look like `{"Results": [...], "ResultCount": n}`. Anything
/// else is treated as the whole collection: an array is its elements, a bare
/// object is one record.
pub fn decode_page(body: Value, paginated: bool) -> PageResult {
    if !paginated {
        let elements = match body {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        let result_count = elements.len();
        return PageResult {
            results: into_records(elements),
            result_count,
            reported_count: None,
            has_more: false,
        };
    }

    let (elements, reported) = match body {
        Value::Object(mut map) => {
            let reported = cast_result_count(map.get("ResultCount"));
            let elements = match map.remove("Results") {
                Some(Value::Array(items)) => items,
                _ => {
                    tracing::warn!("Paged response has no Results array, treating it as empty");
                    Vec::new()
                }
            };
            (elements, reported)
        }
        other => {
            tracing::warn!("Expected a paged object but got: {}", other);
            (Vec::new(), 0)
        }
    };

    let result_count = elements.len();
    let has_more = result_count >= RECORDS_PER_PAGE && reported >= RECORDS_PER_PAGE as i64;

    PageResult {
        results: into_records(elements),
        result_count,
        reported_count: Some(reported),
        has_more,
    }
}

// 寬鬆轉型：數字字串也接受，缺值或無法解析視為 0
fn cast_result_count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn into_records(elements: Vec<Value>) -> Vec<Record> {
    elements
        .into_iter()
        .filter_map(|element| match element {
            Value::Object(map) => Some(Record::new(map)),
            other => {
                tracing::warn!("Skipping non-object element: {}", other);
                None
            }
        })
        .collect()
}

pub struct PagedFetcher<'a, C: ApiClient, B: Backoff> {
    client: &'a C,
    backoff: &'a B,
    policy: RetryPolicy,
}

impl<'a, C: ApiClient, B: Backoff> PagedFetcher<'a, C, B> {
    pub fn new(client: &'a C, backoff: &'a B, policy: RetryPolicy) -> Self {
        Self {
            client,
            backoff,
            policy,
        }
    }

    /// GET with the retry policy. Exhausting it returns the last failure.
    pub async fn request_with_retries(&self, path: &str, page: Option<PageRequest>) -> Result<Value> {
        let mut attempt: u32 = 1;
        loop {
            match self.client.get_json(path, page).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt >= self.policy.total_attempts() => {
                    return Err(TapError::RetriesExhausted {
                        uri: request_uri(path, page),
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Bloomerang request failed ({}). Retrying. Attempt {} of {} in {} seconds ({} retries left).",
                        e,
                        attempt,
                        self.policy.total_attempts(),
                        self.policy.delay.as_secs(),
                        self.policy.max_retries - attempt
                    );
                    self.backoff.wait(self.policy.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    pub async fn fetch_page(
        &self,
        collection: &CollectionDescriptor,
        page: PageRequest,
    ) -> Result<PageResult> {
        let body = self.request_with_retries(collection.api_path, Some(page)).await?;
        Ok(decode_page(body, collection.paginated))
    }

    /// Start a fresh pagination cycle at offset 0.
    pub fn fetch_all<'f>(&'f self, collection: &'f CollectionDescriptor) -> Paginator<'f, C, B> {
        Paginator {
            fetcher: self,
            collection,
            next_page: 1,
            done: false,
        }
    }
}

/// Lazy, in-order page sequence for one collection.
pub struct Paginator<'f, C: ApiClient, B: Backoff> {
    fetcher: &'f PagedFetcher<'f, C, B>,
    collection: &'f CollectionDescriptor,
    next_page: usize,
    done: bool,
}

impl<C: ApiClient, B: Backoff> Paginator<'_, C, B> {
    /// `Ok(None)` once the short page (or the single unpaginated page) was returned.
    pub async fn next_page(&mut self) -> Result<Option<PageResult>> {
        if self.done {
            return Ok(None);
        }

        let request = PageRequest::nth(self.next_page, RECORDS_PER_PAGE);
        tracing::debug!(
            "📡 {}: fetching page {} ({})",
            self.collection.name,
            self.next_page,
            request_uri(self.collection.api_path, Some(request))
        );

        let page = match self.fetcher.fetch_page(self.collection, request).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        if page.has_more {
            self.next_page += 1;
        } else {
            self.done = true;
        }

        Ok(Some(page))
    }

    pub fn pages_fetched(&self) -> usize {
        if self.done {
            self.next_page
        } else {
            self.next_page - 1
        }
    }
}
