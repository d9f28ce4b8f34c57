use crate::domain::model::PageRequest;
use crate::domain::ports::ApiClient;
use crate::utils::error::{RequestError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const BASE_API_URL: &str = "https://api.bloomerang.co/v2/";

/// Bloomerang REST client. Authenticates every request with the `X-API-KEY` header.
#[derive(Debug, Clone)]
pub struct BloomerangClient {
    client: Client,
    base_url: String,
    private_key: String,
}

impl BloomerangClient {
    pub fn new(base_url: &str, private_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, private_key, None)
    }

    pub fn with_timeout(
        base_url: &str,
        private_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        validate_url("base_url", base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(RequestError::from)?;

        // 相對路徑直接接在 base 後面，所以結尾一定要有 '/'
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        Ok(Self {
            client,
            base_url,
            private_key: private_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiClient for BloomerangClient {
    async fn get_json(
        &self,
        path: &str,
        page: Option<PageRequest>,
    ) -> std::result::Result<Value, RequestError> {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));

        let mut request = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.private_key);
        if let Some(page) = page {
            request = request.query(&[("skip", page.skip), ("take", page.take)]);
        }

        tracing::debug!("Making API request to: {}", url);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        match response.status() {
            StatusCode::OK => Ok(response.json::<Value>().await?),
            StatusCode::UNAUTHORIZED => Err(RequestError::InvalidCredentials),
            status => Err(RequestError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
