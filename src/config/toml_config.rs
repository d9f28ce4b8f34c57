use crate::adapters::http::BASE_API_URL;
use crate::core::catalog::Catalog;
use crate::core::fetcher::RetryPolicy;
use crate::utils::error::{Result, TapError};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    pub private_key: Option<String>,
    pub base_url: Option<String>,
    /// Collections to sync; absent means the whole catalog.
    pub streams: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub delay_seconds: Option<u64>,
}

impl TapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TapError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BLOOMERANG_PRIVATE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TapError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        let private_key = validate_required_field("private_key", &self.private_key)?;
        validate_non_empty_string("private_key", private_key)?;
        if private_key.starts_with("${") {
            return Err(TapError::InvalidConfigValueError {
                field: "private_key".to_string(),
                value: private_key.clone(),
                reason: "Environment variable is not set".to_string(),
            });
        }

        validate_url("base_url", self.base_url())?;

        if let Some(streams) = &self.streams {
            if streams.is_empty() {
                return Err(TapError::ValidationError {
                    message: "streams must name at least one collection".to_string(),
                });
            }
            Catalog::bloomerang().select(Some(streams.as_slice()))?;
        }

        if let Some(retry) = &self.retry {
            if let Some(max_retries) = retry.max_retries {
                validate_range("retry.max_retries", max_retries, 0, 20)?;
            }
        }

        if let Some(timeout) = self.timeout_seconds {
            validate_range("timeout_seconds", timeout, 1, 3600)?;
        }

        Ok(())
    }

    pub fn private_key(&self) -> &str {
        self.private_key.as_deref().unwrap_or_default()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(BASE_API_URL)
    }

    pub fn streams(&self) -> Option<Vec<String>> {
        self.streams.clone()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        match &self.retry {
            Some(retry) => RetryPolicy::new(
                retry.max_retries.unwrap_or(defaults.max_retries),
                retry
                    .delay_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.delay),
            ),
            None => defaults,
        }
    }
}

impl Validate for TapConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
