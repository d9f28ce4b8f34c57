use thiserror::Error;

/// 單次 HTTP GET 的失敗結果，由重試迴圈判斷是否再試
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Bloomerang credentials were invalid.")]
    InvalidCredentials,

    #[error("Resource not found or another HTTP error occurred. code: {status}")]
    Status { status: u16 },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum TapError {
    #[error("API request failed: {0}")]
    Request(#[from] RequestError),

    #[error("Request to '{uri}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        uri: String,
        attempts: u32,
        #[source]
        source: RequestError,
    },

    #[error("Unknown collection: {name}")]
    UnknownCollection { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl TapError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TapError::Request(RequestError::InvalidCredentials)
            | TapError::RetriesExhausted {
                source: RequestError::InvalidCredentials,
                ..
            } => "Bloomerang rejected the private key".to_string(),
            TapError::RetriesExhausted { uri, attempts, .. } => {
                format!("Could not fetch '{}' after {} attempts", uri, attempts)
            }
            TapError::Request(e) => format!("Bloomerang request failed: {}", e),
            TapError::UnknownCollection { name } => {
                format!("'{}' is not a Bloomerang collection", name)
            }
            TapError::ConfigError { .. }
            | TapError::MissingConfigError { .. }
            | TapError::InvalidConfigValueError { .. }
            | TapError::ValidationError { .. } => format!("Configuration problem: {}", self),
            TapError::IoError(e) => format!("Could not write output: {}", e),
            TapError::SerializationError(e) => format!("Could not encode message: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TapError::Request(RequestError::InvalidCredentials)
            | TapError::RetriesExhausted {
                source: RequestError::InvalidCredentials,
                ..
            } => "Check private_key in the config file or the environment variable it references",
            TapError::Request(_) | TapError::RetriesExhausted { .. } => {
                "Check network connectivity and the Bloomerang API status, then re-run the sync"
            }
            TapError::UnknownCollection { .. } => {
                "Run with --mode tables to list the supported collection names"
            }
            TapError::ConfigError { .. }
            | TapError::MissingConfigError { .. }
            | TapError::InvalidConfigValueError { .. }
            | TapError::ValidationError { .. } => "Fix the configuration file and try again",
            TapError::IoError(_) | TapError::SerializationError(_) => {
                "Make sure the downstream consumer is still reading stdout"
            }
        }
    }

    /// 1 = 設定錯誤, 2 = 上游請求錯誤, 3 = 輸出錯誤
    pub fn exit_code(&self) -> i32 {
        match self {
            TapError::ConfigError { .. }
            | TapError::MissingConfigError { .. }
            | TapError::InvalidConfigValueError { .. }
            | TapError::ValidationError { .. }
            | TapError::UnknownCollection { .. } => 1,
            TapError::Request(_) | TapError::RetriesExhausted { .. } => 2,
            TapError::IoError(_) | TapError::SerializationError(_) => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, TapError>;
