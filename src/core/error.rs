use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Cannot connect to monitoring backend: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("could not read time series value: {}", fetch_detail(.status, .message))]
    Fetch { status: Option<u16>, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode monitoring response: {0}")]
    Decode(String),

    #[error("Not supported metric value type: {0}")]
    UnsupportedValueType(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout error: operation took longer than {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Result type alias for gcm-dump operations
pub type Result<T> = std::result::Result<T, DumpError>;

fn fetch_detail(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("HTTP {code}: {message}"),
        None => message.to_string(),
    }
}

impl DumpError {
    /// Creates a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a new authentication error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a new fetch error for a backend response
    pub fn fetch<S: Into<String>>(status: Option<u16>, msg: S) -> Self {
        Self::Fetch {
            status,
            message: msg.into(),
        }
    }

    /// Creates a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a new serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) | Self::Auth(_) => "setup",
            Self::Fetch { .. } | Self::Http(_) | Self::Decode(_) => "fetch",
            Self::UnsupportedValueType(_) => "unsupported",
            Self::Serialization(_) | Self::Json(_) => "serialization",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Timeout { .. } => "timeout",
        }
    }
}
