use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    Timezone(String),

    #[error("Collector '{collector}' failed: {message}")]
    Collector { collector: String, message: String },

    #[error("Event store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
