use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("{label}: expected {expected} affected document(s), store reported {actual}")]
    UnexpectedCount { label: String, expected: u64, actual: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ShelfError {
    /// True for failures raised by the driver or the server.
    pub fn is_store(&self) -> bool {
        matches!(self, ShelfError::Store(_))
    }
}
