use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaristaError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Intent error: {0}")]
    Intent(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BaristaError>;
