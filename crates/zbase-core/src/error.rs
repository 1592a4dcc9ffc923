//! Error types for zbase-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Dimension mismatch: {keys} keys but {values} values")]
    DimensionMismatch { keys: usize, values: usize },

    #[error("Item too large: item {index} is {size} bytes, page limit is {max}")]
    ItemTooLarge { index: usize, size: u64, max: u64 },

    #[error("Signature error: {0}")]
    Signature(String),

    #[error("Key decode error: {0}")]
    KeyDecode(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
