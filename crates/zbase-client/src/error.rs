//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] zbase_core::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Paged write stopped after {completed} of {total} pages: {source}")]
    PageFailed {
        completed: usize,
        total: usize,
        #[source]
        source: Box<ClientError>,
    },

    #[error("Fetching page {page} failed: {message}")]
    PageFetch { page: u64, message: String },

    #[error("Nonce issuer stopped")]
    NonceClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
