//! Error types for the tradecrawl crate

use thiserror::Error;

/// Result type for tradecrawl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tradecrawl operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Crawl setup error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Dataset write error
    #[error("Store error: {0}")]
    Store(String),
}
