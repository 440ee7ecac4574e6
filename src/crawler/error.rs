//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler setup
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client construction error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured CSS selector could not be parsed
    #[error("Invalid selector '{selector}': {message}")]
    Selector {
        /// The offending selector string
        selector: String,
        /// Parser message
        message: String,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Selector file could not be read
    #[error("Selector config error: {0}")]
    SelectorConfig(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a single page fetch.
///
/// Only [`FetchError::Status`] ends a crawl; every other variant abandons the
/// current page and lets the crawl move on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("page {page} returned status {status}")]
    Status {
        /// Page index that was requested
        page: u32,
        /// HTTP status code
        status: u16,
    },

    /// Transport level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The page URL could not be built
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The chosen identity could not be used as a header value
    #[error("Invalid header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// Failure to extract one listing; the listing is dropped
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Field text contains replacement characters from lossy decoding
    #[error("garbled text in field '{field}'")]
    Garbled {
        /// Field name
        field: &'static str,
    },
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
