//! # Marketplace Crawler Module
//!
//! This module harvests product listings from a paginated marketplace search
//! interface. It is the first stage of the pipeline: it fetches result pages one
//! at a time, extracts a structured record per listed product, and hands the
//! accumulated records to the store.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Configuration for the crawl (endpoint, page count, delays, selectors)
//! - `RequestClient`: Issues one GET per page with a randomized browser identity
//! - `PageParser`: Locates item containers and extracts fields with ordered fallbacks
//! - `Crawler`: Drives the page loop and returns a `CrawlReport`
//! - `ProductRecord`: The unit of extraction
//!
//! ## Features
//!
//! - Multi-strategy selectors per field, falling back to sentinel values
//! - Per-item isolation: a garbled listing is skipped without losing its page
//! - Randomized politeness delay between pages
//! - Hard stop on a non-success status, soft skip on transport failures

mod client;
mod config;
mod error;
mod parser;
mod selectors;
mod session;

pub use client::{FetchedPage, IdentityPool, PageFetcher, RequestClient, build_page_url};
pub use config::{CrawlerConfig, CrawlerConfigBuilder, DEFAULT_BASE_URL};
pub use error::{CrawlError, ExtractionError, FetchError};
pub use parser::PageParser;
pub use selectors::SelectorConfig;
pub use session::{CrawlEvent, CrawlReport, Crawler, StoppedAt, politeness_delay};

use serde::{Deserialize, Serialize};

/// Placeholder for a text field that could not be extracted
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for a listing without a displayed price.
///
/// Downstream this marks negotiable or undisclosed pricing, not a parse error.
pub const ASK_FOR_PRICE: &str = "Ask for Price";

/// A single product listing extracted from a results page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listed product name
    #[serde(rename = "Product Name")]
    pub name: String,

    /// Price exactly as displayed, e.g. `₹ 15,000 / Piece`
    #[serde(rename = "Price")]
    pub price: String,

    /// Supplier (seller) name
    #[serde(rename = "Supplier")]
    pub supplier: String,

    /// Supplier location as displayed
    #[serde(rename = "Location")]
    pub location: String,

    /// The search query that produced this record
    #[serde(rename = "Category")]
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_record_equality_covers_all_fields() {
        let record = ProductRecord {
            name: "Centrifugal Pump".to_string(),
            price: "₹ 15,000 / Piece".to_string(),
            supplier: "Acme Pumps".to_string(),
            location: "Pune, Maharashtra".to_string(),
            category: "industrial pumps".to_string(),
        };

        let mut other = record.clone();
        assert_eq!(record, other);

        other.category = "water pumps".to_string();
        assert_ne!(record, other);
    }
}
