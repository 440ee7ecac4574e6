//! # tradecrawl - Marketplace Listing Harvester
//!
//! This crate harvests product listings from a paginated B2B marketplace search
//! interface and turns them into a flat, deduplicated dataset. Result pages are
//! crawled politely and sequentially, listings are extracted with layered
//! selector fallbacks, and the dataset can be summarized afterwards.
//!
//! ## Features
//!
//! - One request per page with a rotating browser identity
//! - Randomized 2-5 second politeness delay between pages
//! - Resilient extraction: sentinel values for missing fields, per-item isolation
//! - Hard stop on a blocked page, soft skip on transport errors
//! - CSV persistence with exact-match deduplication
//! - Price and location normalization, summary statistics and text charts
//!
//! ## Example
//!
//! ```rust,no_run
//! use tradecrawl::crawler::CrawlerConfig;
//! use tradecrawl::pipeline::crawl_and_persist;
//! use tradecrawl::store::RecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_pages(2).build();
//!     let store = RecordStore::new();
//!
//!     let harvest = crawl_and_persist(&config, "industrial pumps", &store, None).await?;
//!
//!     println!("Saved {} records", harvest.written);
//!     Ok(())
//! }
//! ```

mod error;
pub mod logging;

pub mod analysis;
pub mod crawler;
pub mod pipeline;
pub mod store;

pub use error::{Error, Result};

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::crawler::{Crawler, CrawlerConfig, ProductRecord};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::pipeline::{Harvest, crawl_and_persist};
    pub use crate::store::RecordStore;
}
