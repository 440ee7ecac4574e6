//! Crawl a query and write the deduplicated dataset in one call

use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::crawler::{CrawlEvent, CrawlReport, Crawler, CrawlerConfig};
use crate::error::Result;
use crate::store::RecordStore;

/// Result of a crawl that was persisted
#[derive(Debug, Clone)]
pub struct Harvest {
    /// The crawl session outcome, records before dedup
    pub report: CrawlReport,

    /// Rows written after dedup
    pub written: usize,
}

/// Crawl `query` over HTTP and persist the records to `store`.
///
/// Progress events go to `progress` when given. The sender is dropped before
/// this returns, so a receiver loop ends on its own.
#[instrument(skip(config, store, progress), fields(path = %store.path().display()))]
pub async fn crawl_and_persist(
    config: &CrawlerConfig,
    query: &str,
    store: &RecordStore,
    progress: Option<mpsc::Sender<CrawlEvent>>,
) -> Result<Harvest> {
    let mut crawler = Crawler::from_config(config)?;
    if let Some(sender) = progress {
        crawler = crawler.with_progress(sender);
    }

    let report = crawler.run(query, config.max_pages).await;
    drop(crawler);

    let written = store.persist(&report.records)?;
    info!(
        "Harvested {} records, {} written",
        report.records.len(),
        written
    );

    Ok(Harvest { report, written })
}
