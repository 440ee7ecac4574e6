//! The page loop
//!
//! Pages are requested strictly one after another. A non-success status ends
//! the session and keeps what was already collected; any other fetch failure
//! only costs the current page.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use super::client::{PageFetcher, RequestClient};
use super::config::CrawlerConfig;
use super::error::{CrawlError, FetchError};
use super::parser::PageParser;
use super::ProductRecord;

/// Draw a politeness delay uniformly from `range` (`[start, end)`)
pub fn politeness_delay<R: Rng + ?Sized>(rng: &mut R, range: Range<Duration>) -> Duration {
    rng.gen_range(range)
}

/// Where and why a crawl ended early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoppedAt {
    /// Page that returned the status
    pub page: u32,
    /// The non-success status code
    pub status: u16,
}

/// Outcome of one crawl session
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Records in page order, not yet deduplicated
    pub records: Vec<ProductRecord>,

    /// Pages fetched and parsed
    pub pages_parsed: u32,

    /// Pages abandoned after a transport failure
    pub pages_skipped: u32,

    /// Set when a non-success status ended the crawl
    pub stopped_at: Option<StoppedAt>,
}

/// Progress notifications emitted during a crawl
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The session started
    Started { query: String, max_pages: u32 },
    /// A page is about to be requested
    PageRequested { page: u32 },
    /// A page was parsed
    PageParsed { page: u32, items: usize },
    /// A page was abandoned
    PageSkipped { page: u32, error: String },
    /// A non-success status ended the session
    Blocked { page: u32, status: u16 },
    /// The session ended
    Finished { records: usize },
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlEvent::Started { query, max_pages } => {
                write!(f, "Starting crawl for: {} ({} pages)", query, max_pages)
            }
            CrawlEvent::PageRequested { page } => write!(f, "   ...Scraping page {}", page),
            CrawlEvent::PageParsed { page, items } => {
                write!(f, "   Page {}: {} items", page, items)
            }
            CrawlEvent::PageSkipped { page, error } => {
                write!(f, "   Error on page {}: {}", page, error)
            }
            CrawlEvent::Blocked { page, status } => {
                write!(f, "   Blocked or Error on page {}: {}", page, status)
            }
            CrawlEvent::Finished { records } => write!(f, "Crawl finished: {} records", records),
        }
    }
}

/// Drives a fetcher and a parser over the result pages of one query
pub struct Crawler<F> {
    fetcher: F,
    parser: PageParser,
    delay: Range<Duration>,
    rng: StdRng,
    progress: Option<mpsc::Sender<CrawlEvent>>,
}

impl Crawler<RequestClient> {
    /// Create a crawler that fetches over HTTP
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = RequestClient::new(config)?;
        Self::new(fetcher, config)
    }
}

impl<F: PageFetcher> Crawler<F> {
    /// Create a crawler around any page source
    pub fn new(fetcher: F, config: &CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let parser = PageParser::new(&config.selectors)?;
        // Offset the seed so delays are not correlated with identity picks
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            fetcher,
            parser,
            delay: config.delay_range(),
            rng,
            progress: None,
        })
    }

    /// Send progress events to `sender`
    pub fn with_progress(mut self, sender: mpsc::Sender<CrawlEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// The underlying page source
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn notify(&self, event: CrawlEvent) {
        if let Some(sender) = &self.progress {
            // A dropped receiver only loses progress output
            let _ = sender.send(event).await;
        }
    }

    /// Crawl pages `1..=max_pages` of the results for `query`
    #[instrument(skip(self))]
    pub async fn run(&mut self, query: &str, max_pages: u32) -> CrawlReport {
        info!("Starting crawl for {}", query);
        self.notify(CrawlEvent::Started {
            query: query.to_string(),
            max_pages,
        })
        .await;

        let mut report = CrawlReport::default();

        for page in 1..=max_pages {
            self.notify(CrawlEvent::PageRequested { page }).await;

            let fetched = match self.fetcher.fetch(query, page).await {
                Ok(fetched) => fetched,
                Err(FetchError::Status { page, status }) => {
                    warn!("Page {} returned status {}, stopping crawl", page, status);
                    self.notify(CrawlEvent::Blocked { page, status }).await;
                    report.stopped_at = Some(StoppedAt { page, status });
                    break;
                }
                Err(e) => {
                    error!("Error on page {}: {}", page, e);
                    self.notify(CrawlEvent::PageSkipped {
                        page,
                        error: e.to_string(),
                    })
                    .await;
                    report.pages_skipped += 1;
                    continue;
                }
            };

            let items = self.parser.extract_items(&fetched.body, query);
            info!(
                "Parsed {} items from page {} (status {})",
                items.len(),
                fetched.page,
                fetched.status
            );
            self.notify(CrawlEvent::PageParsed {
                page,
                items: items.len(),
            })
            .await;
            report.records.extend(items);
            report.pages_parsed += 1;

            let delay = politeness_delay(&mut self.rng, self.delay.clone());
            debug!("Sleeping {:?} before next page", delay);
            tokio::time::sleep(delay).await;
        }

        info!("Crawl finished with {} records", report.records.len());
        self.notify(CrawlEvent::Finished {
            records: report.records.len(),
        })
        .await;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::FetchedPage;
    use std::collections::HashMap;

    fn listing_page(names: &[&str]) -> String {
        let cards: String = names
            .iter()
            .map(|name| {
                format!(
                    r#"<div class="clg"><span class="p-title">{}</span><span class="prc">₹ 100</span></div>"#,
                    name
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", cards)
    }

    enum Scripted {
        Page(String),
        Status(u16),
        Broken,
    }

    /// Replays canned responses per page and records every request
    struct ScriptedFetcher {
        script: HashMap<u32, Scripted>,
        requested: Vec<u32>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<(u32, Scripted)>) -> Self {
            Self {
                script: script.into_iter().collect(),
                requested: Vec::new(),
            }
        }
    }

    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&mut self, _query: &str, page: u32) -> Result<FetchedPage, FetchError> {
            self.requested.push(page);
            match self.script.get(&page) {
                Some(Scripted::Page(body)) => Ok(FetchedPage {
                    page,
                    status: 200,
                    body: body.clone(),
                }),
                Some(Scripted::Status(status)) => Err(FetchError::Status {
                    page,
                    status: *status,
                }),
                Some(Scripted::Broken) | None => {
                    Err(FetchError::UrlParse(url::ParseError::EmptyHost))
                }
            }
        }
    }

    fn fast_config() -> CrawlerConfig {
        CrawlerConfig::builder().delay_ms(1, 2).seed(Some(3)).build()
    }

    #[tokio::test]
    async fn test_bad_status_stops_crawl() {
        let fetcher = ScriptedFetcher::new(vec![
            (1, Scripted::Page(listing_page(&["A", "B"]))),
            (2, Scripted::Status(503)),
            (3, Scripted::Page(listing_page(&["C"]))),
        ]);
        let mut crawler = Crawler::new(fetcher, &fast_config()).unwrap();

        let report = crawler.run("pumps", 3).await;

        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(crawler.fetcher().requested, vec![1, 2]);
        assert_eq!(
            report.stopped_at,
            Some(StoppedAt {
                page: 2,
                status: 503
            })
        );
        assert_eq!(report.pages_parsed, 1);
    }

    #[tokio::test]
    async fn test_transport_failure_skips_page() {
        let fetcher = ScriptedFetcher::new(vec![
            (1, Scripted::Page(listing_page(&["A"]))),
            (2, Scripted::Broken),
            (3, Scripted::Page(listing_page(&["C"]))),
        ]);
        let mut crawler = Crawler::new(fetcher, &fast_config()).unwrap();

        let report = crawler.run("pumps", 3).await;

        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(crawler.fetcher().requested, vec![1, 2, 3]);
        assert_eq!(report.pages_skipped, 1);
        assert_eq!(report.pages_parsed, 2);
        assert!(report.stopped_at.is_none());
    }

    #[tokio::test]
    async fn test_records_carry_query_as_category() {
        let fetcher = ScriptedFetcher::new(vec![(1, Scripted::Page(listing_page(&["A"])))]);
        let mut crawler = Crawler::new(fetcher, &fast_config()).unwrap();

        let report = crawler.run("industrial pumps", 1).await;
        assert_eq!(report.records[0].category, "industrial pumps");
    }

    #[tokio::test]
    async fn test_zero_pages_requests_nothing() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let mut crawler = Crawler::new(fetcher, &fast_config()).unwrap();

        let report = crawler.run("pumps", 0).await;
        assert!(report.records.is_empty());
        assert!(crawler.fetcher().requested.is_empty());
    }

    #[tokio::test]
    async fn test_progress_events() {
        let fetcher = ScriptedFetcher::new(vec![
            (1, Scripted::Page(listing_page(&["A"]))),
            (2, Scripted::Status(429)),
        ]);
        let (sender, mut receiver) = mpsc::channel(32);
        let mut crawler = Crawler::new(fetcher, &fast_config())
            .unwrap()
            .with_progress(sender);

        crawler.run("pumps", 5).await;
        drop(crawler);

        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                CrawlEvent::Started {
                    query: "pumps".to_string(),
                    max_pages: 5
                },
                CrawlEvent::PageRequested { page: 1 },
                CrawlEvent::PageParsed { page: 1, items: 1 },
                CrawlEvent::PageRequested { page: 2 },
                CrawlEvent::Blocked {
                    page: 2,
                    status: 429
                },
                CrawlEvent::Finished { records: 1 },
            ]
        );
        assert_eq!(events[4].to_string(), "   Blocked or Error on page 2: 429");
    }

    fn paced_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .delay_ms(2_000, 5_000)
            .seed(Some(21))
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_follows_each_parsed_page() {
        let fetcher = ScriptedFetcher::new(vec![
            (1, Scripted::Page(listing_page(&["A"]))),
            (2, Scripted::Broken),
            (3, Scripted::Page(listing_page(&["C"]))),
            (4, Scripted::Status(503)),
        ]);
        let mut crawler = Crawler::new(fetcher, &paced_config()).unwrap();

        let start = tokio::time::Instant::now();
        let report = crawler.run("pumps", 5).await;
        let elapsed = start.elapsed();

        // two parsed pages, nothing after the skip or the stop
        assert_eq!(report.pages_parsed, 2);
        assert!(elapsed >= Duration::from_secs(4), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_after_last_page() {
        let fetcher = ScriptedFetcher::new(vec![(1, Scripted::Page(listing_page(&["A"])))]);
        let mut crawler = Crawler::new(fetcher, &paced_config()).unwrap();

        let start = tokio::time::Instant::now();
        crawler.run("pumps", 1).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_without_parsed_pages() {
        let fetcher = ScriptedFetcher::new(vec![
            (1, Scripted::Broken),
            (2, Scripted::Status(403)),
        ]);
        let mut crawler = Crawler::new(fetcher, &paced_config()).unwrap();

        let start = tokio::time::Instant::now();
        let report = crawler.run("pumps", 3).await;

        assert_eq!(report.pages_skipped, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_politeness_delay_within_bounds() {
        let range = Duration::from_secs(2)..Duration::from_secs(5);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1_000 {
            let delay = politeness_delay(&mut rng, range.clone());
            assert!(delay >= Duration::from_secs(2));
            assert!(delay < Duration::from_secs(5));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CrawlerConfig::builder().delay_ms(10, 1).build();
        let result = Crawler::new(ScriptedFetcher::new(Vec::new()), &config);
        assert!(matches!(result, Err(CrawlError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_http_crawl_stops_on_blocked_page() {
        use mockito::{Matcher, Server};

        let mut server = Server::new_async().await;
        let page_one = server
            .mock("GET", "/search.mp")
            .match_query(Matcher::UrlEncoded("pg".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(listing_page(&["Alpha", "Beta", "Alpha"]))
            .expect(1)
            .create_async()
            .await;
        let page_two = server
            .mock("GET", "/search.mp")
            .match_query(Matcher::UrlEncoded("pg".into(), "2".into()))
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let page_three = server
            .mock("GET", "/search.mp")
            .match_query(Matcher::UrlEncoded("pg".into(), "3".into()))
            .with_status(200)
            .with_body(listing_page(&["Gamma"]))
            .expect(0)
            .create_async()
            .await;

        let config = CrawlerConfig::builder()
            .base_url(format!("{}/search.mp", server.url()))
            .delay_ms(1, 2)
            .seed(Some(11))
            .build();
        let mut crawler = Crawler::from_config(&config).unwrap();

        let report = crawler.run("industrial pumps", 3).await;

        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Alpha"]);
        assert_eq!(
            report.stopped_at,
            Some(StoppedAt {
                page: 2,
                status: 503
            })
        );

        page_one.assert_async().await;
        page_two.assert_async().await;
        page_three.assert_async().await;
    }
}
