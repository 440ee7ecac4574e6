//! HTTP client for marketplace result pages

use std::future::Future;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client as ReqwestClient;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};
use url::Url;

use super::config::CrawlerConfig;
use super::error::{CrawlError, FetchError};

/// A successfully fetched results page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Page index that was requested
    pub page: u32,

    /// HTTP status code (always a success code)
    pub status: u16,

    /// Response body
    pub body: String,
}

/// Source of result pages for a search query.
///
/// One call is one attempt; implementations must not retry.
pub trait PageFetcher {
    /// Fetch page `page` (1-based) of the results for `query`
    fn fetch(
        &mut self,
        query: &str,
        page: u32,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>>;
}

/// A non-empty pool of user agent strings
#[derive(Debug, Clone)]
pub struct IdentityPool {
    agents: Vec<String>,
}

impl IdentityPool {
    /// Create a pool; `None` if `agents` is empty
    pub fn new(agents: Vec<String>) -> Option<Self> {
        if agents.is_empty() {
            None
        } else {
            Some(Self { agents })
        }
    }

    /// Pick one identity uniformly at random
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let index = rng.gen_range(0..self.agents.len());
        &self.agents[index]
    }

    /// All identities in the pool
    pub fn agents(&self) -> &[String] {
        &self.agents
    }
}

/// Build the search URL for one page of results
pub fn build_page_url(base_url: &str, query: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.query_pairs_mut()
        .append_pair("ss", query)
        .append_pair("mcatid", "")
        .append_pair("catid", "")
        .append_pair("prod_serv", "P")
        .append_pair("pg", &page.to_string());
    Ok(url)
}

/// Issues a single GET per page with a randomized browser identity
pub struct RequestClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Search endpoint
    base_url: String,

    /// User agents to rotate through
    identities: IdentityPool,

    /// Fixed language preference
    accept_language: HeaderValue,

    /// Random source for identity selection
    rng: StdRng,
}

impl RequestClient {
    /// Create a client from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        config.validate()?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let identities = IdentityPool::new(config.user_agents.clone())
            .ok_or_else(|| CrawlError::InvalidConfig("user agent pool is empty".to_string()))?;
        let accept_language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| CrawlError::InvalidConfig(format!("accept language: {}", e)))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            identities,
            accept_language,
            rng,
        })
    }

    /// Build the headers for one request, drawing a fresh identity
    pub fn build_headers(&mut self) -> Result<HeaderMap, FetchError> {
        let agent = self.identities.pick(&mut self.rng);
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(agent)?);
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        Ok(headers)
    }
}

impl PageFetcher for RequestClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&mut self, query: &str, page: u32) -> Result<FetchedPage, FetchError> {
        let url = build_page_url(&self.base_url, query, page)?;
        let headers = self.build_headers()?;

        debug!("Sending GET request to {}", url);
        let response = self.client.get(url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Received {} bytes for page {}", body.len(), page);
        Ok(FetchedPage {
            page,
            status: status.as_u16(),
            body,
        })
    }
}
