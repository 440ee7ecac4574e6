//! # Crawler Configuration Module
//!
//! This module provides configuration options for the marketplace crawler,
//! including the search endpoint, page budget, politeness delays, request
//! identities and selector strategies. It uses a builder pattern for flexible
//! configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration
//!
//! ## Features
//!
//! - Default configuration suitable for polite crawling (2-5 second delays)
//! - Optional request deadline, off by default
//! - Seedable randomness for reproducible identities and delays
//! - Selector overrides for layout changes

use std::ops::Range;
use std::time::Duration;

use super::error::CrawlError;
use super::selectors::SelectorConfig;

/// Default search endpoint
pub const DEFAULT_BASE_URL: &str = "https://dir.indiamart.com/search.mp";

/// Realistic desktop and mobile browser identities
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.51",
    "Mozilla/5.0 (Linux; Android 14; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
];

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Search endpoint; query parameters are appended per page
    pub base_url: String,

    /// Maximum number of result pages to request
    pub max_pages: u32,

    /// Lower bound (inclusive) of the delay between pages, in milliseconds
    pub delay_min_ms: u64,

    /// Upper bound (exclusive) of the delay between pages, in milliseconds
    pub delay_max_ms: u64,

    /// Fixed `Accept-Language` header value
    pub accept_language: String,

    /// Pool of user agents, one picked at random per request
    pub user_agents: Vec<String>,

    /// Optional per-request deadline
    pub timeout: Option<Duration>,

    /// Seed for identity and delay randomness; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Selector strategies for items and fields
    pub selectors: SelectorConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: 3,
            delay_min_ms: 2_000,
            delay_max_ms: 5_000,
            accept_language: "en-US,en;q=0.9".to_string(),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
            timeout: None,
            seed: None,
            selectors: SelectorConfig::default(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the search endpoint
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the maximum number of pages to crawl
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the delay interval between pages in milliseconds, `[min, max)`
    pub fn delay_ms(mut self, min: u64, max: u64) -> Self {
        self.config.delay_min_ms = min;
        self.config.delay_max_ms = max;
        self
    }

    /// Set the `Accept-Language` header value
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.accept_language = accept_language.into();
        self
    }

    /// Replace the user agent pool
    pub fn user_agents(mut self, user_agents: Vec<String>) -> Self {
        self.config.user_agents = user_agents;
        self
    }

    /// Set a per-request deadline
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Seed the random source
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the selector strategies
    pub fn selectors(mut self, selectors: SelectorConfig) -> Self {
        self.config.selectors = selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the politeness delay interval as Durations
    pub fn delay_range(&self) -> Range<Duration> {
        Duration::from_millis(self.delay_min_ms)..Duration::from_millis(self.delay_max_ms)
    }

    /// Reject configurations the crawler cannot run with
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.delay_min_ms >= self.delay_max_ms {
            return Err(CrawlError::InvalidConfig(format!(
                "delay interval [{}ms, {}ms) is empty",
                self.delay_min_ms, self.delay_max_ms
            )));
        }
        if self.user_agents.is_empty() {
            return Err(CrawlError::InvalidConfig(
                "user agent pool is empty".to_string(),
            ));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_pages, 3);
        assert_eq!(
            config.delay_range(),
            Duration::from_secs(2)..Duration::from_secs(5)
        );
        assert_eq!(config.accept_language, "en-US,en;q=0.9");
        assert!(config.timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = CrawlerConfig::builder()
            .base_url("http://localhost:8080/search")
            .max_pages(7)
            .delay_ms(10, 20)
            .timeout(Some(Duration::from_secs(30)))
            .seed(Some(42))
            .build();

        assert_eq!(config.base_url, "http://localhost:8080/search");
        assert_eq!(config.max_pages, 7);
        assert_eq!(config.delay_min_ms, 10);
        assert_eq!(config.delay_max_ms, 20);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_delay = CrawlerConfig::builder().delay_ms(5, 5).build();
        assert!(matches!(
            empty_delay.validate(),
            Err(CrawlError::InvalidConfig(_))
        ));

        let no_agents = CrawlerConfig::builder().user_agents(Vec::new()).build();
        assert!(matches!(
            no_agents.validate(),
            Err(CrawlError::InvalidConfig(_))
        ));

        let bad_url = CrawlerConfig::builder().base_url("not a url").build();
        assert!(matches!(bad_url.validate(), Err(CrawlError::UrlParse(_))));
    }
}
