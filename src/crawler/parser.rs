//! Listing extraction from results pages
//!
//! Every field is resolved by an ordered list of selectors: the first selector
//! whose first match carries non-empty text wins, and a field with no match
//! falls back to its sentinel. Listings are extracted independently so one bad
//! listing never costs the rest of the page.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::error::{CrawlError, ExtractionError};
use super::selectors::SelectorConfig;
use super::{ASK_FOR_PRICE, NOT_AVAILABLE, ProductRecord};

/// Character left behind by lossy decoding of the response body
const REPLACEMENT_CHAR: char = '\u{FFFD}';

fn compile(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text of an element with runs of whitespace collapsed to single spaces.
///
/// Interior line breaks are folded too, not just the ends trimmed, so a title
/// wrapped across lines in the markup yields the same value (and dedup key) as
/// the unwrapped title.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered extraction strategies for one field
#[derive(Debug)]
struct FieldRule {
    name: &'static str,
    strategies: Vec<Selector>,
    sentinel: &'static str,
}

impl FieldRule {
    fn new(
        name: &'static str,
        selectors: &[String],
        sentinel: &'static str,
    ) -> Result<Self, CrawlError> {
        let strategies = selectors
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name,
            strategies,
            sentinel,
        })
    }

    fn extract(&self, item: ElementRef<'_>) -> Result<String, ExtractionError> {
        let found = self.strategies.iter().find_map(|selector| {
            item.select(selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
        });

        match found {
            Some(text) if text.contains(REPLACEMENT_CHAR) => {
                Err(ExtractionError::Garbled { field: self.name })
            }
            Some(text) => Ok(text),
            None => Ok(self.sentinel.to_string()),
        }
    }
}

/// Extracts product records from a results page
#[derive(Debug)]
pub struct PageParser {
    container: Selector,
    container_fallback: Selector,
    title: FieldRule,
    price: FieldRule,
    supplier: FieldRule,
    location: FieldRule,
}

impl PageParser {
    /// Compile the selector strategies.
    ///
    /// Invalid selectors are reported here rather than on every page.
    pub fn new(config: &SelectorConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            container: compile(&config.container)?,
            container_fallback: compile(&config.container_fallback)?,
            title: FieldRule::new("Product Name", &config.title, NOT_AVAILABLE)?,
            price: FieldRule::new("Price", &config.price, ASK_FOR_PRICE)?,
            supplier: FieldRule::new("Supplier", &config.supplier, NOT_AVAILABLE)?,
            location: FieldRule::new("Location", &config.location, NOT_AVAILABLE)?,
        })
    }

    /// Extract every listing on the page, tagging each with `category`.
    ///
    /// Returns an empty vector when neither container selector matches; an empty
    /// results page and a changed layout look the same here.
    pub fn extract_items(&self, html: &str, category: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);

        let mut containers: Vec<ElementRef<'_>> = document.select(&self.container).collect();
        if containers.is_empty() {
            debug!("Primary container selector matched nothing, trying fallback");
            containers = document.select(&self.container_fallback).collect();
        }
        if containers.is_empty() {
            warn!("No item containers found on page");
            return Vec::new();
        }

        let total = containers.len();
        let records: Vec<ProductRecord> = containers
            .into_iter()
            .filter_map(|item| match self.extract_item(item, category) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping item: {}", e);
                    None
                }
            })
            .collect();

        debug!("Extracted {} of {} items", records.len(), total);
        records
    }

    /// Extract one listing from its container element
    pub fn extract_item(
        &self,
        item: ElementRef<'_>,
        category: &str,
    ) -> Result<ProductRecord, ExtractionError> {
        Ok(ProductRecord {
            name: self.title.extract(item)?,
            price: self.price.extract(item)?,
            supplier: self.supplier.extract(item)?,
            location: self.location.extract(item)?,
            category: category.to_string(),
        })
    }
}
