//! CSS selector strategies for result pages
//!
//! Marketplace markup changes without notice, so every field carries an ordered
//! list of selectors. The defaults match the current results layout; a JSON file
//! can override any of them without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::CrawlError;

/// Ordered selector strategies for containers and fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Primary selector for the repeating item container
    pub container: String,

    /// Single fallback tried when the primary matches nothing
    pub container_fallback: String,

    /// Product name strategies, most specific first
    pub title: Vec<String>,

    /// Price strategies
    pub price: Vec<String>,

    /// Supplier name strategies
    pub supplier: Vec<String>,

    /// Location strategies
    pub location: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "div.clg".to_string(),
            container_fallback: "div.lst_cl".to_string(),
            title: vec!["span.p-title".to_string(), "h4".to_string()],
            price: vec!["span.prc".to_string()],
            supplier: vec!["h5.cust-name".to_string(), "span.cust-name".to_string()],
            location: vec!["span.loc-name".to_string(), "p.sm-cl".to_string()],
        }
    }
}

impl SelectorConfig {
    /// Read selector overrides from a JSON file.
    ///
    /// Keys missing from the file keep their default strategies.
    pub async fn read_config(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CrawlError::SelectorConfig(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| CrawlError::SelectorConfig(format!("{}: {}", path.display(), e)))
    }
}
