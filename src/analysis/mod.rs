//! # Dataset Analysis Module
//!
//! Reads the persisted product dataset and derives a market overview from it:
//! normalized prices and locations, summary counts, two chart artifacts and a
//! short narrative. This stage runs after a crawl and never touches the network.
//!
//! ## Key Components
//!
//! - `clean_price` / `normalize_location`: text normalization for raw cells
//! - `summarize`: headline numbers for a dataset
//! - `analyze`: load, summarize, write charts, return an `AnalysisReport`

mod charts;
mod clean;
mod stats;

pub use charts::{
    ChartPaths, LOCATION_CHART_FILE, PRICE_BINS, PRICE_CHART_FILE, render_location_chart,
    render_price_histogram, write_charts,
};
pub use clean::{clean_price, is_missing, normalize_location};
pub use stats::{
    Bin, Summary, frequencies, histogram, mode, normalized_locations, parsed_prices, quantile,
    summarize, without_outliers,
};

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use crate::store::{RecordStore, StoreConfig, StoreError};

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The dataset has not been produced yet
    #[error("Dataset not found: {0}")]
    SourceMissing(PathBuf),

    /// The dataset could not be read
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A chart could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything produced by one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub charts: ChartPaths,
}

/// Group digits in threes, e.g. `1234567.5` as `1,234,567.50`
fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;

        writeln!(f, "--- Summary Statistics ---")?;
        writeln!(f, "Total Products Scraped: {}", summary.total)?;
        writeln!(f, "Products with transparent pricing: {}", summary.priced)?;
        writeln!(f, "Unique Suppliers: {}", summary.unique_suppliers)?;
        writeln!(f, "Top 5 Locations:")?;
        for (location, count) in &summary.top_locations {
            writeln!(f, "  {:<24} {}", location, count)?;
        }

        writeln!(f)?;
        writeln!(f, "Saved chart: {}", self.charts.location.display())?;
        writeln!(f, "Saved chart: {}", self.charts.price.display())?;

        if summary.total > 0 {
            writeln!(f)?;
            writeln!(f, "--- Key Insights ---")?;
            match &summary.most_common_location {
                Some(location) => writeln!(
                    f,
                    "1. The major hub for this category is **{}**.",
                    location
                )?,
                None => writeln!(f, "1. No supplier locations were listed.")?,
            }
            match summary.mean_price {
                Some(mean) => writeln!(
                    f,
                    "2. The average market price (observable) is approx **₹{}**.",
                    format_amount(mean)
                )?,
                None => writeln!(f, "2. No listing discloses a price.")?,
            }
            writeln!(
                f,
                "3. 'Ask for Price' is common, indicating a highly negotiable B2B market structure."
            )?;
        }
        Ok(())
    }
}

/// Analyze the dataset at `dataset`, writing charts into `out_dir`
#[instrument]
pub fn analyze(dataset: &Path, out_dir: &Path) -> Result<AnalysisReport, AnalysisError> {
    let store = RecordStore::with_config(StoreConfig {
        path: dataset.to_path_buf(),
    });
    let records = store.load().map_err(|e| match e {
        StoreError::NotFound(_) => AnalysisError::SourceMissing(dataset.to_path_buf()),
        other => AnalysisError::Store(other),
    })?;
    info!("Loaded {} records for analysis", records.len());

    let summary = summarize(&records);

    let location_chart = render_location_chart(&frequencies(&normalized_locations(&records)));
    let price_chart =
        render_price_histogram(&histogram(&without_outliers(&parsed_prices(&records)), PRICE_BINS));
    let charts = write_charts(out_dir, &location_chart, &price_chart)?;

    Ok(AnalysisReport { summary, charts })
}
