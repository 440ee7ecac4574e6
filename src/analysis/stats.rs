//! Summary statistics over the product dataset

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::clean::{clean_price, is_missing, normalize_location};
use crate::crawler::ProductRecord;

/// Number of locations reported in the summary
pub const TOP_LOCATIONS: usize = 5;

/// Prices at or above this quantile are left out of the histogram
pub const PRICE_OUTLIER_QUANTILE: f64 = 0.95;

/// Headline numbers for a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Total rows
    pub total: usize,

    /// Rows with a parseable price
    pub priced: usize,

    /// Distinct known suppliers
    pub unique_suppliers: usize,

    /// Most frequent normalized locations, highest first
    pub top_locations: Vec<(String, usize)>,

    /// Single most frequent location
    pub most_common_location: Option<String>,

    /// Mean of parseable prices
    pub mean_price: Option<f64>,
}

/// One histogram bucket, `[start, end)` except the last which includes `end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Parsed prices in dataset order, skipping unpriced rows
pub fn parsed_prices(records: &[ProductRecord]) -> Vec<f64> {
    records.iter().filter_map(|r| clean_price(&r.price)).collect()
}

/// Normalized known locations in dataset order
pub fn normalized_locations(records: &[ProductRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| !is_missing(&r.location))
        .map(|r| normalize_location(&r.location))
        .collect()
}

/// Count occurrences, highest count first; ties keep first-seen order
pub fn frequencies(values: &[String]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for value in values {
        let count = counts.entry(value.as_str()).or_insert(0);
        if *count == 0 {
            order.push(value.as_str());
        }
        *count += 1;
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| (value.to_string(), counts[value]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Most frequent value; ties go to the lexicographically smallest
pub fn mode(values: &[String]) -> Option<String> {
    let ranked = frequencies(values);
    let top = ranked.first()?.1;
    ranked
        .into_iter()
        .filter(|(_, count)| *count == top)
        .map(|(value, _)| value)
        .min()
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Prices strictly below the outlier quantile
pub fn without_outliers(prices: &[f64]) -> Vec<f64> {
    match quantile(prices, PRICE_OUTLIER_QUANTILE) {
        Some(cutoff) => prices.iter().copied().filter(|p| *p < cutoff).collect(),
        None => Vec::new(),
    }
}

/// Equal-width histogram over the value range
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Compute the headline numbers for a dataset
pub fn summarize(records: &[ProductRecord]) -> Summary {
    let prices = parsed_prices(records);
    let locations = normalized_locations(records);

    let unique_suppliers = records
        .iter()
        .filter(|r| !is_missing(&r.supplier))
        .map(|r| r.supplier.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mean_price = if prices.is_empty() {
        None
    } else {
        Some(prices.iter().sum::<f64>() / prices.len() as f64)
    };

    let mut top_locations = frequencies(&locations);
    top_locations.truncate(TOP_LOCATIONS);

    Summary {
        total: records.len(),
        priced: prices.len(),
        unique_suppliers,
        top_locations,
        most_common_location: mode(&locations),
        mean_price,
    }
}
