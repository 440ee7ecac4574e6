//! Normalization of raw dataset text

use regex::Regex;
use std::sync::OnceLock;

use crate::crawler::NOT_AVAILABLE;

fn non_numeric() -> &'static Regex {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    NON_NUMERIC.get_or_init(|| Regex::new(r"[^\d.]").expect("static pattern is valid"))
}

/// Whether a dataset cell holds no value (the sentinel or an empty cell)
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == NOT_AVAILABLE
}

/// Parse a displayed price into a number.
///
/// `₹ 15,000 / Piece` becomes `15000.0`. Anything mentioning `Ask` is an
/// undisclosed price and yields `None`, as does text with no parseable number.
pub fn clean_price(price: &str) -> Option<f64> {
    if is_missing(price) || price.contains("Ask") {
        return None;
    }
    non_numeric().replace_all(price, "").parse::<f64>().ok()
}

/// Keep the part of a location before its first comma
pub fn normalize_location(location: &str) -> String {
    location.split(',').next().unwrap_or_default().trim().to_string()
}
