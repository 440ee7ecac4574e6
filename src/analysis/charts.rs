//! Plain-text chart artifacts

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::AnalysisError;
use super::stats::Bin;

/// Locations shown in the location chart
pub const CHART_LOCATIONS: usize = 10;

/// Buckets in the price histogram
pub const PRICE_BINS: usize = 30;

/// File name of the location chart
pub const LOCATION_CHART_FILE: &str = "location_distribution.txt";

/// File name of the price histogram
pub const PRICE_CHART_FILE: &str = "price_distribution.txt";

const BAR_WIDTH: usize = 50;

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * BAR_WIDTH).div_ceil(max);
    "#".repeat(len)
}

/// Horizontal bar chart of the most frequent supplier locations
pub fn render_location_chart(frequencies: &[(String, usize)]) -> String {
    let shown = &frequencies[..frequencies.len().min(CHART_LOCATIONS)];
    let label_width = shown.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = shown.iter().map(|(_, c)| *c).max().unwrap_or(0);

    let mut out = String::from("Top 10 Supplier Hubs\n\n");
    if shown.is_empty() {
        out.push_str("(no locations)\n");
        return out;
    }
    for (location, count) in shown {
        let _ = writeln!(
            out,
            "{:<width$} | {} {}",
            location,
            bar(*count, max),
            count,
            width = label_width
        );
    }
    out.push_str("\nNumber of Suppliers\n");
    out
}

/// Histogram of prices with the top outliers removed
pub fn render_price_histogram(bins: &[Bin]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let mut out = String::from("Price Distribution (Excluding top 5% outliers)\n\n");
    if bins.is_empty() {
        out.push_str("(no priced listings)\n");
        return out;
    }
    let labels: Vec<String> = bins
        .iter()
        .map(|b| format!("{:.2} - {:.2}", b.start, b.end))
        .collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    for (label, bin) in labels.iter().zip(bins) {
        let _ = writeln!(
            out,
            "{:>width$} | {} {}",
            label,
            bar(bin.count, max),
            bin.count,
            width = label_width
        );
    }
    out.push_str("\nPrice (INR)\n");
    out
}

/// Paths of the written chart artifacts
#[derive(Debug, Clone)]
pub struct ChartPaths {
    pub location: PathBuf,
    pub price: PathBuf,
}

/// Write both charts into `out_dir`, creating it if needed
pub fn write_charts(
    out_dir: &Path,
    location_chart: &str,
    price_chart: &str,
) -> Result<ChartPaths, AnalysisError> {
    std::fs::create_dir_all(out_dir)?;
    let paths = ChartPaths {
        location: out_dir.join(LOCATION_CHART_FILE),
        price: out_dir.join(PRICE_CHART_FILE),
    };
    std::fs::write(&paths.location, location_chart)?;
    std::fs::write(&paths.price, price_chart)?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_chart_scales_bars() {
        let chart = render_location_chart(&[
            ("New Delhi".to_string(), 4),
            ("Pune".to_string(), 2),
        ]);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Top 10 Supplier Hubs");
        assert!(lines[2].starts_with("New Delhi | "));
        assert!(lines[2].ends_with(&format!("{} 4", "#".repeat(50))));
        assert!(lines[3].starts_with("Pune      | "));
        assert!(lines[3].ends_with(&format!("{} 2", "#".repeat(25))));
    }

    #[test]
    fn test_location_chart_limits_rows() {
        let freqs: Vec<(String, usize)> = (0..15).map(|i| (format!("City{}", i), 1)).collect();
        let chart = render_location_chart(&freqs);
        assert_eq!(chart.lines().filter(|l| l.contains(" | ")).count(), 10);
    }

    #[test]
    fn test_empty_charts() {
        assert!(render_location_chart(&[]).contains("(no locations)"));
        assert!(render_price_histogram(&[]).contains("(no priced listings)"));
    }

    #[test]
    fn test_write_charts() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("charts");

        let paths = write_charts(&out_dir, "loc", "price").unwrap();
        assert_eq!(std::fs::read_to_string(paths.location).unwrap(), "loc");
        assert_eq!(std::fs::read_to_string(paths.price).unwrap(), "price");
    }
}
