//! Population Record Module
//! The single entity parsed from the dataset, plus year helpers.

use std::collections::HashSet;

/// One parsed CSV row.
///
/// Metric fields keep their original text so the tooltip can echo the
/// population exactly as it appears in the file. The loader only accepts
/// rows whose metrics parse as finite numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRecord {
    pub country: String,
    pub year: String,
    pub population: String,
    pub density: String,
    pub growth_rate: String,
}

impl PopulationRecord {
    pub fn population_value(&self) -> f64 {
        parse_metric(&self.population).unwrap_or(0.0)
    }

    pub fn density_value(&self) -> f64 {
        parse_metric(&self.density).unwrap_or(0.0)
    }

    pub fn growth_rate_value(&self) -> f64 {
        parse_metric(&self.growth_rate).unwrap_or(0.0)
    }

    /// Tooltip label: `"<country>: <population>"`.
    pub fn tooltip_text(&self) -> String {
        format!("{}: {}", self.country, self.population)
    }
}

/// Parse a numeric field, rejecting NaN and infinities.
pub fn parse_metric(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Distinct years in first-occurrence order.
pub fn distinct_years(records: &[PopulationRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.year.as_str()))
        .map(|r| r.year.clone())
        .collect()
}

/// Records whose year matches exactly.
pub fn records_for_year<'a>(
    records: &'a [PopulationRecord],
    year: &'a str,
) -> impl Iterator<Item = &'a PopulationRecord> + 'a {
    records.iter().filter(move |r| r.year == year)
}
