//! Price-history chart series.
//!
//! Turns the history entries of one product, in whatever order they were
//! fetched, into a chronologically ascending series with parallel label and
//! price vectors ready to hand to a plotting widget. An empty history yields
//! [`PriceChart::NoData`] rather than a series with undefined bounds.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::config;
use crate::models::{PriceHistoryEntry, ProductWithHistory};

pub const NO_DATA_MESSAGE: &str = "No price history available for this product.";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Result of building a chart for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceChart {
    NoData { title: String, message: String },
    Series(ChartSeries),
}

impl PriceChart {
    pub fn title(&self) -> &str {
        match self {
            PriceChart::NoData { title, .. } => title,
            PriceChart::Series(series) => &series.title,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PriceChart::NoData { .. })
    }

    pub fn series(&self) -> Option<&ChartSeries> {
        match self {
            PriceChart::Series(series) => Some(series),
            PriceChart::NoData { .. } => None,
        }
    }
}

/// A non-empty, chronologically ascending price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    /// Timestamps in ascending order.
    pub timestamps: Vec<DateTime<Utc>>,
    /// One human-readable label per point.
    pub labels: Vec<String>,
    /// One price per point.
    pub prices: Vec<f64>,
    /// Earliest and latest timestamp.
    pub range: (DateTime<Utc>, DateTime<Utc>),
    /// Range rendered as short dates, e.g. `1/5/2024 - 1/9/2024`.
    pub range_label: String,
    pub summary: PriceSummary,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.range.0
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.range.1
    }

    /// `(label, price)` pairs in plotting order.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.prices.iter().copied())
    }
}

/// Aggregate figures shown alongside the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub first_price: f64,
    pub latest_price: f64,
    pub data_points: usize,
}

// ---------------------------------------------------------------------------
// ChartSeriesBuilder
// ---------------------------------------------------------------------------

/// Builds [`PriceChart`]s. Labels are rendered in a fixed UTC offset so the
/// output does not depend on the host's time zone.
#[derive(Debug, Clone)]
pub struct ChartSeriesBuilder {
    offset: FixedOffset,
    label_format: String,
    range_format: String,
}

impl Default for ChartSeriesBuilder {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            label_format: config::CHART_LABEL_FORMAT.to_string(),
            range_format: config::SHORT_DATE_FORMAT.to_string(),
        }
    }
}

impl ChartSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render labels in the given offset instead of UTC.
    pub fn offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Override the per-point label format (chrono `strftime` syntax).
    pub fn label_format(mut self, format: impl Into<String>) -> Self {
        self.label_format = format.into();
        self
    }

    /// Override the date format used in the range label.
    pub fn range_format(mut self, format: impl Into<String>) -> Self {
        self.range_format = format.into();
        self
    }

    /// Build the chart for a fetched product and its history.
    pub fn build_for(&self, data: &ProductWithHistory) -> PriceChart {
        self.build(&data.product.name, &data.price_history)
    }

    /// Build the chart for `product_name` from entries in arrival order.
    ///
    /// Entries are stably sorted by timestamp, so equal timestamps keep their
    /// arrival order. Entries with a negative or non-finite price are dropped.
    pub fn build(&self, product_name: &str, entries: &[PriceHistoryEntry]) -> PriceChart {
        let title = format!("Price History - {}", product_name);

        let mut ordered: Vec<&PriceHistoryEntry> = entries
            .iter()
            .filter(|e| {
                let ok = e.is_valid();
                if !ok {
                    tracing::warn!(
                        product_id = e.product_id,
                        price = e.price,
                        "skipping invalid price history entry"
                    );
                }
                ok
            })
            .collect();

        if ordered.is_empty() {
            return PriceChart::NoData {
                title,
                message: NO_DATA_MESSAGE.to_string(),
            };
        }

        ordered.sort_by_key(|e| e.timestamp);

        let timestamps: Vec<DateTime<Utc>> = ordered.iter().map(|e| e.timestamp).collect();
        let prices: Vec<f64> = ordered.iter().map(|e| e.price).collect();
        let labels: Vec<String> = timestamps
            .iter()
            .map(|ts| self.render(ts, &self.label_format))
            .collect();

        let start = timestamps[0];
        let end = timestamps[timestamps.len() - 1];
        let range_label = format!(
            "{} - {}",
            self.render(&start, &self.range_format),
            self.render(&end, &self.range_format)
        );

        let summary = summarize(&prices);

        PriceChart::Series(ChartSeries {
            title,
            timestamps,
            labels,
            prices,
            range: (start, end),
            range_label,
            summary,
        })
    }

    fn render(&self, ts: &DateTime<Utc>, format: &str) -> String {
        ts.with_timezone(&self.offset).format(format).to_string()
    }
}

/// Caller guarantees `prices` is non-empty and in chronological order.
fn summarize(prices: &[f64]) -> PriceSummary {
    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg_price = prices.iter().sum::<f64>() / prices.len() as f64;
    PriceSummary {
        min_price,
        max_price,
        avg_price,
        first_price: prices[0],
        latest_price: prices[prices.len() - 1],
        data_points: prices.len(),
    }
}
