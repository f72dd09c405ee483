//! Display helpers for product tables.

use chrono::{DateTime, Utc};

use crate::config;

/// `$42.50`, or `N/A` when no price has been confirmed.
pub fn price(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("${:.2}", p),
        None => "N/A".to_string(),
    }
}

/// `Jan 5, 2024, 03:04 PM` (UTC).
pub fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(config::TIMESTAMP_FORMAT).to_string()
}

/// `1/5/2024` (UTC).
pub fn date(ts: &DateTime<Utc>) -> String {
    ts.format(config::SHORT_DATE_FORMAT).to_string()
}

/// Name of the store a product URL points at.
///
/// Known retailers get their brand name; other hosts are returned as-is and
/// anything that does not parse as a URL is `Unknown`.
pub fn source_label(url: &str) -> String {
    let host = match reqwest::Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
    {
        Some(host) => host,
        None => return "Unknown".to_string(),
    };

    if host.contains("amazon") {
        "Amazon".to_string()
    } else if host.contains("ebay") {
        "eBay".to_string()
    } else if host.contains("walmart") {
        "Walmart".to_string()
    } else {
        host
    }
}
