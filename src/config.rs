use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "PRICE_TRACKER_API_URL";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Label format for chart points, e.g. `Jan 5, 03:04 PM`.
pub const CHART_LABEL_FORMAT: &str = "%b %-d, %I:%M %p";
/// Short date used for chart ranges, e.g. `1/5/2024`.
pub const SHORT_DATE_FORMAT: &str = "%-m/%-d/%Y";
/// Long form used in product tables, e.g. `Jan 5, 2024, 03:04 PM`.
pub const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

pub const PRODUCTS_PATH: &str = "/products/";

pub fn product_path(id: i64) -> String {
    format!("/products/{}", id)
}

pub fn update_path(id: i64) -> String {
    format!("/products/{}/update", id)
}

pub fn price_history_path(id: i64) -> String {
    format!("/products/{}/price-history", id)
}

/// Resolve the API base URL: `PRICE_TRACKER_API_URL` if set and non-empty,
/// otherwise [`DEFAULT_API_URL`].
pub fn default_api_url() -> String {
    match std::env::var(API_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => normalize_base_url(&url),
        _ => DEFAULT_API_URL.to_string(),
    }
}

/// Trim whitespace and trailing slashes so paths can be appended verbatim.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
