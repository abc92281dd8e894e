//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Shortens a 0x-prefixed hash for display.
///
/// Usage in templates: `{{ txn.tx_hash|short_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn short_hash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(shorten(&value.to_string()))
}

/// Keep the first ten and last four characters of a long hex string.
fn shorten(hash: &str) -> String {
    if hash.len() <= 16 {
        return hash.to_string();
    }
    match (hash.get(..10), hash.get(hash.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{head}\u{2026}{tail}"),
        _ => hash.to_string(),
    }
}
