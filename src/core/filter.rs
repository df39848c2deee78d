// LogDeck - core/filter.rs
//
// Composable filter engine for log records.
// All present criteria are AND-combined; absent criteria impose nothing.
// Core layer: pure logic, no I/O.

use crate::core::model::LogRecord;
use crate::core::value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Column aliases checked, in order, for a record's HTTP status code.
pub const HTTP_CODE_ALIASES: &[&str] = &["status", "statusCode", "status_code", "code", "httpCode"];

/// Column aliases checked, in order, for a record's HTTP method.
pub const HTTP_METHOD_ALIASES: &[&str] = &["method", "httpMethod", "http_method", "request_method"];

/// Complete filter state. All present fields are AND-combined when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against the whole serialised record.
    pub search: Option<String>,

    /// Levels to include, any case. `None` = all.
    pub level: Option<HashSet<String>>,

    /// Start of time range (inclusive).
    pub date_from: Option<DateTime<Utc>>,

    /// End of time range (inclusive).
    pub date_to: Option<DateTime<Utc>>,

    /// HTTP status codes to include.
    pub http_code: Option<HashSet<i64>>,

    /// HTTP methods to include, any case.
    pub http_method: Option<HashSet<String>>,

    /// `Some(false)` hides records flagged as raw, unparsed lines.
    pub show_unparsed: Option<bool>,
}

impl FilterCriteria {
    /// Returns true if no criterion is present.
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map_or(true, str::is_empty)
            && self.level.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.http_code.is_none()
            && self.http_method.is_none()
            && self.show_unparsed != Some(false)
    }

    /// Builder: level set (stored lowercase).
    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.level = Some(
            levels
                .into_iter()
                .map(|l| l.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    /// Builder: HTTP status code set.
    pub fn with_http_codes<I: IntoIterator<Item = i64>>(mut self, codes: I) -> Self {
        self.http_code = Some(codes.into_iter().collect());
        self
    }

    /// Builder: HTTP method set (stored uppercase).
    pub fn with_http_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.http_method = Some(
            methods
                .into_iter()
                .map(|m| m.as_ref().to_uppercase())
                .collect(),
        );
        self
    }

    /// Builder: search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Quick filter: errors only.
    pub fn errors_only() -> Self {
        Self::default().with_levels(["error", "err"])
    }

    /// Quick filter: errors and warnings.
    pub fn errors_and_warnings() -> Self {
        Self::default().with_levels(["error", "err", "warning", "warn"])
    }
}

/// Apply criteria to `records`, returning references to the matching ones
/// in input order.
pub fn apply_filters<'a>(records: &'a [LogRecord], criteria: &FilterCriteria) -> Vec<&'a LogRecord> {
    if criteria.is_empty() {
        return records.iter().collect();
    }

    let search_lower = criteria
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|record| matches_all(record, criteria, search_lower.as_deref()))
        .collect()
}

/// Case-insensitive membership; `set` may hold any case.
fn contains_folded(set: &HashSet<String>, value: &str) -> bool {
    let value = value.to_lowercase();
    set.iter().any(|entry| entry.to_lowercase() == value)
}

/// Check if a single record matches all present criteria.
pub fn matches_all(record: &LogRecord, criteria: &FilterCriteria, search_lower: Option<&str>) -> bool {
    // Raw-line filter
    if criteria.show_unparsed == Some(false) && !record.is_parsed() {
        return false;
    }

    // Level filter
    if let Some(ref levels) = criteria.level {
        match record.get("level") {
            Some(level) if contains_folded(levels, &level.to_string()) => {}
            _ => return false,
        }
    }

    // Time range filter
    if criteria.date_from.is_some() || criteria.date_to.is_some() {
        let Some(ts) = record.timestamp().and_then(value::parse_timestamp) else {
            return false; // No parseable timestamp: excluded from time filters
        };
        if criteria.date_from.is_some_and(|from| ts < from) {
            return false;
        }
        if criteria.date_to.is_some_and(|to| ts > to) {
            return false;
        }
    }

    // HTTP status code
    if let Some(ref codes) = criteria.http_code {
        match record
            .get_any(HTTP_CODE_ALIASES)
            .and_then(value::coerce_integer)
        {
            Some(code) if codes.contains(&code) => {}
            _ => return false,
        }
    }

    // HTTP method
    if let Some(ref methods) = criteria.http_method {
        match record.get_any(HTTP_METHOD_ALIASES) {
            Some(method) if contains_folded(methods, &method.to_string()) => {}
            _ => return false,
        }
    }

    // Text search over the whole record (every column, keys included)
    if let Some(needle) = search_lower {
        let haystack = serde_json::to_string(record)
            .unwrap_or_default()
            .to_lowercase();
        if !haystack.contains(needle) {
            return false;
        }
    }

    true
}
