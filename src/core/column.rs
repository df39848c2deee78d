// LogDeck - core/column.rs
//
// Column type resolver. A single lookup table maps a column name to the
// semantic type used both by the sort engine and by cell formatting, so the
// two can never disagree about how a column behaves.

use crate::core::sort::SortDirection;
use serde::Serialize;

/// Semantic type of a record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Date,
    Number,
    Ip,
    Badge,
    Text,
}

const DATE_COLUMNS: &[&str] = &["timestamp", "date", "time"];

const NUMBER_COLUMNS: &[&str] = &[
    "status",
    "statuscode",
    "httpcode",
    "size",
    "responsetime",
    "pid",
    "tid",
    "port",
    "gzip",
    "upstreamstatus",
];

const IP_COLUMNS: &[&str] = &["ip", "ipaddress", "clientip", "remoteip"];

const BADGE_COLUMNS: &[&str] = &["level", "severity", "method", "httpmethod", "action"];

impl ColumnType {
    /// Resolve the type of `column` (case-insensitive). Unknown names are text.
    pub fn for_column(column: &str) -> Self {
        let name = column.to_ascii_lowercase();
        let name = name.as_str();
        if DATE_COLUMNS.contains(&name) {
            Self::Date
        } else if NUMBER_COLUMNS.contains(&name) {
            Self::Number
        } else if IP_COLUMNS.contains(&name) {
            Self::Ip
        } else if BADGE_COLUMNS.contains(&name) {
            Self::Badge
        } else {
            Self::Text
        }
    }

    /// Direction applied when a column of this type becomes the sort key.
    /// Text reads naturally A→Z; everything else shows newest/largest/most
    /// severe first.
    pub fn default_direction(self) -> SortDirection {
        match self {
            Self::Text => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    /// Lowercase type name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Number => "number",
            Self::Ip => "ip",
            Self::Badge => "badge",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
