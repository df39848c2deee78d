// LogDeck - core/sort.rs
//
// Type-aware sort engine and the column-header direction state machine.
//
// Every record is first assigned a slot for the sort column:
//   - Ranked(key): a comparable value
//   - Unranked:    present but unusable (bad date, NaN, unknown badge)
//   - Missing:     the column is absent
// Ranked records are ordered by key and reversed for `desc`. Unranked and
// missing records are pinned to the tail in that order, in input order,
// whatever the direction. Core layer: pure logic, no I/O.

use crate::core::column::ColumnType;
use crate::core::model::{FieldValue, LogRecord};
use crate::core::value;
use crate::util::constants::UNRANKED_BADGE;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// =============================================================================
// Sort state
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The single active sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Sort on `column` with its type's default direction.
    pub fn for_column(column: impl Into<String>) -> Self {
        let column = column.into();
        let direction = ColumnType::for_column(&column).default_direction();
        Self { column, direction }
    }

    /// Type of the sort column.
    pub fn column_type(&self) -> ColumnType {
        ColumnType::for_column(&self.column)
    }

    /// Next state after a click on `column`'s header.
    ///
    /// Clicking the active column flips the direction; clicking another
    /// column starts at `desc`, or `asc` for text columns.
    pub fn after_click(current: Option<&SortState>, column: &str) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column: state.column.clone(),
                direction: state.direction.toggled(),
            },
            _ => SortState::for_column(column),
        }
    }
}

// =============================================================================
// Keys and slots
// =============================================================================

#[derive(Debug)]
enum SortKey {
    Date(i64),
    Number(f64),
    Ip(IpKey),
    Badge(u8),
    Text(String),
}

/// Dotted quads order by octet and come before every other address, which
/// order by raw text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum IpKey {
    V4([u32; 4]),
    Other(String),
}

impl IpKey {
    fn parse(raw: String) -> Self {
        match value::ipv4_octets(&raw) {
            Some(octets) => Self::V4(octets),
            None => Self::Other(raw),
        }
    }
}

/// Comparison key for text at base strength: case and accents are ignored.
fn collation_key(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug)]
enum Slot {
    Ranked(SortKey),
    Unranked,
    Missing,
}

/// Severity rank of a badge value; lower is more severe.
pub fn badge_rank(raw: &str) -> u8 {
    match raw.trim().to_ascii_lowercase().as_str() {
        "error" | "err" => 0,
        "warning" | "warn" => 1,
        "info" => 2,
        "notice" => 3,
        "debug" => 4,
        _ => UNRANKED_BADGE,
    }
}

fn slot_for(value: Option<&FieldValue>, column_type: ColumnType) -> Slot {
    let Some(value) = value else {
        return Slot::Missing;
    };

    match column_type {
        ColumnType::Date => match value::parse_timestamp(value) {
            Some(ts) => Slot::Ranked(SortKey::Date(ts.timestamp_millis())),
            None => Slot::Unranked,
        },
        ColumnType::Number => {
            let n = value::coerce_number(value);
            if n.is_nan() {
                Slot::Unranked
            } else {
                Slot::Ranked(SortKey::Number(n))
            }
        }
        ColumnType::Ip => Slot::Ranked(SortKey::Ip(IpKey::parse(value.to_string()))),
        ColumnType::Badge => match badge_rank(&value.to_string()) {
            UNRANKED_BADGE => Slot::Unranked,
            rank => Slot::Ranked(SortKey::Badge(rank)),
        },
        ColumnType::Text => Slot::Ranked(SortKey::Text(collation_key(&value.to_string()))),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(y),
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Ip(x), SortKey::Ip(y)) => x.cmp(y),
        (SortKey::Badge(x), SortKey::Badge(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Order `records` by `state`, returning a new sequence of references.
///
/// Ties keep input order in both directions.
pub fn sort_records<'a>(records: Vec<&'a LogRecord>, state: &SortState) -> Vec<&'a LogRecord> {
    let column_type = state.column_type();
    let total = records.len();

    let mut ranked: Vec<(SortKey, &'a LogRecord)> = Vec::with_capacity(total);
    let mut unranked: Vec<&'a LogRecord> = Vec::new();
    let mut missing: Vec<&'a LogRecord> = Vec::new();

    for record in records {
        match slot_for(record.get(&state.column), column_type) {
            Slot::Ranked(key) => ranked.push((key, record)),
            Slot::Unranked => unranked.push(record),
            Slot::Missing => missing.push(record),
        }
    }

    match state.direction {
        SortDirection::Asc => ranked.sort_by(|(a, _), (b, _)| compare_keys(a, b)),
        SortDirection::Desc => ranked.sort_by(|(a, _), (b, _)| compare_keys(b, a)),
    }

    tracing::trace!(
        column = %state.column,
        column_type = %column_type,
        direction = state.direction.label(),
        ranked = ranked.len(),
        unranked = unranked.len(),
        missing = missing.len(),
        "Records sorted"
    );

    let mut out = Vec::with_capacity(total);
    out.extend(ranked.into_iter().map(|(_, r)| r));
    out.extend(unranked);
    out.extend(missing);
    out
}
