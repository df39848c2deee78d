// LogDeck - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers: the file
// listing collaborator produces `FileDescriptor`s, the record collaborator
// produces `RecordSet`s, and the engine derives `CategoryTree`s and pages
// of `LogRecord` references from them.

use crate::util::error::BackendError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// File Descriptor (input of classification)
// =============================================================================

/// One entry of a source's file listing.
///
/// An immutable snapshot handed over by the listing collaborator; replaced
/// wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Full path as reported by the source.
    pub path: String,

    /// Source-defined category such as "access", "auth" or "custom".
    #[serde(rename = "type")]
    pub file_type: String,

    /// File size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Last modification timestamp, if the source reports one.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// Whether the source can read the file.
    #[serde(default = "default_readable")]
    pub readable: bool,
}

fn default_readable() -> bool {
    true
}

impl FileDescriptor {
    /// Create a readable descriptor with no modification time.
    pub fn new(path: impl Into<String>, file_type: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            file_type: file_type.into(),
            size,
            modified_at: None,
            readable: true,
        }
    }

    /// Final path component. Both `/` and `\` are treated as separators
    /// because listings may come from a host with either convention.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(&['/', '\\'][..])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Only readable, non-empty files may be dispatched to the record loader.
    pub fn is_selectable(&self) -> bool {
        self.readable && self.size > 0
    }
}

// =============================================================================
// File groups and the category tree (output of classification)
// =============================================================================

/// A rotation family: the current file plus its numbered/compressed archives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    /// File name with rotation index, compression suffix and `.log` stripped.
    pub base_name: String,

    /// Category this group was filed under.
    pub category: String,

    /// Members, current file first, then ascending rotation index.
    /// Never empty.
    pub files: Vec<FileDescriptor>,

    /// True when any member carries a rotation suffix.
    pub is_rotated: bool,
}

impl FileGroup {
    /// The newest member of the family (the non-rotated file when present).
    pub fn current(&self) -> &FileDescriptor {
        &self.files[0]
    }
}

/// One top-level bucket of the file tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,
    pub groups: Vec<FileGroup>,
}

/// Ordered category → group tree that drives the file-selection UI.
///
/// Parsed categories come first in priority order, then `subdomain`, then
/// `unparsed`. Unreadable descriptors are segregated rather than grouped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTree {
    pub categories: Vec<Category>,

    /// Files the source reported as unreadable, in input order.
    pub unreadable: Vec<FileDescriptor>,
}

impl CategoryTree {
    /// True when the tree has no groups and no unreadable files.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.unreadable.is_empty()
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Category names in display order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of grouped files across all categories.
    pub fn file_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.groups.iter())
            .map(|g| g.files.len())
            .sum()
    }

    /// Find the group that contains `path`.
    pub fn find_group(&self, path: &str) -> Option<&FileGroup> {
        self.categories
            .iter()
            .flat_map(|c| c.groups.iter())
            .find(|g| g.files.iter().any(|f| f.path == path))
    }
}

// =============================================================================
// Log records (input of the view pipeline)
// =============================================================================

/// A scalar cell value of a parsed log record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

impl Serialize for FieldValue {
    /// Serialised as the bare scalar. Integral numbers are written without a
    /// fraction so text search over serialised records sees `404`, not `404.0`.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<serde_json::Value> for FieldValue {
    /// Nested arrays/objects are kept as their JSON text. Callers drop
    /// `null` before converting (null means the column is missing).
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Text(String::new()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// One parsed log line: an open column → value map.
///
/// A missing key means the column is undefined for this record. The reserved
/// `isParsed` flag marks raw, unstructured lines; the reserved `timestamp`
/// column is read through [`LogRecord::timestamp`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct LogRecord {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,

    #[serde(rename = "isParsed", skip_serializing_if = "Option::is_none")]
    pub is_parsed: Option<bool>,
}

/// Wire shape of a record before null columns are dropped.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(rename = "isParsed", default)]
    is_parsed: Option<bool>,

    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl From<RawRecord> for LogRecord {
    fn from(raw: RawRecord) -> Self {
        let fields = raw
            .fields
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, FieldValue::from(v)))
            .collect();
        Self {
            fields,
            is_parsed: raw.is_parsed,
        }
    }
}

impl LogRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// A raw line the upstream parser could not structure.
    pub fn unparsed(line: impl Into<String>) -> Self {
        Self::new().with("message", line.into()).parsed(false)
    }

    /// Builder: set a column value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Builder: set the reserved parsed flag.
    pub fn parsed(mut self, is_parsed: bool) -> Self {
        self.is_parsed = Some(is_parsed);
        self
    }

    /// Value of `column`. Exact key match first, then a case-insensitive one
    /// so column lists and record keys may disagree on casing.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column).or_else(|| {
            self.fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(column))
                .map(|(_, v)| v)
        })
    }

    /// First present value among several column aliases.
    pub fn get_any(&self, aliases: &[&str]) -> Option<&FieldValue> {
        aliases.iter().find_map(|alias| self.get(alias))
    }

    /// The reserved timestamp column, if present.
    pub fn timestamp(&self) -> Option<&FieldValue> {
        self.get("timestamp")
    }

    /// False only for records explicitly flagged as raw lines.
    pub fn is_parsed(&self) -> bool {
        self.is_parsed != Some(false)
    }
}

/// Payload of the record-loading collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub records: Vec<LogRecord>,

    #[serde(default)]
    pub columns: Vec<String>,
}

impl RecordSet {
    /// Declared columns, or the union of record keys (in first-seen order)
    /// when the payload did not declare any.
    pub fn column_names(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut seen: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.fields.keys() {
                if !seen.iter().any(|s| s == key) {
                    seen.push(key.clone());
                }
            }
        }
        seen
    }
}

// =============================================================================
// Load progress (for the owner of the view state)
// =============================================================================

/// Messages sent from a collaborator worker thread back to the owner.
///
/// Every message carries the id of the request that produced it so the owner
/// can drop stragglers from superseded requests.
#[derive(Debug)]
pub enum LoadProgress {
    /// A file listing completed.
    FilesListed {
        request_id: u64,
        source_id: String,
        files: Vec<FileDescriptor>,
    },

    /// A record load completed.
    RecordsLoaded {
        request_id: u64,
        path: String,
        records: RecordSet,
    },

    /// The collaborator call failed.
    Failed {
        request_id: u64,
        error: BackendError,
    },
}

impl LoadProgress {
    /// Id of the request this message answers.
    pub fn request_id(&self) -> u64 {
        match self {
            Self::FilesListed { request_id, .. }
            | Self::RecordsLoaded { request_id, .. }
            | Self::Failed { request_id, .. } => *request_id,
        }
    }
}
