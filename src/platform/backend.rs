// LogDeck - platform/backend.rs
//
// Local-filesystem implementation of the `LogBackend` collaborator.
//
// Each source id maps to a root directory. Listing walks the root and
// reports metadata only (path, size, mtime, readability) plus a declared
// type inferred from the file's base name. Records are read from a JSON
// `RecordSet` stored next to the log as `<log>.json`, or from the path
// itself when it already is a JSON file.

use crate::app::load::LogBackend;
use crate::core::model::{FileDescriptor, RecordSet};
use crate::core::rotation;
use crate::util::constants;
use crate::util::error::BackendError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Base-name patterns mapped to the declared type they imply. First match
/// wins; anything unmatched is a generic system log.
static TYPE_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"access", "access"),
        (r"error", "error"),
        (r"^(syslog|messages|user)$", "syslog"),
        (r"^(auth|secure)$", "auth"),
        (r"^(kern|kernel|dmesg)$", "kernel"),
        (r"^daemon$", "daemon"),
        (r"^cron$", "cron"),
        (r"^(mail|maillog|mail\.err|mail\.info)$", "mail"),
        (r"^(dpkg|yum|dnf|history|term|alternatives)$", "package"),
        (r"^boot$", "boot"),
        (r"^audit$", "audit"),
    ]
    .into_iter()
    .filter_map(|(pattern, file_type)| match Regex::new(pattern) {
        Ok(re) => Some((re, file_type)),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Invalid type rule skipped");
            None
        }
    })
    .collect()
});

/// Declared type for a file name, inferred from its base name.
pub fn infer_type(file_name: &str) -> &'static str {
    let base = rotation::base_name(file_name).to_ascii_lowercase();
    TYPE_RULES
        .iter()
        .find(|(re, _)| re.is_match(&base))
        .map_or(constants::GENERIC_SYSTEM_TYPE, |(_, t)| *t)
}

/// Serves one or more sources from local directories.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    roots: HashMap<String, PathBuf>,
    max_depth: usize,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self {
            roots: HashMap::new(),
            max_depth: constants::DEFAULT_MAX_DEPTH,
        }
    }
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `source_id` from `root`.
    pub fn with_source(mut self, source_id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(source_id.into(), root.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn root(&self, source_id: &str) -> Result<&Path, BackendError> {
        self.roots
            .get(source_id)
            .map(PathBuf::as_path)
            .ok_or_else(|| BackendError::UnknownSource {
                source_id: source_id.to_string(),
            })
    }
}

/// Where the records of `path` are stored.
pub fn record_file_for(path: &Path) -> PathBuf {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(constants::RECORD_SIDECAR_EXTENSION));
    if is_json {
        path.to_path_buf()
    } else {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(".");
        sidecar.push(constants::RECORD_SIDECAR_EXTENSION);
        PathBuf::from(sidecar)
    }
}

fn is_record_sidecar(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(constants::RECORD_SIDECAR_EXTENSION))
}

impl LogBackend for LocalBackend {
    fn list_files(&self, source_id: &str) -> Result<Vec<FileDescriptor>, BackendError> {
        let root = self.root(source_id)?;
        if !root.is_dir() {
            return Err(BackendError::NotFound {
                path: root.to_path_buf(),
            });
        }

        tracing::debug!(source = source_id, root = %root.display(), max_depth = self.max_depth, "Listing files");

        let mut files: Vec<FileDescriptor> = Vec::new();
        let walker = walkdir::WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => {
                    return Err(BackendError::Traversal {
                        path: root.to_path_buf(),
                        source: e,
                    });
                }
                Err(e) => {
                    // Inaccessible subtree: skip it, keep listing.
                    tracing::debug!(error = %e, "Skipping inaccessible entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::debug!(path = %path.display(), "Skipping non-UTF-8 filename");
                continue;
            };
            if is_record_sidecar(file_name) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Cannot read metadata");
                    continue;
                }
            };

            let mut descriptor = FileDescriptor::new(
                path.to_string_lossy().into_owned(),
                infer_type(file_name),
                metadata.len(),
            );
            descriptor.modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);
            descriptor.readable = std::fs::File::open(path).is_ok();

            tracing::trace!(path = %descriptor.path, file_type = %descriptor.file_type, size = descriptor.size, "File listed");
            files.push(descriptor);

            if files.len() >= constants::MAX_LISTED_FILES {
                tracing::warn!(
                    source = source_id,
                    limit = constants::MAX_LISTED_FILES,
                    "File listing limit reached; remaining files skipped"
                );
                break;
            }
        }

        tracing::info!(source = source_id, files = files.len(), "Files listed");
        Ok(files)
    }

    fn read_records(
        &self,
        source_id: &str,
        path: &str,
        file_type: &str,
    ) -> Result<RecordSet, BackendError> {
        self.root(source_id)?;
        let record_path = record_file_for(Path::new(path));

        let metadata = std::fs::metadata(&record_path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BackendError::NotFound {
                    path: record_path.clone(),
                }
            } else {
                BackendError::Io {
                    path: record_path.clone(),
                    source,
                }
            }
        })?;
        if metadata.len() > constants::MAX_RECORD_FILE_BYTES {
            return Err(BackendError::TooLarge {
                path: record_path,
                size: metadata.len(),
                max: constants::MAX_RECORD_FILE_BYTES,
            });
        }

        let set = read_record_file(&record_path)?;
        tracing::info!(
            path,
            file_type,
            records = set.records.len(),
            columns = set.columns.len(),
            "Records read"
        );
        Ok(set)
    }
}

/// Parse a JSON `RecordSet` file.
pub fn read_record_file(path: &Path) -> Result<RecordSet, BackendError> {
    let content = std::fs::read_to_string(path).map_err(|source| BackendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| BackendError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_infer_type_from_base_name() {
        assert_eq!(infer_type("access.log.2.gz"), "access");
        assert_eq!(infer_type("shop-error.log"), "error");
        assert_eq!(infer_type("syslog.1"), "syslog");
        assert_eq!(infer_type("auth.log"), "auth");
        assert_eq!(infer_type("kern.log"), "kernel");
        assert_eq!(infer_type("dpkg.log"), "package");
        assert_eq!(infer_type("something-else.log"), "system");
    }

    #[test]
    fn test_record_file_for() {
        assert_eq!(
            record_file_for(Path::new("/l/access.log")),
            PathBuf::from("/l/access.log.json")
        );
        assert_eq!(
            record_file_for(Path::new("/l/records.json")),
            PathBuf::from("/l/records.json")
        );
    }

    #[test]
    fn test_list_files_skips_sidecars_and_reports_sizes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("syslog"), "line\n").unwrap();
        fs::write(dir.path().join("syslog.json"), "{}").unwrap();
        fs::write(dir.path().join("empty.log"), "").unwrap();

        let backend = LocalBackend::new().with_source("system", dir.path());
        let files = backend.list_files("system").unwrap();
        assert_eq!(files.len(), 2);
        let empty = files.iter().find(|f| f.file_name() == "empty.log").unwrap();
        assert_eq!(empty.size, 0);
        assert!(!empty.is_selectable());
        let syslog = files.iter().find(|f| f.file_name() == "syslog").unwrap();
        assert_eq!(syslog.file_type, "syslog");
        assert!(syslog.modified_at.is_some());
    }

    #[test]
    fn test_unknown_source_and_missing_root() {
        let backend = LocalBackend::new().with_source("nginx", "/definitely/not/here");
        assert!(matches!(
            backend.list_files("apache"),
            Err(BackendError::UnknownSource { .. })
        ));
        assert!(matches!(
            backend.list_files("nginx"),
            Err(BackendError::NotFound { .. })
        ));
    }

    #[test]
    fn test_read_records_from_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("access.log");
        fs::write(&log, "raw\n").unwrap();
        fs::write(
            dir.path().join("access.log.json"),
            r#"{"records":[{"status":404,"method":"GET"},{"line":"junk","isParsed":false}],"columns":["status","method"]}"#,
        )
        .unwrap();

        let backend = LocalBackend::new().with_source("nginx", dir.path());
        let set = backend
            .read_records("nginx", &log.to_string_lossy(), "access")
            .unwrap();
        assert_eq!(set.records.len(), 2);
        assert_eq!(set.columns, vec!["status", "method"]);
        assert!(!set.records[1].is_parsed());
    }

    #[test]
    fn test_read_records_errors() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new().with_source("system", dir.path());

        let missing = dir.path().join("gone.log");
        assert!(matches!(
            backend.read_records("system", &missing.to_string_lossy(), "system"),
            Err(BackendError::NotFound { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(
            backend.read_records("system", &bad.to_string_lossy(), "system"),
            Err(BackendError::Json { .. })
        ));
    }
}
