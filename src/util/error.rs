// LogDeck - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The presentation engine itself never fails; these errors cover the
// fallible edges around it: configuration and the file/record collaborators.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogDeck operations.
#[derive(Debug)]
pub enum LogDeckError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// A file-listing or record-loading call failed.
    Backend(BackendError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogDeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Backend(e) => write!(f, "Backend error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogDeckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Backend(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Backend errors
// ---------------------------------------------------------------------------

/// Errors raised by `LogBackend` implementations.
#[derive(Debug)]
pub enum BackendError {
    /// The requested source identity is not served by this backend.
    UnknownSource { source_id: String },

    /// The source root or requested file does not exist.
    NotFound { path: PathBuf },

    /// The file exists but may not be loaded (unreadable or empty).
    NotSelectable { path: PathBuf, reason: &'static str },

    /// The record file is larger than the backend accepts.
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// Directory traversal failed.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// The record payload is not a valid JSON record set.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The collaborator did not answer in time.
    Timeout {
        operation: &'static str,
        timeout_secs: u64,
    },

    /// I/O error reading a listing or record file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSource { source_id } => {
                write!(f, "Unknown log source '{source_id}'")
            }
            Self::NotFound { path } => write!(f, "'{}' does not exist", path.display()),
            Self::NotSelectable { path, reason } => {
                write!(f, "'{}' cannot be loaded: {reason}", path.display())
            }
            Self::TooLarge { path, size, max } => write!(
                f,
                "'{}' is {size} bytes, exceeds maximum of {max} bytes",
                path.display()
            ),
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "Invalid record file '{}': {source}", path.display())
            }
            Self::Timeout {
                operation,
                timeout_secs,
            } => write!(f, "{operation} did not complete within {timeout_secs}s"),
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<BackendError> for LogDeckError {
    fn from(e: BackendError) -> Self {
        Self::Backend(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogDeckError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogDeck results.
pub type Result<T> = std::result::Result<T, LogDeckError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_backend_error_chain_preserved() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: LogDeckError = BackendError::Io {
            path: PathBuf::from("/var/log/auth.log"),
            source: io_err,
        }
        .into();

        let text = err.to_string();
        assert!(text.contains("auth.log"), "got: {text}");
        let backend = err.source().expect("backend source");
        assert!(backend.source().is_some(), "io source must be chained");
    }

    #[test]
    fn test_config_range_error_message() {
        let err = ConfigError::ValueOutOfRange {
            field: "view.page_size".to_string(),
            value: "0".to_string(),
            expected: "1-10000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Config 'view.page_size' = '0' is out of range. Expected: 1-10000"
        );
        assert!(err.source().is_none());
    }
}
