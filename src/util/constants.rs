// LogDeck - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Classification tables live here too so the ordering rules are auditable
// in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogDeck";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogDeck";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Category names
// =============================================================================

/// Synthetic category for per-virtual-host / per-domain proxy logs.
pub const SUBDOMAIN_CATEGORY: &str = "subdomain";

/// Catch-all category for files whose type has no parser.
pub const UNPARSED_CATEGORY: &str = "unparsed";

/// Declared type of the host source's generic system logs. Files of this type
/// are subject to the non-system deny-list in host-restricted mode.
pub const GENERIC_SYSTEM_TYPE: &str = "system";

/// Parsed categories in display priority order.
///
/// `access` and `error` are listed late on purpose: when any file of either
/// type is present, both are promoted to the front (see `core::classify`).
/// Declared types outside this list are classified as `unparsed`.
pub const PARSED_CATEGORY_PRIORITY: &[&str] = &[
    "system", "auth", "syslog", "kernel", "daemon", "cron", "mail", "package", "boot", "audit",
    "custom", "access", "error",
];

/// Categories promoted to the front of the priority list when present.
pub const PROMOTED_CATEGORIES: &[&str] = &["access", "error"];

// =============================================================================
// Compression
// =============================================================================

/// Every compressed suffix the classifier recognises.
pub const COMPRESSED_SUFFIXES: &[&str] = &[".gz", ".bz2", ".xz", ".zst", ".lz4", ".zip", ".7z"];

/// Compressed suffixes that can still be displayed when "show compressed" is on.
/// All other compression formats are unsupported and always hidden.
pub const SUPPORTED_COMPRESSED_SUFFIXES: &[&str] = &[".gz"];

// =============================================================================
// Host-restricted mode
// =============================================================================

/// File-name globs that are never treated as generic system logs when the
/// host source runs with an explicit allow-list. These belong to applications
/// and services that have their own sources.
pub const NON_SYSTEM_LOG_DENYLIST: &[&str] = &[
    "access.log*",
    "error.log*",
    "app.log*",
    "application.log*",
    "nginx.log*",
    "apache*.log*",
    "httpd*.log*",
    "caddy*.log*",
    "traefik*.log*",
    "mysql*.log*",
    "mariadb*.log*",
    "postgresql*.log*",
    "mongod*.log*",
    "redis*.log*",
];

// =============================================================================
// View defaults and limits
// =============================================================================

/// Default number of records shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Minimum page size (a page must show at least one record).
pub const MIN_PAGE_SIZE: usize = 1;

/// Hard upper bound on page size.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Debounce delay in milliseconds for text search input.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Maximum user-configurable search debounce (ms).
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

/// Badge rank assigned to values outside the severity table.
pub const UNRANKED_BADGE: u8 = 99;

/// Epoch values with an absolute value above this are read as milliseconds
/// rather than seconds when coercing numeric timestamps.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 100_000_000_000.0;

// =============================================================================
// Local backend
// =============================================================================

/// Maximum directory recursion depth when listing a local source directory.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard upper bound on the number of files a local listing returns.
pub const MAX_LISTED_FILES: usize = 10_000;

/// Maximum size of a JSON record file accepted by the local backend.
pub const MAX_RECORD_FILE_BYTES: u64 = 256 * 1024 * 1024; // 256 MB

/// Extension of the JSON sidecar carrying pre-parsed records for a log file.
pub const RECORD_SIDECAR_EXTENSION: &str = "json";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Source used when neither the CLI nor config names one.
pub const DEFAULT_SOURCE_ID: &str = "system";
