// LogDeck - core/rotation.rs
//
// File-name heuristics for rotated and compressed log files.
//
// Base-name extraction is an ordered table of strip rules, each applied at
// most once, left to right. Longer, more specific patterns come first so
// `access.log.2.gz` reduces to `access` instead of stopping at
// `access.log.2`. Core layer: pure logic, no I/O.

use crate::util::constants::{COMPRESSED_SUFFIXES, SUPPORTED_COMPRESSED_SUFFIXES};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// =============================================================================
// Strip rules
// =============================================================================

/// One `(pattern, replacement)` step of a stripping pipeline.
#[derive(Debug)]
pub struct StripRule {
    /// Short rule name for trace output and tests.
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl StripRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            // Patterns are compile-time literals covered by the unit tests.
            pattern: Regex::new(pattern).expect("strip rule pattern is valid"),
            replacement,
        }
    }

    /// Apply this rule once to `input`.
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern.replace(input, self.replacement)
    }

    /// True when this rule would change `input`.
    pub fn matches(&self, input: &str) -> bool {
        self.pattern.is_match(input)
    }
}

/// Rules that reduce a file name to its family base name.
static BASE_NAME_RULES: Lazy<Vec<StripRule>> = Lazy::new(|| {
    vec![
        StripRule::new("log-rotation", r"\.log\.\d+(?:\.(?:gz|bz2|xz))?$", ""),
        StripRule::new("numeric-rotation", r"\.\d+(?:\.(?:gz|bz2|xz))?$", ""),
        StripRule::new("date-suffix", r"[.-]\d{8}(?:\.(?:gz|bz2|xz))?$", ""),
        StripRule::new("compression", r"\.(?:gz|bz2|xz|zst|lz4|zip|7z)$", ""),
        StripRule::new("log-extension", r"\.log$", ""),
    ]
});

/// Rules that reduce a rotated path to the path of its current file
/// (`/var/log/auth.log.2.gz` → `/var/log/auth.log`). Unlike the base-name
/// rules the `.log` extension is kept.
static BASE_PATH_RULES: Lazy<Vec<StripRule>> = Lazy::new(|| {
    vec![
        StripRule::new("log-rotation", r"(\.log)\.\d+(?:\.(?:gz|bz2|xz))?$", "$1"),
        StripRule::new("numeric-rotation", r"\.\d+(?:\.(?:gz|bz2|xz))?$", ""),
        StripRule::new("date-suffix", r"[.-]\d{8}(?:\.(?:gz|bz2|xz))?$", ""),
        StripRule::new("compression", r"\.(?:gz|bz2|xz|zst|lz4|zip|7z)$", ""),
    ]
});

static ROTATED_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\d+(\.gz|\.bz2|\.xz)?$").expect("valid regex"));

static ROTATED_LOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.log\.\d+(\.gz|\.bz2|\.xz)?$").expect("valid regex"));

static INDEX_LOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.log\.(\d+)(?:\.(?:gz|bz2|xz))?$").expect("valid regex"));

static INDEX_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(\d+)(?:\.(?:gz|bz2|xz))?$").expect("valid regex"));

static INDEX_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.-](\d{8})(?:\.(?:gz|bz2|xz))?$").expect("valid regex"));

/// The base-name rule table, in application order.
pub fn base_name_rules() -> &'static [StripRule] {
    &BASE_NAME_RULES
}

fn run_rules(rules: &[StripRule], input: &str) -> String {
    let mut current = input.to_string();
    for rule in rules {
        if rule.matches(&current) {
            let next = rule.apply(&current).into_owned();
            tracing::trace!(rule = rule.name, from = %current, to = %next, "Strip rule applied");
            current = next;
        }
    }
    current
}

// =============================================================================
// Public helpers
// =============================================================================

/// Family base name of a file name: rotation index, date suffix, compression
/// suffix and `.log` extension stripped.
///
/// Names that would strip to nothing (e.g. `.log`) are returned unchanged.
pub fn base_name(file_name: &str) -> String {
    let stripped = run_rules(&BASE_NAME_RULES, file_name);
    if stripped.is_empty() {
        file_name.to_string()
    } else {
        stripped
    }
}

/// Path of the current (un-rotated) file a rotated path belongs to.
pub fn base_path(path: &str) -> String {
    run_rules(&BASE_PATH_RULES, path)
}

/// True iff the name still carries a numeric rotation suffix before an
/// optional compression suffix.
pub fn is_rotated(file_name: &str) -> bool {
    ROTATED_NUMERIC.is_match(file_name) || ROTATED_LOG.is_match(file_name)
}

/// True iff the name ends in an 8-digit date suffix (`.YYYYMMDD` or
/// `-YYYYMMDD`), optionally compressed.
pub fn has_date_suffix(file_name: &str) -> bool {
    INDEX_DATE.is_match(file_name)
}

/// Rotation index used to order members of a family.
///
/// Taken from a `.log.<n>` suffix, else a bare `.<n>` suffix, else an
/// 8-digit date suffix, else 0. Dates compare numerically, so later dates
/// sort after earlier ones and after any small rotation index.
pub fn rotation_index(file_name: &str) -> u64 {
    [&*INDEX_LOG, &*INDEX_NUMERIC, &*INDEX_DATE]
        .iter()
        .find_map(|re| re.captures(file_name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// The compression suffix of a file name, if any (case-insensitive).
pub fn compression_suffix(file_name: &str) -> Option<&'static str> {
    let lower = file_name.to_ascii_lowercase();
    COMPRESSED_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| lower.ends_with(suffix))
}

/// Compression display policy.
///
/// With `include_compressed` off every compressed variant is hidden; with it
/// on only the supported formats (gzip) are shown. Uncompressed files always
/// pass.
pub fn passes_compression_policy(file_name: &str, include_compressed: bool) -> bool {
    match compression_suffix(file_name) {
        None => true,
        Some(suffix) => include_compressed && SUPPORTED_COMPRESSED_SUFFIXES.contains(&suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_rotation_before_compression() {
        assert_eq!(base_name("access.log"), "access");
        assert_eq!(base_name("access.log.1"), "access");
        assert_eq!(base_name("access.log.2.gz"), "access");
        assert_eq!(base_name("syslog"), "syslog");
        assert_eq!(base_name("syslog.1"), "syslog");
        assert_eq!(base_name("messages.3.bz2"), "messages");
        assert_eq!(base_name("app.log.gz"), "app");
    }

    #[test]
    fn test_base_name_date_suffixes() {
        assert_eq!(base_name("access.log.20240101"), "access");
        assert_eq!(base_name("syslog-20240102"), "syslog");
        assert_eq!(base_name("secure-20240102.gz"), "secure");
        assert_eq!(base_name("access.log-20240101.gz"), "access");
    }

    #[test]
    fn test_base_name_keeps_domain_labels() {
        assert_eq!(
            base_name("error.mysite.example.com.log"),
            "error.mysite.example.com"
        );
        assert_eq!(base_name("access-shop.log.3"), "access-shop");
    }

    #[test]
    fn test_base_name_never_empty() {
        assert_eq!(base_name(".log"), ".log");
    }

    #[test]
    fn test_rules_in_isolation() {
        let rules = base_name_rules();
        let names: Vec<_> = rules.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "log-rotation",
                "numeric-rotation",
                "date-suffix",
                "compression",
                "log-extension"
            ]
        );
        assert_eq!(rules[0].apply("access.log.2.gz"), "access");
        assert_eq!(rules[1].apply("access.log.2.gz"), "access.log");
        assert_eq!(rules[3].apply("app.log.zst"), "app.log");
        assert!(!rules[2].matches("access.log.1"));
    }

    #[test]
    fn test_is_rotated() {
        assert!(!is_rotated("access.log"));
        assert!(is_rotated("access.log.1"));
        assert!(is_rotated("access.log.2.gz"));
        assert!(is_rotated("syslog.7"));
        assert!(!is_rotated("app.log.gz"), "compressed current file is not rotated");
        assert!(!is_rotated("syslog-20240101"), "dash date form is current");
    }

    #[test]
    fn test_rotation_index() {
        assert_eq!(rotation_index("access.log"), 0);
        assert_eq!(rotation_index("access.log.1"), 1);
        assert_eq!(rotation_index("access.log.12.gz"), 12);
        assert_eq!(rotation_index("syslog.3"), 3);
        assert_eq!(rotation_index("syslog-20240101"), 20_240_101);
        assert!(rotation_index("a.log.20240101") > rotation_index("a.log.9"));
    }

    #[test]
    fn test_has_date_suffix() {
        assert!(has_date_suffix("syslog-20240101"));
        assert!(has_date_suffix("messages.20240101.gz"));
        assert!(!has_date_suffix("syslog.1"));
        assert!(!has_date_suffix("syslog"));
    }

    #[test]
    fn test_base_path() {
        assert_eq!(base_path("/var/log/auth.log.2.gz"), "/var/log/auth.log");
        assert_eq!(base_path("/var/log/auth.log.1"), "/var/log/auth.log");
        assert_eq!(base_path("/var/log/syslog.1"), "/var/log/syslog");
        assert_eq!(base_path("/var/log/auth.log"), "/var/log/auth.log");
    }

    #[test]
    fn test_compression_policy() {
        assert!(passes_compression_policy("access.log", false));
        assert!(passes_compression_policy("access.log", true));
        assert!(!passes_compression_policy("access.log.2.gz", false));
        assert!(passes_compression_policy("access.log.2.gz", true));
        assert!(!passes_compression_policy("access.log.2.bz2", true));
        assert!(!passes_compression_policy("access.log.2.xz", true));
        assert!(!passes_compression_policy("ACCESS.LOG.2.ZST", true));
    }
}
