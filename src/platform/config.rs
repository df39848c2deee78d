// LogDeck - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogDeck configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logdeck/ or %APPDATA%\LogDeck\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[view]` section.
    pub view: ViewSection,
    /// `[sources.<id>]` sections.
    pub sources: HashMap<String, SourceSection>,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[view]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewSection {
    /// Records per page.
    pub page_size: Option<usize>,
    /// Search box debounce in ms.
    pub search_debounce_ms: Option<u64>,
    /// Show gzip-compressed archives in the file tree.
    pub include_compressed: Option<bool>,
    /// Source selected at startup.
    pub default_source: Option<String>,
}

/// `[sources.<id>]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Host-restricted allow-list. Only honoured for the host source.
    pub configured_paths: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- View --
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub include_compressed: bool,
    pub default_source: String,

    // -- Sources --
    /// Allow-lists keyed by source id.
    pub configured_paths: HashMap<String, Vec<String>>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_size: constants::DEFAULT_PAGE_SIZE,
            search_debounce_ms: constants::DEFAULT_SEARCH_DEBOUNCE_MS,
            include_compressed: false,
            default_source: constants::DEFAULT_SOURCE_ID.to_string(),
            configured_paths: HashMap::new(),
            log_level: None,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Allow-list configured for `source_id`, if any.
    pub fn configured_paths_for(&self, source_id: &str) -> Option<Vec<String>> {
        self.configured_paths.get(source_id).cloned()
    }
}

/// Read and parse `config.toml`. `Ok(None)` when the file does not exist.
pub fn read_raw_config(config_path: &Path) -> Result<Option<RawConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    let raw = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })?;
    Ok(Some(raw))
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults with a warning so the tool still
/// starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw = match read_raw_config(config_path) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
            return (AppConfig::default(), warnings);
        }
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- View: page_size --
    if let Some(size) = raw.view.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(out_of_range(
                "view.page_size",
                size,
                format!(
                    "{}-{}; using default ({})",
                    constants::MIN_PAGE_SIZE,
                    constants::MAX_PAGE_SIZE,
                    constants::DEFAULT_PAGE_SIZE
                ),
            ));
        }
    }

    // -- View: search_debounce_ms --
    if let Some(ms) = raw.view.search_debounce_ms {
        if ms <= constants::MAX_SEARCH_DEBOUNCE_MS {
            config.search_debounce_ms = ms;
        } else {
            warnings.push(out_of_range(
                "view.search_debounce_ms",
                ms,
                format!(
                    "0-{}; using default ({})",
                    constants::MAX_SEARCH_DEBOUNCE_MS,
                    constants::DEFAULT_SEARCH_DEBOUNCE_MS
                ),
            ));
        }
    }

    if let Some(include) = raw.view.include_compressed {
        config.include_compressed = include;
    }

    // -- View: default_source --
    if let Some(source) = raw.view.default_source {
        let source = source.trim();
        if source.is_empty() {
            warnings.push(format!(
                "[view] default_source is empty. Using default ({}).",
                constants::DEFAULT_SOURCE_ID
            ));
        } else {
            config.default_source = source.to_string();
        }
    }

    // -- Sources: configured_paths --
    for (source_id, section) in raw.sources {
        if let Some(paths) = section.configured_paths {
            let (absolute, relative): (Vec<String>, Vec<String>) =
                paths.into_iter().partition(|p| Path::new(p).is_absolute());
            for p in &relative {
                warnings.push(format!(
                    "[sources.{source_id}] configured path \"{p}\" is not absolute and was ignored."
                ));
            }
            config.configured_paths.insert(source_id, absolute);
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}
