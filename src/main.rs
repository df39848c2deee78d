// LogDeck - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to the `tree` / `view` commands over local files

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use logdeck::app::commands::{self, ViewRequest};
use logdeck::core::classify::ClassifyOptions;
use logdeck::core::filter::FilterCriteria;
use logdeck::core::model::FileDescriptor;
use logdeck::core::sort::{SortDirection, SortState};
use logdeck::core::value;
use logdeck::platform::backend::{self, LocalBackend};
use logdeck::platform::config::{self, AppConfig, PlatformPaths};
use logdeck::util::constants;
use logdeck::util::error::{LogDeckError, Result};
use logdeck::util::logging;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Source id used when `view` reads a standalone record file.
const LOCAL_SOURCE_ID: &str = "local";

/// LogDeck - rotation-aware log file trees and typed record views.
#[derive(Parser, Debug)]
#[command(name = "logdeck", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the category tree of the log files under a directory.
    Tree {
        /// Directory to list.
        dir: PathBuf,

        /// Source the directory belongs to (system, apache, nginx, ...).
        #[arg(short = 's', long = "source")]
        source: Option<String>,

        /// Also show gzip-compressed archives.
        #[arg(long = "compressed")]
        compressed: bool,
    },

    /// Print one page of a record file.
    View(ViewArgs),
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Record file (`.json`) or a log file with a `.json` sidecar.
    path: PathBuf,

    /// Case-insensitive text search over every column.
    #[arg(long)]
    search: Option<String>,

    /// Include only these levels (repeatable).
    #[arg(long = "level")]
    levels: Vec<String>,

    /// Include only these HTTP status codes (repeatable).
    #[arg(long = "code")]
    codes: Vec<i64>,

    /// Include only these HTTP methods (repeatable).
    #[arg(long = "method")]
    methods: Vec<String>,

    /// Earliest timestamp to include.
    #[arg(long, value_parser = parse_time_arg)]
    from: Option<DateTime<Utc>>,

    /// Latest timestamp to include.
    #[arg(long, value_parser = parse_time_arg)]
    to: Option<DateTime<Utc>>,

    /// Hide raw lines the parser could not structure.
    #[arg(long = "hide-unparsed")]
    hide_unparsed: bool,

    /// Column to sort by.
    #[arg(long)]
    sort: Option<String>,

    /// Sort ascending.
    #[arg(long, conflicts_with = "desc")]
    asc: bool,

    /// Sort descending.
    #[arg(long)]
    desc: bool,

    /// 1-based page to show.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Records per page (defaults to the configured page size).
    #[arg(long = "page-size")]
    page_size: Option<usize>,
}

fn parse_time_arg(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    value::parse_timestamp_str(raw).ok_or_else(|| format!("unrecognised timestamp '{raw}'"))
}

impl ViewArgs {
    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria {
            search: self.search.clone().filter(|s| !s.is_empty()),
            date_from: self.from,
            date_to: self.to,
            show_unparsed: self.hide_unparsed.then_some(false),
            ..Default::default()
        };
        if !self.levels.is_empty() {
            criteria = criteria.with_levels(&self.levels);
        }
        if !self.codes.is_empty() {
            criteria = criteria.with_http_codes(self.codes.iter().copied());
        }
        if !self.methods.is_empty() {
            criteria = criteria.with_http_methods(&self.methods);
        }
        criteria
    }

    fn sort_state(&self) -> Option<SortState> {
        let column = self.sort.as_deref()?;
        Some(if self.asc {
            SortState::new(column, SortDirection::Asc)
        } else if self.desc {
            SortState::new(column, SortDirection::Desc)
        } else {
            SortState::for_column(column)
        })
    }
}

fn run_tree(
    config: &AppConfig,
    dir: &Path,
    source: Option<String>,
    compressed: bool,
) -> Result<()> {
    let source_id = source.unwrap_or_else(|| config.default_source.clone());
    let backend = LocalBackend::new().with_source(source_id.clone(), dir);
    let options = ClassifyOptions {
        include_compressed: compressed || config.include_compressed,
        configured_paths: config.configured_paths_for(&source_id),
        source_id,
    };

    let tree = commands::tree(Arc::new(backend), options)?;
    print!("{}", commands::render_tree(&tree));
    Ok(())
}

fn run_view(config: &AppConfig, args: &ViewArgs) -> Result<()> {
    let metadata = std::fs::metadata(&args.path).map_err(|source| LogDeckError::Io {
        path: args.path.clone(),
        operation: "stat",
        source,
    })?;
    let file_name = args
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let file = FileDescriptor::new(
        args.path.to_string_lossy().into_owned(),
        backend::infer_type(file_name),
        metadata.len(),
    );

    let root = args.path.parent().unwrap_or_else(|| Path::new("."));
    let local = LocalBackend::new().with_source(LOCAL_SOURCE_ID, root);

    let request = ViewRequest {
        criteria: args.criteria(),
        sort: args.sort_state(),
        page_index: args.page,
        page_size: args.page_size.unwrap_or(config.page_size),
    };

    let page = commands::view(
        Arc::new(local),
        LOCAL_SOURCE_ID,
        &file,
        request,
        Duration::from_millis(config.search_debounce_ms),
    )?;
    print!("{page}");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    // Initialise logging subsystem
    logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "LogDeck starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let result = match cli.command {
        Command::Tree {
            ref dir,
            ref source,
            compressed,
        } => run_tree(&app_config, dir, source.clone(), compressed),
        Command::View(ref args) => run_view(&app_config, args),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
