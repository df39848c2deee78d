// LogDeck - app/commands.rs
//
// Headless drivers for the CLI subcommands. Each one runs the collaborator
// call through `LoadManager`, folds the answer into `AppState` the same way
// an interactive front end would, and renders the result as plain text.

use crate::app::load::{LoadManager, LogBackend};
use crate::app::state::{AppState, RecordView};
use crate::core::classify::ClassifyOptions;
use crate::core::filter::FilterCriteria;
use crate::core::model::{CategoryTree, FileDescriptor, LoadProgress};
use crate::core::sort::SortState;
use crate::core::view::ViewResult;
use crate::util::error::BackendError;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

/// How long a headless command waits for the collaborator.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything `view` needs besides the file itself.
#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    pub criteria: FilterCriteria,
    pub sort: Option<SortState>,
    pub page_index: usize,
    pub page_size: usize,
}

fn await_answer(
    manager: &mut LoadManager,
    operation: &'static str,
) -> Result<LoadProgress, BackendError> {
    match manager.wait(COMMAND_TIMEOUT) {
        Some(LoadProgress::Failed { error, .. }) => Err(error),
        Some(msg) => Ok(msg),
        None => {
            manager.cancel_all();
            Err(BackendError::Timeout {
                operation,
                timeout_secs: COMMAND_TIMEOUT.as_secs(),
            })
        }
    }
}

/// List and classify the files of a source.
pub fn tree(
    backend: Arc<dyn LogBackend>,
    options: ClassifyOptions,
) -> Result<CategoryTree, BackendError> {
    let mut manager = LoadManager::new(backend);
    let mut state = AppState::new(options, RecordView::default(), false);

    manager.request_files(state.browser.source_id());
    let answer = await_answer(&mut manager, "File listing")?;
    state.apply_progress(answer);
    Ok(state.browser.tree().clone())
}

/// Load one file's records and compute the requested page.
///
/// Returns the rendered page.
pub fn view(
    backend: Arc<dyn LogBackend>,
    source_id: &str,
    file: &FileDescriptor,
    request: ViewRequest,
    search_debounce: Duration,
) -> Result<String, BackendError> {
    let mut manager = LoadManager::new(backend);
    let mut records = RecordView::new(request.page_size, search_debounce);

    manager.request_records(source_id, file)?;
    let answer = await_answer(&mut manager, "Record load")?;
    if let LoadProgress::RecordsLoaded { path, records: set, .. } = answer {
        records.load(path, set);
    }

    records.update_criteria(|c| *c = request.criteria);
    records.set_sort(request.sort);
    records.go_to_page(request.page_index);

    let columns = records.columns();
    Ok(render_page(&columns, &records.view(), records.sort()))
}

// =============================================================================
// Plain-text rendering
// =============================================================================

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Render a category tree, one indented line per category, group and file.
pub fn render_tree(tree: &CategoryTree) -> String {
    let mut out = String::new();
    if tree.is_empty() {
        out.push_str("No log files found.\n");
        return out;
    }

    for category in &tree.categories {
        let _ = writeln!(out, "{} ({})", category.name, category.groups.len());
        for group in &category.groups {
            let marker = if group.is_rotated { " [rotated]" } else { "" };
            let _ = writeln!(out, "  {}{marker}", group.base_name);
            for file in &group.files {
                let _ = writeln!(out, "    {}  {}", file.path, human_size(file.size));
            }
        }
    }

    if !tree.unreadable.is_empty() {
        let _ = writeln!(out, "unreadable ({})", tree.unreadable.len());
        for file in &tree.unreadable {
            let _ = writeln!(out, "    {}", file.path);
        }
    }
    out
}

/// Render one page: header, rows, then a footer with counts.
pub fn render_page(columns: &[String], view: &ViewResult<'_>, sort: Option<&SortState>) -> String {
    let mut out = String::new();

    if view.is_no_data() {
        out.push_str("No records.\n");
        return out;
    }
    if view.is_all_filtered_out() {
        let _ = writeln!(
            out,
            "No records match the current filters ({} total).",
            view.total_unfiltered
        );
        return out;
    }

    let header: Vec<String> = columns
        .iter()
        .map(|c| match sort {
            Some(s) if s.column == *c => format!("{c} ({})", s.direction.label()),
            _ => c.clone(),
        })
        .collect();
    let _ = writeln!(out, "{}", header.join(" | "));

    for record in &view.page_items {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.get(c).map(ToString::to_string).unwrap_or_default())
            .collect();
        let _ = writeln!(out, "{}", cells.join(" | "));
    }

    let _ = writeln!(
        out,
        "Page {}/{} - {} of {} records",
        view.page_index, view.page_count, view.total_filtered, view.total_unfiltered
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{LogRecord, RecordSet};

    struct StaticBackend;

    impl LogBackend for StaticBackend {
        fn list_files(&self, _source_id: &str) -> Result<Vec<FileDescriptor>, BackendError> {
            Ok(vec![
                FileDescriptor::new("/var/log/nginx/access.log", "access", 2048),
                FileDescriptor::new("/var/log/nginx/access.log.1", "access", 100),
            ])
        }

        fn read_records(
            &self,
            _source_id: &str,
            _path: &str,
            _file_type: &str,
        ) -> Result<RecordSet, BackendError> {
            Ok(RecordSet {
                records: (1..=5)
                    .map(|i| LogRecord::new().with("status", 200 + i).with("path", format!("/p{i}")))
                    .collect(),
                columns: vec!["status".to_string(), "path".to_string()],
            })
        }
    }

    #[test]
    fn test_tree_command_renders_groups() {
        let tree = tree(Arc::new(StaticBackend), ClassifyOptions::for_source("nginx")).unwrap();
        let text = render_tree(&tree);
        assert!(text.starts_with("access (1)\n"));
        assert!(text.contains("  access [rotated]\n"));
        assert!(text.contains("/var/log/nginx/access.log  2.0 KB"));
    }

    #[test]
    fn test_view_command_sorts_and_pages() {
        let file = FileDescriptor::new("/var/log/nginx/access.log", "access", 10);
        let request = ViewRequest {
            sort: Some(SortState::for_column("status")),
            page_index: 1,
            page_size: 2,
            ..Default::default()
        };
        let text = view(Arc::new(StaticBackend), "nginx", &file, request, Duration::ZERO).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "status (desc) | path");
        assert_eq!(lines[1], "205 | /p5");
        assert_eq!(lines[2], "204 | /p4");
        assert_eq!(lines[3], "Page 1/3 - 5 of 5 records");
    }

    #[test]
    fn test_view_command_rejects_empty_file() {
        let file = FileDescriptor::new("/var/log/nginx/empty.log", "access", 0);
        let err = view(
            Arc::new(StaticBackend),
            "nginx",
            &file,
            ViewRequest::default(),
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, BackendError::NotSelectable { .. }));
    }
}
