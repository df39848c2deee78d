// LogDeck - app/state.rs
//
// Application state management. Holds the current file listing and its
// category tree, plus the loaded record set with its filter, sort, page and
// search state. Every mutation re-clamps the page window so the visible
// page is always within bounds.

use crate::app::debounce::SearchDebouncer;
use crate::core::classify::{self, ClassifyOptions};
use crate::core::filter::{self, FilterCriteria};
use crate::core::model::{CategoryTree, FileDescriptor, LoadProgress, RecordSet};
use crate::core::paginate::PageWindow;
use crate::core::sort::SortState;
use crate::core::view::{self, ViewResult};
use crate::util::constants::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE_MS};
use std::time::{Duration, Instant};

// =============================================================================
// File browser
// =============================================================================

/// Files of the selected source and the tree they classify into.
#[derive(Debug)]
pub struct SourceBrowser {
    options: ClassifyOptions,
    files: Vec<FileDescriptor>,
    tree: CategoryTree,
}

impl SourceBrowser {
    pub fn new(options: ClassifyOptions) -> Self {
        Self {
            options,
            files: Vec::new(),
            tree: CategoryTree::default(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.options.source_id
    }

    pub fn include_compressed(&self) -> bool {
        self.options.include_compressed
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Replace the listing and rebuild the tree.
    pub fn set_files(&mut self, files: Vec<FileDescriptor>) {
        self.files = files;
        self.reclassify();
    }

    /// Switch source. Drops the previous listing.
    pub fn set_source(&mut self, source_id: impl Into<String>, configured: Option<Vec<String>>) {
        self.options.source_id = source_id.into();
        self.options.configured_paths = configured;
        self.files.clear();
        self.reclassify();
    }

    /// Toggle compressed-file visibility and rebuild the tree.
    pub fn set_include_compressed(&mut self, include: bool) {
        if self.options.include_compressed != include {
            self.options.include_compressed = include;
            self.reclassify();
        }
    }

    /// Look up a listed file by path.
    pub fn file(&self, path: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|f| f.path == path)
    }

    fn reclassify(&mut self) {
        self.tree = classify::classify(&self.files, &self.options);
        tracing::debug!(
            source = %self.options.source_id,
            files = self.files.len(),
            categories = self.tree.categories.len(),
            unreadable = self.tree.unreadable.len(),
            "File tree rebuilt"
        );
    }
}

// =============================================================================
// Record view
// =============================================================================

/// The loaded record set and everything that shapes how it is shown.
#[derive(Debug)]
pub struct RecordView {
    loaded_path: Option<String>,
    records: RecordSet,
    criteria: FilterCriteria,
    sort: Option<SortState>,
    page: PageWindow,
    search: SearchDebouncer,
    filtered_count: usize,
}

impl Default for RecordView {
    fn default() -> Self {
        Self::new(
            DEFAULT_PAGE_SIZE,
            Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        )
    }
}

impl RecordView {
    pub fn new(page_size: usize, search_debounce: Duration) -> Self {
        Self {
            loaded_path: None,
            records: RecordSet::default(),
            criteria: FilterCriteria::default(),
            sort: None,
            page: PageWindow::new(1, page_size),
            search: SearchDebouncer::new(search_debounce),
            filtered_count: 0,
        }
    }

    /// Replace the record set wholesale. Filters, sort and page are kept;
    /// the page is re-clamped against the new filtered count.
    pub fn load(&mut self, path: impl Into<String>, records: RecordSet) {
        let path = path.into();
        tracing::info!(path = %path, records = records.records.len(), "Records loaded");
        self.loaded_path = Some(path);
        self.records = records;
        self.refresh();
    }

    /// Drop the loaded records and reset every view setting.
    pub fn clear(&mut self) {
        let page_size = self.page.page_size;
        self.loaded_path = None;
        self.records = RecordSet::default();
        self.criteria = FilterCriteria::default();
        self.sort = None;
        self.page = PageWindow::new(1, page_size);
        self.search.clear();
        self.filtered_count = 0;
    }

    pub fn loaded_path(&self) -> Option<&str> {
        self.loaded_path.as_deref()
    }

    pub fn columns(&self) -> Vec<String> {
        self.records.column_names()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> PageWindow {
        self.page
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered_count
    }

    /// Column header clicked.
    pub fn click_column(&mut self, column: &str) {
        let next = SortState::after_click(self.sort.as_ref(), column);
        tracing::debug!(column, direction = next.direction.label(), "Sort changed");
        self.sort = Some(next);
    }

    /// Sort by `state` directly (e.g. restored from CLI flags).
    pub fn set_sort(&mut self, state: Option<SortState>) {
        self.sort = state;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page.set_page_size(page_size, self.filtered_count);
    }

    pub fn go_to_page(&mut self, page_index: usize) {
        self.page.go_to(page_index, self.filtered_count);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.page_index + 1);
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.page.page_index.saturating_sub(1));
    }

    /// Edit the non-search criteria. Applied immediately.
    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut FilterCriteria)) {
        edit(&mut self.criteria);
        self.refresh();
    }

    /// Clear every criterion, search included.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.search.clear();
        self.refresh();
    }

    /// Search box keystroke. Takes effect once the input is at rest.
    pub fn type_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search.input(text, now);
    }

    /// Latest search box text, committed or not.
    pub fn search_input(&self) -> &str {
        self.search.current_input()
    }

    /// Drive the search debouncer. Returns true when the view changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let committed = self.search.poll(now).map(str::to_string);
        self.apply_search(committed)
    }

    /// Commit the pending search text immediately.
    pub fn commit_search(&mut self) -> bool {
        let committed = self.search.flush().map(str::to_string);
        self.apply_search(committed)
    }

    fn apply_search(&mut self, committed: Option<String>) -> bool {
        let Some(text) = committed else {
            return false;
        };
        self.criteria.search = if text.is_empty() { None } else { Some(text) };
        self.refresh();
        true
    }

    /// Recompute the filtered count and re-clamp the page.
    fn refresh(&mut self) {
        self.filtered_count = filter::apply_filters(&self.records.records, &self.criteria).len();
        self.page = self.page.clamped(self.filtered_count);
    }

    /// The current page.
    pub fn view(&self) -> ViewResult<'_> {
        view::apply_view(
            &self.records.records,
            &self.criteria,
            self.sort.as_ref(),
            self.page,
        )
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    pub browser: SourceBrowser,
    pub view: RecordView,

    /// Status message for the status line.
    pub status_message: String,

    /// Non-fatal problems reported by the collaborator.
    pub warnings: Vec<String>,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(options: ClassifyOptions, view: RecordView, debug_mode: bool) -> Self {
        Self {
            browser: SourceBrowser::new(options),
            view,
            status_message: "Ready. Select a source to list its log files.".to_string(),
            warnings: Vec::new(),
            debug_mode,
        }
    }

    /// Fold a load manager message into the state.
    pub fn apply_progress(&mut self, msg: LoadProgress) {
        match msg {
            LoadProgress::FilesListed {
                source_id, files, ..
            } => {
                if source_id != self.browser.source_id() {
                    tracing::debug!(source = %source_id, "Listing for inactive source ignored");
                    return;
                }
                self.browser.set_files(files);
                let tree = self.browser.tree();
                self.status_message = format!(
                    "{} files in {} categories",
                    tree.file_count(),
                    tree.categories.len()
                );
            }
            LoadProgress::RecordsLoaded { path, records, .. } => {
                let count = records.records.len();
                self.view.load(path.clone(), records);
                self.status_message = format!("{count} records from {path}");
            }
            LoadProgress::Failed { error, .. } => {
                tracing::warn!(error = %error, "Load failed");
                self.status_message = format!("Error: {error}");
                self.warnings.push(error.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogRecord;
    use crate::core::sort::SortDirection;
    use crate::util::error::BackendError;

    fn records(n: usize) -> RecordSet {
        RecordSet {
            records: (0..n)
                .map(|i| {
                    LogRecord::new()
                        .with("status", if i % 10 == 0 { 404 } else { 200 })
                        .with("message", format!("request {i}"))
                })
                .collect(),
            columns: vec!["status".to_string(), "message".to_string()],
        }
    }

    #[test]
    fn test_filter_change_clamps_page() {
        let mut view = RecordView::new(10, Duration::ZERO);
        view.load("/l/access.log", records(100));
        view.go_to_page(8);
        assert_eq!(view.page().page_index, 8);

        view.update_criteria(|c| c.http_code = Some([404].into_iter().collect()));
        assert_eq!(view.filtered_count(), 10);
        assert_eq!(view.page().page_index, 1);
        assert_eq!(view.view().page_items.len(), 10);
    }

    #[test]
    fn test_reload_keeps_criteria_and_sort() {
        let mut view = RecordView::new(50, Duration::ZERO);
        view.load("/l/a.log", records(20));
        view.click_column("status");
        view.update_criteria(|c| c.http_code = Some([404].into_iter().collect()));

        view.load("/l/b.log", records(40));
        assert_eq!(view.loaded_path(), Some("/l/b.log"));
        assert_eq!(view.filtered_count(), 4);
        assert_eq!(view.sort().map(|s| s.column.as_str()), Some("status"));
    }

    #[test]
    fn test_search_applies_after_debounce() {
        let t0 = Instant::now();
        let mut view = RecordView::new(50, Duration::from_millis(300));
        view.load("/l/a.log", records(30));

        view.type_search("request 1", t0);
        assert!(!view.tick(t0 + Duration::from_millis(100)));
        assert_eq!(view.filtered_count(), 30);
        assert_eq!(view.search_input(), "request 1");

        assert!(view.tick(t0 + Duration::from_millis(400)));
        // "request 1" and "request 10".."request 19"
        assert_eq!(view.filtered_count(), 11);

        view.type_search("", t0 + Duration::from_millis(500));
        assert!(view.commit_search());
        assert_eq!(view.criteria().search, None);
        assert_eq!(view.filtered_count(), 30);
    }

    #[test]
    fn test_click_column_cycles_direction() {
        let mut view = RecordView::default();
        view.click_column("timestamp");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Desc);
        view.click_column("timestamp");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Asc);
        view.click_column("host");
        assert_eq!(view.sort().unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn test_page_navigation_stays_in_bounds() {
        let mut view = RecordView::new(25, Duration::ZERO);
        view.load("/l/a.log", records(60));
        view.prev_page();
        assert_eq!(view.page().page_index, 1);
        view.next_page();
        view.next_page();
        view.next_page();
        assert_eq!(view.page().page_index, 3);
        view.set_page_size(100);
        assert_eq!(view.page().page_index, 1);
    }

    #[test]
    fn test_apply_progress_routes_messages() {
        let mut state = AppState::new(
            ClassifyOptions::for_source("system"),
            RecordView::default(),
            false,
        );
        state.apply_progress(LoadProgress::FilesListed {
            request_id: 1,
            source_id: "system".to_string(),
            files: vec![
                FileDescriptor::new("/var/log/syslog", "syslog", 100),
                FileDescriptor::new("/var/log/syslog.1", "syslog", 100),
            ],
        });
        assert_eq!(state.browser.tree().file_count(), 2);
        assert!(state.browser.file("/var/log/syslog.1").is_some());

        state.apply_progress(LoadProgress::FilesListed {
            request_id: 2,
            source_id: "nginx".to_string(),
            files: Vec::new(),
        });
        assert_eq!(state.browser.tree().file_count(), 2, "inactive source ignored");

        state.apply_progress(LoadProgress::RecordsLoaded {
            request_id: 3,
            path: "/var/log/syslog".to_string(),
            records: records(5),
        });
        assert_eq!(state.view.filtered_count(), 5);

        state.apply_progress(LoadProgress::Failed {
            request_id: 4,
            error: BackendError::UnknownSource {
                source_id: "boom".to_string(),
            },
        });
        assert_eq!(state.warnings, vec!["Unknown log source 'boom'".to_string()]);
    }

    #[test]
    fn test_compressed_toggle_reclassifies() {
        let mut browser = SourceBrowser::new(ClassifyOptions::for_source("system"));
        browser.set_files(vec![
            FileDescriptor::new("/var/log/syslog", "syslog", 10),
            FileDescriptor::new("/var/log/syslog.2.gz", "syslog", 10),
        ]);
        assert_eq!(browser.tree().file_count(), 1);
        browser.set_include_compressed(true);
        assert_eq!(browser.tree().file_count(), 2);
    }
}
