// LogDeck - core/view.rs
//
// The record view pipeline: filter → sort → paginate.
// Pure function over borrowed records; the caller owns all state.

use crate::core::filter::{self, FilterCriteria};
use crate::core::model::LogRecord;
use crate::core::paginate::{self, PageWindow};
use crate::core::sort::{self, SortState};

/// One computed page of the record view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewResult<'a> {
    /// Records on the requested page, in display order.
    pub page_items: Vec<&'a LogRecord>,

    /// Records surviving the filters.
    pub total_filtered: usize,

    /// Records before filtering. Lets callers tell "no data" from
    /// "everything filtered out".
    pub total_unfiltered: usize,

    /// Page count derived from `total_filtered`.
    pub page_count: usize,

    /// Page actually shown, after clamping.
    pub page_index: usize,
}

impl ViewResult<'_> {
    /// The loaded file has no records at all.
    pub fn is_no_data(&self) -> bool {
        self.total_unfiltered == 0
    }

    /// Records exist but none pass the filters.
    pub fn is_all_filtered_out(&self) -> bool {
        self.total_unfiltered > 0 && self.total_filtered == 0
    }
}

/// Filter, sort and window `records`.
///
/// `sort = None` keeps input order. `page` is clamped against the filtered
/// count before slicing; the clamped index is reported in the result.
pub fn apply_view<'a>(
    records: &'a [LogRecord],
    filters: &FilterCriteria,
    sort: Option<&SortState>,
    page: PageWindow,
) -> ViewResult<'a> {
    let filtered = filter::apply_filters(records, filters);
    let total_filtered = filtered.len();

    let ordered = match sort {
        Some(state) => sort::sort_records(filtered, state),
        None => filtered,
    };

    let window = page.clamped(total_filtered);
    let page_items = window.slice(&ordered).to_vec();

    tracing::debug!(
        total = records.len(),
        filtered = total_filtered,
        page = window.page_index,
        page_size = window.page_size,
        sort = sort.map(|s| s.column.as_str()).unwrap_or("<none>"),
        "View recomputed"
    );

    ViewResult {
        page_items,
        total_filtered,
        total_unfiltered: records.len(),
        page_count: paginate::page_count(total_filtered, window.page_size),
        page_index: window.page_index,
    }
}
