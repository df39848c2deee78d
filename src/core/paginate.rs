// LogDeck - core/paginate.rs
//
// Deterministic windowing of the filtered + sorted record sequence.
// Page indices are 1-based. The page count is always derived from the
// filtered count, and the index is clamped whenever that count or the page
// size changes so a stale page beyond the new bound is never shown.

use crate::util::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Current page position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// 1-based page index.
    pub page_index: usize,

    /// Records per page.
    pub page_size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `max(1, ceil(filtered / page_size))`.
pub fn page_count(filtered: usize, page_size: usize) -> usize {
    let size = clamp_page_size(page_size);
    filtered.div_ceil(size).max(1)
}

/// Keep a page size within `[MIN_PAGE_SIZE, MAX_PAGE_SIZE]`.
pub fn clamp_page_size(page_size: usize) -> usize {
    page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

impl PageWindow {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: clamp_page_size(page_size),
        }
    }

    /// Window with the index clamped into `[1, page_count(filtered)]`.
    pub fn clamped(self, filtered: usize) -> Self {
        let page_size = clamp_page_size(self.page_size);
        let last = page_count(filtered, page_size);
        Self {
            page_index: self.page_index.clamp(1, last),
            page_size,
        }
    }

    /// Change the page size and re-clamp against the filtered count.
    pub fn set_page_size(&mut self, page_size: usize, filtered: usize) {
        self.page_size = clamp_page_size(page_size);
        *self = self.clamped(filtered);
    }

    /// Move to `page_index`, clamped against the filtered count.
    pub fn go_to(&mut self, page_index: usize, filtered: usize) {
        self.page_index = page_index;
        *self = self.clamped(filtered);
    }

    /// Half-open index range `[start, end)` of this page within a sequence
    /// of `filtered` items. Assumes the window is already clamped.
    pub fn range(&self, filtered: usize) -> std::ops::Range<usize> {
        let size = clamp_page_size(self.page_size);
        let start = self.page_index.saturating_sub(1).saturating_mul(size);
        let end = start.saturating_add(size);
        start.min(filtered)..end.min(filtered)
    }

    /// The slice of `items` shown on this page.
    pub fn slice<'s, T>(&self, items: &'s [T]) -> &'s [T] {
        &items[self.range(items.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 50), 1, "empty set still has one page");
        assert_eq!(page_count(50, 50), 1);
        assert_eq!(page_count(51, 50), 2);
        assert_eq!(page_count(3, 100), 1);
        assert_eq!(page_count(10, 0), 10, "zero page size is treated as one");
    }

    #[test]
    fn test_slice_windows() {
        let items: Vec<u32> = (1..=7).collect();
        let w = PageWindow::new(2, 3);
        assert_eq!(w.slice(&items), &[4, 5, 6]);
        let last = PageWindow::new(3, 3);
        assert_eq!(last.slice(&items), &[7]);
        let beyond = PageWindow::new(9, 3);
        assert!(beyond.slice(&items).is_empty());
    }

    #[test]
    fn test_page_size_change_clamps_index() {
        let mut w = PageWindow::new(3, 50);
        w.set_page_size(100, 60);
        assert_eq!(w.page_index, 1);
        assert_eq!(w.page_size, 100);
    }

    #[test]
    fn test_shrinking_filtered_count_clamps_index() {
        let w = PageWindow::new(5, 10).clamped(23);
        assert_eq!(w.page_index, 3);
        let w = PageWindow::new(0, 10).clamped(23);
        assert_eq!(w.page_index, 1, "index is 1-based");
    }

    #[test]
    fn test_go_to() {
        let mut w = PageWindow::default();
        w.go_to(4, 120);
        assert_eq!(w.page_index, 3);
        w.go_to(2, 120);
        assert_eq!(w.page_index, 2);
    }
}
