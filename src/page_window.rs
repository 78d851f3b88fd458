//! Page window selection.
//!
//! The classifier only ever sees a bounded prefix of a document: pages
//! `1..=min(4, page_count)`. A document whose only identifying page lies
//! beyond the window is expected to come back `Unclassified`.

use std::ops::RangeInclusive;

/// Maximum number of leading pages presented to classification.
pub const MAX_WINDOW_PAGES: u32 = 4;

/// A non-empty run of leading pages, `1..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    last: u32,
}

impl PageWindow {
    /// 1-based page numbers inside the window.
    pub fn pages(&self) -> RangeInclusive<u32> {
        1..=self.last
    }

    pub fn len(&self) -> usize {
        self.last as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages().contains(&page)
    }
}

/// Select the window for a document with `page_count` pages.
///
/// Returns `None` for an empty document.
pub fn select_window(page_count: u32) -> Option<PageWindow> {
    if page_count == 0 {
        return None;
    }
    Some(PageWindow {
        last: page_count.min(MAX_WINDOW_PAGES),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_documents_use_every_page() {
        let w = select_window(3).unwrap();
        assert_eq!(w.pages().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn long_documents_are_capped_at_four() {
        let w = select_window(12).unwrap();
        assert_eq!(w.pages().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_document_has_no_window() {
        assert_eq!(select_window(0), None);
    }

    #[test]
    fn page_five_is_outside_the_window() {
        let w = select_window(6).unwrap();
        assert!(w.contains(4));
        assert!(!w.contains(5));
    }
}
