//! Pagination windower.
//!
//! Computes the bounded run of page links shown around the current page and
//! whether first/last links and ellipses surround it.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Page links to render for one result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Consecutive page numbers, ascending.
    pub pages: Vec<u32>,
    pub show_first: bool,
    pub leading_ellipsis: bool,
    pub show_last: bool,
    pub trailing_ellipsis: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<u32>,
    pub total_pages: u32,
}

impl PageWindow {
    /// Whether pagination should be rendered at all.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Window with the default size.
pub fn default_window(current_page: u32, total_pages: u32) -> PageWindow {
    window(current_page, total_pages, defaults::PAGE_WINDOW)
}

/// Compute the page window.
///
/// A single page (or none) yields an empty window. `size` and `current_page`
/// of zero are treated as one.
pub fn window(current_page: u32, total_pages: u32, size: u32) -> PageWindow {
    if total_pages <= 1 {
        return PageWindow {
            total_pages,
            ..PageWindow::default()
        };
    }

    let size = i64::from(size.max(1));
    let total = i64::from(total_pages);
    let current = i64::from(current_page.max(1));

    let mut start = (current - size / 2).clamp(1, total);
    let end = total.min(start + size - 1);
    if end - start < size - 1 {
        start = (end - size + 1).max(1);
    }

    // start..=end lies within 1..=total_pages, so the casts are lossless.
    let pages: Vec<u32> = (start..=end).map(|p| p as u32).collect();
    let current = current.min(total) as u32;

    PageWindow {
        pages,
        show_first: start > 1,
        leading_ellipsis: start > 2,
        show_last: end < total,
        trailing_ellipsis: end < total - 1,
        prev: (current > 1).then(|| current - 1),
        next: (current < total_pages).then(|| current + 1),
        total_pages,
    }
}
