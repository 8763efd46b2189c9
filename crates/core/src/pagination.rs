//! Client-side pagination over an already loaded list
//!
//! Pure functions that derive page bounds and page counts from a total item
//! count and a fixed page size. The current page itself is owned by the
//! caller; nothing here keeps state between calls.

use std::ops::Range;

use serde::Serialize;

/// Number of posts shown per list page
pub const POSTS_PER_PAGE: usize = 4;

/// Error type for pagination operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
}

/// Bounds of one page: items `[start, end)` out of `total_pages` pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub total_pages: usize,
}

impl PageWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Pagination metadata for list output
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub limit: usize,
    pub next_page_command: Option<String>,
    pub prev_page_command: Option<String>,
}

/// Fixed-size page slicer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page_size: POSTS_PER_PAGE,
        }
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }

        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(total_items / page_size)`; zero when there are no items
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    /// Slice bounds for `current_page` (1-indexed), clamped to `[0, total_items]`
    ///
    /// A page past the end yields an empty window at `total_items`. Page `0`
    /// is treated as page `1`.
    pub fn window(&self, total_items: usize, current_page: usize) -> PageWindow {
        let start = current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(total_items);
        let end = start.saturating_add(self.page_size).min(total_items);

        PageWindow {
            start,
            end,
            total_pages: self.total_pages(total_items),
        }
    }

    /// Page after `current_page`, or `current_page` itself on the last page
    pub fn next_page(&self, total_items: usize, current_page: usize) -> usize {
        if current_page < self.total_pages(total_items) {
            current_page + 1
        } else {
            current_page
        }
    }

    /// Page before `current_page`, or `current_page` itself on the first page
    pub fn prev_page(&self, total_items: usize, current_page: usize) -> usize {
        if current_page > 1 && current_page <= self.total_pages(total_items) {
            current_page - 1
        } else {
            current_page
        }
    }

    /// Bring a user supplied page into `[1, total_pages]`
    ///
    /// An empty list has no pages; it stays on page 1.
    pub fn clamp_page(&self, total_items: usize, page: usize) -> usize {
        page.clamp(1, self.total_pages(total_items).max(1))
    }

    /// Pagination metadata with navigation commands
    pub fn info(&self, total_items: usize, current_page: usize) -> PaginationInfo {
        let total_pages = self.total_pages(total_items);
        let next = self.next_page(total_items, current_page);
        let prev = self.prev_page(total_items, current_page);

        PaginationInfo {
            current_page,
            total_pages,
            total_items,
            limit: self.page_size,
            next_page_command: (next != current_page).then(|| self.list_command(next)),
            prev_page_command: (prev != current_page).then(|| self.list_command(prev)),
        }
    }

    fn list_command(&self, page: usize) -> String {
        if self.page_size == POSTS_PER_PAGE {
            format!("wpblog list --page {page}")
        } else {
            format!("wpblog list --page {page} --limit {}", self.page_size)
        }
    }
}

/// Slice bounds for `current_page` using `page_size`
///
/// Shorthand for [`Paginator::window`]; a zero page size is rejected.
pub fn paginate(
    total_items: usize,
    page_size: usize,
    current_page: usize,
) -> Result<PageWindow, PaginationError> {
    Ok(Paginator::new(page_size)?.window(total_items, current_page))
}
