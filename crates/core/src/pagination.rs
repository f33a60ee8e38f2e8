//! Page-number pagination.
//!
//! Pages are 1-based and have a fixed size. A page token that is missing or
//! is not an integer resolves to the first page; an integer outside the
//! valid range (zero, negative, or past the end) resolves to the last page.
//! An empty sequence still has one page, so the last page is never page 0.
//!
//! The same [`PageWindow`] drives both in-memory slicing ([`Page::paginate`])
//! and SQL `LIMIT`/`OFFSET` ([`PageWindow::offset`], [`PageWindow::limit`]).

use serde::Serialize;

/// A raw page number as requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    requested: u64,
}

impl PageRequest {
    /// Request the first page.
    #[must_use]
    pub const fn first() -> Self {
        Self { requested: 1 }
    }

    /// Request the last page, whatever its number turns out to be.
    #[must_use]
    pub const fn last() -> Self {
        Self {
            requested: u64::MAX,
        }
    }

    /// Request a specific 1-based page number. `0` is out of range and
    /// means the last page.
    #[must_use]
    pub const fn number(number: u64) -> Self {
        if number == 0 {
            Self::last()
        } else {
            Self { requested: number }
        }
    }

    /// Interpret a page token from a query string.
    ///
    /// ```
    /// use purbeurre_core::PageRequest;
    ///
    /// assert_eq!(PageRequest::parse(Some("3")), PageRequest::number(3));
    /// assert_eq!(PageRequest::parse(Some("-1")), PageRequest::last());
    /// assert_eq!(PageRequest::parse(Some("abc")), PageRequest::first());
    /// assert_eq!(PageRequest::parse(None), PageRequest::first());
    /// ```
    #[must_use]
    pub fn parse(token: Option<&str>) -> Self {
        let Some(token) = token.map(str::trim) else {
            return Self::first();
        };

        let (negative, digits) = match token.as_bytes().first() {
            Some(b'-') => (true, token.get(1..).unwrap_or_default()),
            Some(b'+') => (false, token.get(1..).unwrap_or_default()),
            _ => (false, token),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Self::first();
        }

        if negative {
            return Self::last();
        }

        // Digits wider than u64 are a real integer, just far past the end.
        digits.parse::<u64>().map_or_else(|_| Self::last(), Self::number)
    }

    /// The requested page number before clamping.
    #[must_use]
    pub const fn requested(&self) -> u64 {
        self.requested
    }

    /// Clamp this request against a sequence of `total_items` split into
    /// pages of `page_size` items.
    ///
    /// A `page_size` of zero is treated as one.
    #[must_use]
    pub fn resolve(self, total_items: u64, page_size: u64) -> PageWindow {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size).max(1);
        PageWindow {
            number: self.requested.clamp(1, total_pages),
            page_size,
            total_pages,
            total_items,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// A resolved page: which page it is and how the sequence is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    number: u64,
    page_size: u64,
    total_pages: u64,
    total_items: u64,
}

impl PageWindow {
    /// The 1-based page number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of pages (at least 1).
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Number of items across all pages.
    #[must_use]
    pub const fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Index of the first item of this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number - 1) * self.page_size
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn next_page_number(&self) -> Option<u64> {
        if self.has_next() {
            Some(self.number + 1)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> Option<u64> {
        if self.has_previous() {
            Some(self.number - 1)
        } else {
            None
        }
    }
}

/// One page of items together with its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    window: PageWindow,
}

impl<T> Page<T> {
    /// Wrap items already fetched for `window` (e.g. by a `LIMIT`/`OFFSET` query).
    #[must_use]
    pub const fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self { items, window }
    }

    /// Slice an in-memory sequence down to the requested page.
    #[must_use]
    pub fn paginate(all: Vec<T>, request: PageRequest, page_size: u64) -> Self {
        let window = request.resolve(all.len() as u64, page_size);
        let skip = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self { items, window }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn window(&self) -> &PageWindow {
        &self.window
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items, keeping the window.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            window: self.window,
        }
    }
}
