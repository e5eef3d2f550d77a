//! Page request/response model.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::sorting::{SortField, parse_order_by};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 30;
/// Default upper bound for page sizes accepted from callers.
pub const MAX_PAGE_SIZE: u64 = 500;

/// Page parameters as they arrive from a caller (query string, CLI flags).
///
/// Turned into a [`Page`] by [`crate::config::PagingConfig::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (0-based).
    #[serde(default)]
    pub page_number: u64,
    /// Requested page size; the configured default applies when absent.
    #[serde(default)]
    pub page_size: Option<u64>,
    /// Comma-separated `"field direction"` ordering.
    #[serde(default)]
    pub order_by: Option<String>,
    /// Skip the total-count query.
    #[serde(default)]
    pub not_count: bool,
}

/// Combined page request and response for one paginated query.
///
/// The caller fills in the position, ordering and flags; the facade fills in
/// `count` and `items`. A page is used for exactly one query execution.
#[derive(Debug, Clone, Serialize)]
pub struct Page<E> {
    page_number: u64,
    page_size: u64,
    order_by: Vec<SortField>,
    disabled: bool,
    not_count: bool,
    count: Option<u64>,
    items: Vec<E>,
}

impl<E> Page<E> {
    /// Create an enabled page. `page_size` must be at least 1.
    pub fn new(page_number: u64, page_size: u64) -> AppResult<Self> {
        if page_size == 0 {
            return Err(AppError::validation(
                "page size must be at least 1 when pagination is enabled",
            ));
        }
        Ok(Self::sized(page_number, page_size))
    }

    /// Create a page with pagination disabled: every matching row is fetched.
    pub fn unpaged() -> Self {
        Self {
            page_number: 0,
            page_size: 0,
            order_by: Vec::new(),
            disabled: true,
            not_count: false,
            count: None,
            items: Vec::new(),
        }
    }

    pub(crate) fn sized(page_number: u64, page_size: u64) -> Self {
        debug_assert!(page_size >= 1);
        Self {
            page_number,
            page_size,
            order_by: Vec::new(),
            disabled: false,
            not_count: false,
            count: None,
            items: Vec::new(),
        }
    }

    /// Replace the ordering.
    pub fn with_order_by(mut self, order_by: Vec<SortField>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Replace the ordering with a parsed `"field direction, ..."` string.
    pub fn with_order_by_str(self, order_by: &str) -> Self {
        self.with_order_by(parse_order_by(order_by))
    }

    /// Skip (or re-enable) the total-count step.
    pub fn with_not_count(mut self, not_count: bool) -> Self {
        self.not_count = not_count;
        self
    }

    /// Seed the total count, for callers that skip the count step.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Page number (0-based).
    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    /// Page size; `0` only when pagination is disabled.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Requested ordering.
    pub fn order_by(&self) -> &[SortField] {
        &self.order_by
    }

    /// Whether pagination is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the count step is skipped.
    pub fn is_not_count(&self) -> bool {
        self.not_count
    }

    /// Whether the facade runs the count step for this page.
    pub fn needs_count(&self) -> bool {
        !self.disabled && !self.not_count
    }

    /// SQL `OFFSET`.
    pub fn first_result(&self) -> u64 {
        self.page_number.saturating_mul(self.page_size)
    }

    /// SQL `LIMIT`.
    pub fn max_results(&self) -> u64 {
        self.page_size
    }

    /// Total matching rows, once known.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Record the total matching rows.
    pub fn set_count(&mut self, count: u64) {
        self.count = Some(count);
    }

    /// Fetched rows.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    /// Record the fetched rows.
    pub fn set_items(&mut self, items: Vec<E>) {
        self.items = items;
    }

    /// Consume the page, keeping only its rows.
    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    /// Total number of pages; `1` when empty, unknown or unpaged.
    pub fn total_pages(&self) -> u64 {
        match self.count {
            Some(total) if total > 0 && !self.disabled => total.div_ceil(self.page_size),
            _ => 1,
        }
    }

    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        !self.disabled && self.page_number.saturating_add(1) < self.total_pages()
    }

    /// Whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        !self.disabled && self.page_number > 0
    }
}

impl<E> Default for Page<E> {
    fn default() -> Self {
        Self::sized(0, DEFAULT_PAGE_SIZE)
    }
}
