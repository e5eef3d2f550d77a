//! Paging configuration.

use serde::{Deserialize, Serialize};

use crate::types::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
use crate::types::sorting::parse_order_by;

/// Page size defaults applied to incoming page requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size used when a request does not name one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Upper bound for requested page sizes.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PagingConfig {
    /// Build a page, clamping the size into `1..=max_page_size`.
    pub fn page<E>(&self, page_number: u64, page_size: u64) -> Page<E> {
        let max = self.max_page_size.max(1);
        Page::sized(page_number, page_size.clamp(1, max))
    }

    /// Build a page from request parameters.
    pub fn resolve<E>(&self, request: &PageRequest) -> Page<E> {
        let size = request.page_size.unwrap_or(self.default_page_size);
        let page = self
            .page(request.page_number, size)
            .with_not_count(request.not_count);
        match request.order_by.as_deref() {
            Some(order_by) => page.with_order_by(parse_order_by(order_by)),
            None => page,
        }
    }
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}
