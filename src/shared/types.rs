use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn total(total: i64) -> Self {
        Self {
            total,
            page: None,
            page_size: None,
            total_pages: None,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standard pagination query parameters for admin list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

/// Page selector for storefront listings whose page size is fixed
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.page_size)
    }
}

impl PageQuery {
    pub fn window(&self, page_size: i64) -> PageWindow {
        PageWindow::new(self.page, page_size)
    }
}

/// Normalised page position (1 <= page <= MAX_PAGE, 1 <= page_size <= MAX_PAGE_SIZE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
}

impl PageWindow {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// SQL OFFSET for this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// SQL LIMIT for this page
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub window: PageWindow,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, window: PageWindow) -> Self {
        Self {
            items,
            total,
            window,
        }
    }

    pub fn total_pages(&self) -> i64 {
        (self.total + self.window.page_size - 1) / self.window.page_size
    }

    pub fn meta(&self) -> Meta {
        Meta {
            total: self.total,
            page: Some(self.window.page),
            page_size: Some(self.window.page_size),
            total_pages: Some(self.total_pages()),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            window: self.window,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(page: Paginated<T>) -> Self {
        let meta = page.meta();
        Self::success(Some(page.items), None, Some(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_clamps_inputs() {
        let window = PageWindow::new(0, 1000);
        assert_eq!(window.page, 1);
        assert_eq!(window.limit(), MAX_PAGE_SIZE);
        assert_eq!(window.offset(), 0);

        let window = PageWindow::new(3, 9);
        assert_eq!(window.offset(), 18);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let window = PageWindow::new(i64::MAX, 9);
        assert_eq!(window.page, MAX_PAGE);
        assert_eq!(window.offset(), (MAX_PAGE - 1) * 9);

        let window = PaginationQuery {
            page: i64::MAX,
            page_size: i64::MAX,
        }
        .window();
        assert_eq!(window.offset(), (MAX_PAGE - 1) * MAX_PAGE_SIZE);

        let window = PageQuery { page: i64::MIN }.window(12);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Paginated<u8> = Paginated::new(vec![], 19, PageWindow::new(1, 9));
        assert_eq!(page.total_pages(), 3);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, PageWindow::new(1, 9));
        assert_eq!(empty.total_pages(), 0);
        assert_eq!(empty.meta().total, 0);
    }
}
