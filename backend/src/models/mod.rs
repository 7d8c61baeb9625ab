//! Data models shared across database access and API handlers.

use serde::{Deserialize, Serialize};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default: 1).
    #[serde(default = "default_page")]
    pub page: i64,
    /// Maximum number of records per page (default: 10, max: 100).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

impl PageQuery {
    /// Returns the page number, floored at 1.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Returns a clamped limit value (1..=100).
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }

    /// Number of records to skip for this page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

/// Pagination metadata returned alongside paged data.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: &PageQuery) -> Self {
        let limit = page.limit();
        Self {
            total,
            page: page.page(),
            limit,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

/// Wrapper for paginated API responses.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

pub mod api_key;
pub mod event;
pub mod update;
pub mod user;
