/// Pagination types shared by listing endpoints
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Requested page; both fields optional on the wire
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// One page of results with navigation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let limit = request.limit();
        let page = request.page();
        let total_pages = (total + i64::from(limit) - 1) / i64::from(limit);
        Self {
            data,
            meta: PageMeta {
                total,
                page,
                limit,
                total_pages,
                has_next_page: i64::from(page) < total_pages,
                has_previous_page: page > 1,
            },
        }
    }
}
