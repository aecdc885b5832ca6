//! Shared pagination utilities
//!
//! List queries accept an optional page number and page size; responses
//! carry a metadata block describing the full result set.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not send one
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on the page size a caller may request
pub const MAX_PER_PAGE: i64 = 100;

/// Page and page-size parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// Requested page, 1-indexed; anything below 1 clamps to the first page
    pub fn page(&self) -> i64 {
        self.page.map_or(1, |page| page.max(1))
    }

    /// Requested page size, clamped to `1..=MAX_PER_PAGE`
    pub fn per_page(&self) -> i64 {
        self.per_page
            .map_or(DEFAULT_PER_PAGE, |n| n.clamp(1, MAX_PER_PAGE))
    }

    /// SQL OFFSET corresponding to the requested page
    pub fn offset(&self) -> i64 {
        self.per_page() * (self.page() - 1)
    }

    /// Reject out-of-range values instead of silently clamping.
    ///
    /// Used by queries that surface a 400 for bad paging input.
    pub fn validate(&self) -> Result<(), &'static str> {
        match (self.page, self.per_page) {
            (Some(page), _) if page < 1 => Err("Page must be greater than 0"),
            (_, Some(n)) if !(1..=MAX_PER_PAGE).contains(&n) => {
                Err("Per page must be between 1 and 100")
            },
            _ => Ok(()),
        }
    }
}

/// Result-set metadata attached to paginated responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        // Integer ceiling; zero rows means zero pages
        let pages = (total + per_page - 1) / per_page;

        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.per_page(), total)
    }
}

/// A page of items plus its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Paginated<T> {
    pub fn from_items(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationMetadata::from_params(params, total),
        }
    }
}
