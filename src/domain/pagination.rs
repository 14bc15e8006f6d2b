//! Page-window math shared by the listing handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 20;

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_items_per_page() -> u32 {
    DEFAULT_ITEMS_PER_PAGE
}

/// Parameters accepted by every listing method.
///
/// Missing fields fall back to `page = 1` and `itemsPerPage = 20`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    #[schema(default = 1, minimum = 1)]
    pub page: u32,
    #[serde(default = "default_items_per_page")]
    #[schema(default = 20, minimum = 1)]
    pub items_per_page: u32,
    /// Optional filter applied before paging. Blank values are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl PaginationRequest {
    pub fn new(page: u32, items_per_page: u32) -> Self {
        Self {
            page,
            items_per_page,
            search_term: None,
        }
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// Rejects zero page numbers and zero-sized pages.
    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err(format!("page must be >= 1 (got {})", self.page));
        }
        if self.items_per_page < 1 {
            return Err(format!(
                "itemsPerPage must be >= 1 (got {})",
                self.items_per_page
            ));
        }
        Ok(())
    }

    /// The trimmed search term, or `None` when absent or blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Index of the first item on the requested page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)).saturating_mul(u64::from(self.items_per_page))
    }
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_ITEMS_PER_PAGE)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResult {
    pub page: u32,
    pub items_per_page: u32,
    /// Always at least 1, even for an empty result set.
    pub pages_total: u32,
}

/// Computes the pagination metadata for a result set of `total_items`.
///
/// `page` is echoed back unchanged; an out-of-range page is the caller's concern.
pub fn compute_pagination(total_items: u64, page: u32, items_per_page: u32) -> PaginationResult {
    let per_page = u64::from(items_per_page.max(1));
    let pages = total_items.div_ceil(per_page).max(1);
    PaginationResult {
        page,
        items_per_page,
        pages_total: u32::try_from(pages).unwrap_or(u32::MAX),
    }
}
