//! Page-numbered listing envelopes used by creator and template galleries.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not choose one.
pub const DEFAULT_PAGE_LIMIT: u32 = 12;
/// Largest page size the client will request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a page request, clamping `page` to at least 1 and `limit` to
    /// `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// One-based page number.
    pub fn page(self) -> u32 {
        self.page
    }

    /// Items per page.
    pub fn limit(self) -> u32 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_LIMIT)
    }
}

/// A page of results with navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    #[serde(rename = "data")]
    pub items: Vec<T>,
    /// One-based page number.
    pub current_page: u32,
    /// Number of pages available.
    pub total_pages: u32,
    /// Number of items across every page.
    pub total_count: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Slice `all` into the page selected by `request`.
    pub fn from_slice(all: &[T], request: PageRequest) -> Self
    where
        T: Clone,
    {
        let limit = request.limit() as usize;
        let total_count = all.len();
        let total_pages = total_count.div_ceil(limit);
        let start = (request.page() as usize - 1).saturating_mul(limit);
        let items = all.iter().skip(start).take(limit).cloned().collect();
        Self {
            items,
            current_page: request.page(),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total_count: total_count as u64,
            has_next: request.page() < u32::try_from(total_pages).unwrap_or(u32::MAX),
            has_previous: request.page() > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page slicing.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PageRequest::new(1, 2), vec![1, 2], true, false)]
    #[case(PageRequest::new(3, 2), vec![5], false, true)]
    #[case(PageRequest::new(4, 2), vec![], false, true)]
    fn slices_pages_with_navigation_flags(
        #[case] request: PageRequest,
        #[case] expected: Vec<u8>,
        #[case] has_next: bool,
        #[case] has_previous: bool,
    ) {
        let page = Page::from_slice(&[1_u8, 2, 3, 4, 5], request);

        assert_eq!(page.items, expected);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.has_next, has_next);
        assert_eq!(page.has_previous, has_previous);
    }

    #[rstest]
    fn request_clamps_out_of_range_values() {
        let request = PageRequest::new(0, 1_000);

        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), MAX_PAGE_LIMIT);
    }
}
