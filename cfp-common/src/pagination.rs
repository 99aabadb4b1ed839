//! Pagination utilities for review listings

/// Page size used when the request doesn't name one
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size a request may ask for
pub const MAX_PER_PAGE: i64 = 100;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Rows per page
    pub per_page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Clamp a requested page size into `1..=MAX_PER_PAGE`
pub fn sanitize_per_page(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use cfp_common::pagination::calculate_pagination;
///
/// // 45 total results at 20 per page = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 2, 20);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 20);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(45, 99, 20);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 40);
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64, per_page: i64) -> Pagination {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_pages = (total_results + per_page - 1) / per_page;
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * per_page;

    Pagination {
        page,
        per_page,
        total_pages,
        offset,
    }
}
