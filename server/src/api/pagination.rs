use crate::config;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 6, max: 100)
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Page-number envelope used by all list endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of items across all pages
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

pub fn paginate<T>(path: &str, params: &PageParams, count: i64, results: Vec<T>) -> Paginated<T> {
    let page = params.page();
    let limit = params.limit();
    let next = (page * limit < count).then(|| page_url(path, page + 1, limit));
    let previous = (page > 1).then(|| page_url(path, page - 1, limit));
    Paginated {
        count,
        next,
        previous,
        results,
    }
}

fn page_url(path: &str, page: i64, limit: i64) -> String {
    format!("{}{}?page={}&limit={}", *config::BASE_URL, path, page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PageParams {
        PageParams { page, limit }
    }

    #[test]
    fn test_defaults_and_bounds() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);

        let p = params(Some(0), Some(0));
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);

        let p = params(Some(3), Some(1000));
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 2 * MAX_PAGE_SIZE);
    }

    #[test]
    fn test_first_page_has_no_previous() {
        let page = paginate("/api/users", &params(None, Some(2)), 5, vec![1, 2]);
        assert_eq!(page.count, 5);
        assert!(page.previous.is_none());
        assert!(page.next.is_some());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = paginate("/api/users", &params(Some(3), Some(2)), 5, vec![5]);
        assert!(page.next.is_none());
        assert!(page.previous.is_some());
    }

    #[test]
    fn test_single_page_has_no_links() {
        let page = paginate("/api/users", &params(None, None), 3, vec![1, 2, 3]);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn test_page_url_carries_page_and_limit() {
        let url = page_url("/api/recipes", 2, 6);
        assert!(url.ends_with("/api/recipes?page=2&limit=6"));
    }
}
