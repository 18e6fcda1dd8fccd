//! Page metadata returned by the list endpoints

use serde::{Deserialize, Serialize};

/// Position of a page within a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// An empty first page of `limit` items
    pub fn empty(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
            total_pages: 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// 1-based indices of the first and last item on this page
    pub fn item_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 {
            return None;
        }
        let limit = u64::from(self.limit.max(1));
        let first = u64::from(self.page.saturating_sub(1)) * limit + 1;
        let last = (u64::from(self.page) * limit).min(self.total);
        (first <= last).then_some((first, last))
    }

    /// "Showing 11 to 20 of 42"
    pub fn summary(&self) -> String {
        match self.item_range() {
            Some((first, last)) => format!("Showing {} to {} of {}", first, last, self.total),
            None => "No results".to_string(),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::empty(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_middle_and_last_page() {
        let p = Pagination {
            page: 2,
            limit: 10,
            total: 25,
            total_pages: 3,
        };
        assert_eq!(p.summary(), "Showing 11 to 20 of 25");
        assert!(p.has_previous() && p.has_next());

        let last = Pagination { page: 3, ..p };
        assert_eq!(last.summary(), "Showing 21 to 25 of 25");
        assert!(!last.has_next());
    }

    #[test]
    fn empty_pagination() {
        let p = Pagination::empty(20);
        assert_eq!(p.summary(), "No results");
        assert!(!p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn deserializes_camel_case() {
        let p: Pagination =
            serde_json::from_str(r#"{"page":1,"limit":10,"total":3,"totalPages":1}"#).unwrap();
        assert_eq!(p.total_pages, 1);
    }
}
