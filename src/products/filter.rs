//! Filter and pagination state for the product list

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Column to sort the product list by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Price,
    #[default]
    CreatedAt,
}

impl SortBy {
    /// Convert the sort key to its query representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Name => "name",
            SortBy::Price => "price",
            SortBy::CreatedAt => "created_at",
        }
    }
}

impl FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortBy::Name),
            "price" => Ok(SortBy::Price),
            "created_at" | "created" => Ok(SortBy::CreatedAt),
            other => Err(Error::general(format!("Unknown sort key: {}", other))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::general(format!("Unknown sort order: {}", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default page size of the product list
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// The active query of the product list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilters {
    pub search: String,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
    pub include_deleted: bool,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            include_deleted: false,
        }
    }
}

/// A partial update of [`ProductFilters`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChange {
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub include_deleted: Option<bool>,
}

impl FilterChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by);
        self.sort_order = Some(sort_order);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = Some(include_deleted);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ProductFilters {
    /// Merge a change into the filters.
    ///
    /// If any filter other than the page ends up with a different value the
    /// list starts over at page 1 and a page in the same change is ignored.
    /// A change that only moves the page keeps every other filter.
    ///
    /// Re-sending a filter with the value it already holds is not a change,
    /// so the current page is kept. Callers that want every search, sort or
    /// limit call to start over should pass `with_page(1)` alongside it.
    pub fn apply(&mut self, change: FilterChange) {
        let before = self.clone();

        if let Some(search) = change.search {
            self.search = search;
        }
        if let Some(sort_by) = change.sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_order) = change.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(limit) = change.limit {
            self.limit = limit.max(1);
        }
        if let Some(include_deleted) = change.include_deleted {
            self.include_deleted = include_deleted;
        }

        let filters_changed = self.search != before.search
            || self.sort_by != before.sort_by
            || self.sort_order != before.sort_order
            || self.limit != before.limit
            || self.include_deleted != before.include_deleted;

        if filters_changed {
            self.page = 1;
        } else if let Some(page) = change.page {
            self.page = page.max(1);
        }
    }

    /// Restore the defaults, as the "clear filters" button does
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Query parameters for `GET /products`
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        let search = self.search.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        params.push(("sortBy", self.sort_by.as_str().to_string()));
        params.push(("sortOrder", self.sort_order.as_str().to_string()));
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        params.push(("includeDeleted", self.include_deleted.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changing_a_filter_resets_page() {
        let mut filters = ProductFilters {
            page: 4,
            ..ProductFilters::default()
        };
        filters.apply(FilterChange::new().with_search("lamp"));
        assert_eq!(filters.page, 1);
        assert_eq!(filters.search, "lamp");

        filters.page = 3;
        filters.apply(FilterChange::new().with_sort(SortBy::Price, SortOrder::Asc));
        assert_eq!(filters.page, 1);

        filters.page = 3;
        filters.apply(FilterChange::new().with_include_deleted(true).with_page(5));
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn changing_only_the_page_keeps_filters() {
        let mut filters = ProductFilters::default();
        filters.apply(
            FilterChange::new()
                .with_search("desk")
                .with_limit(25)
                .with_include_deleted(true),
        );
        filters.apply(FilterChange::page(3));

        assert_eq!(filters.page, 3);
        assert_eq!(filters.search, "desk");
        assert_eq!(filters.limit, 25);
        assert!(filters.include_deleted);
    }

    #[test]
    fn setting_a_filter_to_its_current_value_keeps_page() {
        let mut filters = ProductFilters {
            page: 2,
            ..ProductFilters::default()
        };
        filters.apply(FilterChange::new().with_sort(SortBy::CreatedAt, SortOrder::Desc));
        assert_eq!(filters.page, 2);
    }

    #[test]
    fn query_skips_empty_search() {
        let filters = ProductFilters::default();
        let query = filters.to_query();
        assert!(!query.iter().any(|(k, _)| *k == "search"));
        assert!(query.contains(&("sortBy", "created_at".to_string())));
        assert!(query.contains(&("sortOrder", "desc".to_string())));
        assert!(query.contains(&("includeDeleted", "false".to_string())));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut filters = ProductFilters::default();
        filters.apply(FilterChange::new().with_search("x").with_limit(50));
        filters.reset();
        assert_eq!(filters, ProductFilters::default());
    }
}
