//! Audit log viewer

mod types;

pub use types::*;

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::ApiClient;
use crate::pagination::Pagination;

/// Point-in-time view of the audit log
#[derive(Debug, Clone, PartialEq)]
pub struct AuditState {
    pub logs: Vec<AuditLog>,
    pub pagination: Pagination,
    pub filters: AuditFilters,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for AuditState {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            pagination: Pagination::empty(DEFAULT_AUDIT_PAGE_SIZE),
            filters: AuditFilters::default(),
            is_loading: false,
            error: None,
        }
    }
}

/// Paginated, filterable view over `GET /audit`
#[derive(Debug, Clone)]
pub struct AuditLogView {
    api: ApiClient,
    state: Arc<RwLock<AuditState>>,
}

impl AuditLogView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuditState::default())),
        }
    }

    pub async fn snapshot(&self) -> AuditState {
        self.state.read().await.clone()
    }

    /// Change filters and go back to the first page
    pub async fn set_filter(&self, change: AuditFilterChange) {
        let mut state = self.state.write().await;
        let filters = &mut state.filters;
        if let Some(action) = change.action {
            filters.action = action;
        }
        if let Some(email) = change.user_email {
            filters.user_email = email;
        }
        if let Some(product_id) = change.product_id {
            filters.product_id = product_id;
        }
        if let Some(start) = change.start_date {
            filters.start_date = start;
        }
        if let Some(end) = change.end_date {
            filters.end_date = end;
        }
        if let Some(limit) = change.limit {
            filters.limit = limit.max(1);
        }
        filters.page = 1;
    }

    /// Change only the page
    pub async fn go_to_page(&self, page: u32) {
        self.state.write().await.filters.page = page.max(1);
    }

    pub async fn reset_filters(&self) {
        self.state.write().await.filters = AuditFilters::default();
    }

    /// Load the page described by the current filters
    pub async fn fetch(&self) {
        let filters = {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
            state.filters.clone()
        };

        let result = self.api.audit_logs(&filters).await;
        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(page) => {
                debug!(count = page.logs.len(), "audit logs loaded");
                state.logs = page.logs;
                state.pagination = page
                    .pagination
                    .unwrap_or_else(|| Pagination::empty(DEFAULT_AUDIT_PAGE_SIZE));
            }
            Err(e) => state.error = Some(e.user_message()),
        }
    }
}
