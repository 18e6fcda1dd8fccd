//! Catalog admin client library
//!
//! A Rust client for the product catalog admin API: authentication,
//! role-gated product management with soft delete and restore, image
//! uploads, user listing and the audit log. All durable state lives on the
//! server; this crate keeps the client-side view of it in sync.

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod navigation;
pub mod notify;
pub mod pagination;
pub mod products;
pub mod upload;
pub mod users;

use std::sync::Arc;

use crate::api::ApiClient;
use crate::audit::AuditLogView;
use crate::auth::{AuthStore, FileStorage, SessionHandle, SessionStorage};
use crate::config::AdminConfig;
use crate::error::Result;
use crate::navigation::{Navigator, Route};
use crate::notify::Toasts;
use crate::products::ProductStore;
use crate::users::UserDirectory;

/// The main entry point: one API client shared by every store
#[derive(Debug, Clone)]
pub struct CatalogAdmin {
    pub api: ApiClient,
    pub auth: AuthStore,
    pub products: ProductStore,
    pub audit: AuditLogView,
    pub users: UserDirectory,
    pub toasts: Toasts,
    pub navigator: Navigator,
}

impl CatalogAdmin {
    /// Create a client that persists its session to `config.session_path`
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_admin::{CatalogAdmin, config::AdminConfig};
    ///
    /// let config = AdminConfig::new("http://localhost:3001/api").unwrap();
    /// let admin = CatalogAdmin::new(config).unwrap();
    /// assert!(!admin.auth.is_authenticated());
    /// ```
    pub fn new(config: AdminConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(config.session_path.clone()));
        Self::with_storage(config, storage)
    }

    /// Create a client with a custom session backend
    pub fn with_storage(config: AdminConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let session = SessionHandle::new(storage);
        let navigator = Navigator::new(Route::Dashboard);
        let api = ApiClient::new(&config, session, navigator.clone())?;

        Ok(Self {
            auth: AuthStore::new(api.clone()),
            products: ProductStore::new(api.clone()),
            audit: AuditLogView::new(api.clone()),
            users: UserDirectory::new(api.clone()),
            toasts: Toasts::new(),
            navigator,
            api,
        })
    }

    /// Convenience function to create a client from `CATALOG_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(AdminConfig::from_env()?)
    }

    /// Restore the persisted session and land on the guarded version of `route`
    pub fn start(&self, route: Route) -> Route {
        let user = self.auth.initialize();
        self.navigator.visit(route, user.as_ref())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{Role, User};
    pub use crate::config::{AdminConfig, ClientOptions};
    pub use crate::error::{Error, Result};
    pub use crate::forms::ProductForm;
    pub use crate::navigation::Route;
    pub use crate::products::{FilterChange, Product, SortBy, SortOrder};
    pub use crate::CatalogAdmin;
}
