//! Product store: the visible product list and the actions on it
//!
//! Every successful mutation re-fetches the list with the filters that are
//! active at that moment, so the current page stays where it was.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::filter::{FilterChange, ProductFilters, DEFAULT_PAGE_SIZE};
use super::types::Product;
use crate::api::ApiClient;
use crate::error::Result;
use crate::forms::ProductForm;
use crate::pagination::Pagination;
use crate::upload::ImageFile;

/// Point-in-time view of the product store
#[derive(Debug, Clone, PartialEq)]
pub struct ProductState {
    pub products: Vec<Product>,
    pub pagination: Pagination,
    pub filters: ProductFilters,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for ProductState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            pagination: Pagination::empty(DEFAULT_PAGE_SIZE),
            filters: ProductFilters::default(),
            is_loading: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductStore {
    api: ApiClient,
    state: Arc<RwLock<ProductState>>,
}

impl ProductStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(ProductState::default())),
        }
    }

    pub async fn snapshot(&self) -> ProductState {
        self.state.read().await.clone()
    }

    pub async fn filters(&self) -> ProductFilters {
        self.state.read().await.filters.clone()
    }

    async fn start(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn fail(&self, message: String) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = Some(message);
    }

    /// Load the list with the current filters merged with `change`.
    ///
    /// Failures end up in [`ProductState::error`].
    pub async fn fetch_products(&self, change: Option<FilterChange>) {
        let filters = {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
            let mut filters = state.filters.clone();
            if let Some(change) = change {
                filters.apply(change);
            }
            filters
        };

        match self.api.list_products(&filters).await {
            Ok(response) => {
                let mut state = self.state.write().await;
                debug!(count = response.products.len(), page = filters.page, "products loaded");
                state.products = response.products;
                state.pagination = response
                    .pagination
                    .unwrap_or_else(|| Pagination::empty(DEFAULT_PAGE_SIZE));
                state.filters = filters;
                state.is_loading = false;
                state.error = None;
            }
            Err(e) => self.fail(e.user_message()).await,
        }
    }

    /// Re-fetch with the active filters, page included
    pub async fn refresh(&self) {
        self.fetch_products(None).await;
    }

    /// Move to another page, keeping the other filters
    pub async fn go_to_page(&self, page: u32) {
        self.fetch_products(Some(FilterChange::page(page))).await;
    }

    /// Validate the form, create the product and refresh the list
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product> {
        let request = form.to_create()?;
        self.start().await;
        match self.api.create_product(&request).await {
            Ok(product) => {
                info!(id = product.id, name = %product.name, "product created");
                self.refresh().await;
                Ok(product)
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    /// Validate the form, save it over product `id` and refresh the list
    pub async fn update_product(&self, id: i64, form: &ProductForm) -> Result<Product> {
        let request = form.to_update()?;
        self.start().await;
        match self.api.update_product(id, &request).await {
            Ok(product) => {
                info!(id, "product updated");
                self.refresh().await;
                Ok(product)
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    /// Soft delete and refresh the list
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.start().await;
        match self.api.delete_product(id).await {
            Ok(()) => {
                info!(id, "product deleted");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    pub async fn restore_product(&self, id: i64) -> Result<()> {
        self.start().await;
        match self.api.restore_product(id).await {
            Ok(()) => {
                info!(id, "product restored");
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    /// Attach an image to a product and refresh the list
    pub async fn upload_image(&self, id: i64, image: ImageFile) -> Result<Product> {
        self.start().await;
        match self.api.upload_product_image(id, image).await {
            Ok(upload) => {
                info!(id, url = %upload.image.url, "product image uploaded");
                self.refresh().await;
                Ok(upload.product)
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    pub async fn remove_image(&self, id: i64) -> Result<Product> {
        self.start().await;
        match self.api.delete_product_image(id).await {
            Ok(product) => {
                info!(id, "product image removed");
                self.refresh().await;
                Ok(product)
            }
            Err(e) => {
                self.fail(e.user_message()).await;
                Err(e)
            }
        }
    }

    /// Replace the list with the soft-deleted products
    pub async fn deleted_products(&self) {
        self.start().await;
        match self.api.deleted_products().await {
            Ok(products) => {
                let mut state = self.state.write().await;
                state.products = products;
                state.is_loading = false;
            }
            Err(e) => self.fail(e.user_message()).await,
        }
    }

    /// Replace the list with an admin name search
    pub async fn search_products(&self, name: &str) {
        self.start().await;
        match self.api.search_products(name).await {
            Ok(products) => {
                let mut state = self.state.write().await;
                state.products = products;
                state.is_loading = false;
            }
            Err(e) => self.fail(e.user_message()).await,
        }
    }

    /// Merge a change into the filters without fetching
    pub async fn set_filters(&self, change: FilterChange) {
        self.state.write().await.filters.apply(change);
    }

    /// Back to the default filters, then fetch
    pub async fn clear_filters(&self) {
        self.state.write().await.filters.reset();
        self.refresh().await;
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }
}
