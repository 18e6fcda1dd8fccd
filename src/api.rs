//! Client for the catalog REST API
//!
//! [`ApiClient`] is the single place where requests leave the process. It
//! attaches the bearer token of the current session to every request except
//! public product reads, and when the server answers 401 it drops the local
//! session and sends the navigator back to the login view.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::audit::{AuditFilters, AuditLogPage};
use crate::auth::{AuthData, LoginRequest, Role, SessionHandle, SignupRequest, User};
use crate::config::{AdminConfig, ClientOptions};
use crate::error::{Error, Result};
use crate::fetch::FetchBuilder;
use crate::navigation::Navigator;
use crate::products::{
    CreateProductRequest, Product, ProductFilters, ProductImageUpload, ProductListResponse,
    UpdateProductRequest,
};
use crate::upload::{ImageEnvelope, ImageFile, UploadedImage};

#[derive(Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

/// Product reads are public; everything under `/admin/` is not
pub fn is_public_route(method: &Method, path: &str) -> bool {
    *method == Method::GET && path.contains("/products") && !path.contains("/admin/")
}

/// HTTP client for every endpoint of the catalog API
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
    session: SessionHandle,
    navigator: Navigator,
    options: ClientOptions,
}

impl ApiClient {
    /// Create a client sharing `session` and `navigator` with the stores
    pub fn new(config: &AdminConfig, session: SessionHandle, navigator: Navigator) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.options.user_agent.clone());
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            http_client,
            session,
            navigator,
            options: config.options.clone(),
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> FetchBuilder<'_> {
        let url = self.get_url(path);
        let builder =
            FetchBuilder::new(&self.http_client, &url, method).header("accept", "application/json");

        if is_public_route(builder.method(), path) {
            return builder;
        }
        match self.session.token() {
            Some(token) => builder.bearer_auth(&token),
            None => builder,
        }
    }

    /// Drop the session and go to the login view when the server says 401
    fn intercept<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(Error::Unauthorized(ref message)) = result {
            warn!("request unauthorized: {}", message);
            if let Err(e) = self.session.clear() {
                warn!("failed to clear stored session: {}", e);
            }
            self.navigator.redirect_to_login();
        }
        result
    }

    async fn send<T: DeserializeOwned>(&self, req: FetchBuilder<'_>) -> Result<T> {
        let result = req.execute::<T>().await;
        self.intercept(result)
    }

    async fn send_empty(&self, req: FetchBuilder<'_>) -> Result<()> {
        let result = req.execute_empty().await;
        self.intercept(result)
    }

    // Auth endpoints

    /// Log in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthData> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self.request(Method::POST, "/auth/login").json(&body)?;
        self.send(req).await
    }

    /// Create an account
    pub async fn signup(&self, email: &str, password: &str, role: Option<Role>) -> Result<AuthData> {
        let body = SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        let req = self.request(Method::POST, "/auth/signup").json(&body)?;
        self.send(req).await
    }

    /// End the server-side session
    pub async fn logout(&self) -> Result<()> {
        let req = self.request(Method::POST, "/auth/logout");
        self.send_empty(req).await
    }

    /// Get the logged-in user
    pub async fn current_user(&self) -> Result<AuthData> {
        let req = self.request(Method::GET, "/auth/me");
        self.send(req).await
    }

    // Product endpoints

    /// List products matching `filters`
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<ProductListResponse> {
        let mut params: Vec<(&str, String)> = filters.to_query();
        if self.options.cache_busting {
            params.push(("_t", chrono::Utc::now().timestamp_millis().to_string()));
        }
        debug!(?filters, "listing products");
        let req = self.request(Method::GET, "/products").query(params);
        self.send(req).await
    }

    /// Get a product by ID
    pub async fn get_product(&self, id: i64) -> Result<Product> {
        let req = self.request(Method::GET, &format!("/products/{}", id));
        self.send(req).await
    }

    /// Create a product
    pub async fn create_product(&self, data: &CreateProductRequest) -> Result<Product> {
        let req = self.request(Method::POST, "/products").json(data)?;
        self.send(req).await
    }

    /// Update a product
    pub async fn update_product(&self, id: i64, data: &UpdateProductRequest) -> Result<Product> {
        let req = self
            .request(Method::PUT, &format!("/products/{}", id))
            .json(data)?;
        self.send(req).await
    }

    /// Soft delete
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let req = self.request(Method::DELETE, &format!("/products/{}", id));
        self.send_empty(req).await
    }

    /// Restore a soft-deleted product
    pub async fn restore_product(&self, id: i64) -> Result<()> {
        let req = self.request(Method::PATCH, &format!("/products/{}/restore", id));
        self.send_empty(req).await
    }

    /// List soft-deleted products
    pub async fn deleted_products(&self) -> Result<Vec<Product>> {
        let req = self.request(Method::GET, "/products/admin/deleted");
        self.send(req).await
    }

    /// Search products by name
    pub async fn search_products(&self, name: &str) -> Result<Vec<Product>> {
        let path = format!("/products/admin/search/{}", urlencoding::encode(name));
        let req = self.request(Method::GET, &path);
        self.send(req).await
    }

    // Upload endpoints

    /// Upload an image not yet tied to a product
    pub async fn upload_image(&self, image: ImageFile) -> Result<UploadedImage> {
        let form = image.into_form()?;
        let req = self.request(Method::POST, "/upload/image").multipart(form);
        let data: ImageEnvelope = self.send(req).await?;
        Ok(data.image)
    }

    /// Upload an image and attach it to a product
    pub async fn upload_product_image(&self, product_id: i64, image: ImageFile) -> Result<ProductImageUpload> {
        let form = image.into_form()?;
        let req = self
            .request(Method::POST, &format!("/upload/products/{}/image", product_id))
            .multipart(form);
        self.send(req).await
    }

    /// Remove the image of a product
    pub async fn delete_product_image(&self, product_id: i64) -> Result<Product> {
        let req = self.request(Method::DELETE, &format!("/upload/products/{}/image", product_id));
        let data: ProductEnvelope = self.send(req).await?;
        Ok(data.product)
    }

    // Admin views

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let req = self.request(Method::GET, "/users");
        let data: UsersEnvelope = self.send(req).await?;
        Ok(data.users)
    }

    /// Get a page of audit logs
    pub async fn audit_logs(&self, filters: &AuditFilters) -> Result<AuditLogPage> {
        let req = self.request(Method::GET, "/audit").query(filters.to_query());
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public_route(&Method::GET, "/products"));
        assert!(is_public_route(&Method::GET, "/products/12"));
        assert!(!is_public_route(&Method::GET, "/products/admin/deleted"));
        assert!(!is_public_route(&Method::GET, "/products/admin/search/lamp"));
        assert!(!is_public_route(&Method::POST, "/products"));
        assert!(!is_public_route(&Method::DELETE, "/products/12"));
        assert!(!is_public_route(&Method::GET, "/users"));
    }
}
