//! Types for product operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;
use crate::upload::UploadedImage;

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// ID of the user who created the product
    pub created_by: i64,
    #[serde(default)]
    pub creator_email: String,
    /// Soft-deleted products are hidden unless `includeDeleted` is requested
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /products`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `PUT /products/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
    }
}

/// `data` of `GET /products`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// `data` of `POST /upload/products/{id}/image`
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImageUpload {
    pub product: Product,
    pub image: UploadedImage,
}
