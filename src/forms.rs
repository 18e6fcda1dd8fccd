//! Product create/edit form and its validation

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::products::{CreateProductRequest, Product, UpdateProductRequest};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const PRICE_NOT_POSITIVE: &str = "Price must be greater than 0";
pub const DESCRIPTION_REQUIRED: &str = "Description is required";

/// Field of the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Price,
    Description,
    ImageUrl,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Description => "description",
            Field::ImageUrl => "image_url",
        }
    }
}

/// Per-field error messages, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    errors: Vec<(Field, String)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    /// Remove the error of one field, as typing into it does
    pub fn clear_field(&mut self, field: Field) {
        self.errors.retain(|(f, _)| *f != field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|(_, m)| m.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Contents of the product form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

impl ProductForm {
    /// Form pre-filled from an existing product, for editing
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        if self.name.trim().is_empty() {
            errors.add(Field::Name, NAME_REQUIRED);
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            errors.add(Field::Price, PRICE_NOT_POSITIVE);
        }
        if self.description.trim().is_empty() {
            errors.add(Field::Description, DESCRIPTION_REQUIRED);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validated body for `POST /products`
    pub fn to_create(&self) -> Result<CreateProductRequest> {
        self.validate().map_err(Error::Validation)?;
        Ok(CreateProductRequest {
            name: self.name.trim().to_string(),
            price: self.price,
            description: Some(self.description.trim().to_string()),
            image_url: non_empty(&self.image_url),
        })
    }

    /// Validated body for `PUT /products/{id}`.
    ///
    /// An empty image URL is sent as `""` so the server drops the image.
    pub fn to_update(&self) -> Result<UpdateProductRequest> {
        self.validate().map_err(Error::Validation)?;
        Ok(UpdateProductRequest {
            name: Some(self.name.trim().to_string()),
            price: Some(self.price),
            description: Some(self.description.trim().to_string()),
            image_url: Some(self.image_url.trim().to_string()),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
