#![allow(dead_code)]

use std::sync::Arc;

use catalog_admin::auth::{MemoryStorage, SessionStorage, User};
use catalog_admin::config::{AdminConfig, ClientOptions};
use catalog_admin::CatalogAdmin;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn user_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "role": role,
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-01T09:00:00Z"
    })
}

pub fn user(id: i64, email: &str, role: &str) -> User {
    serde_json::from_value(user_json(id, email, role)).unwrap()
}

pub fn product_json(id: i64, name: &str, price: f64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "description": format!("{} description", name),
        "image_url": null,
        "created_by": 1,
        "creator_email": "admin@example.com",
        "is_deleted": false,
        "created_at": "2024-03-02T10:00:00Z",
        "updated_at": "2024-03-02T10:00:00Z"
    })
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn product_page(products: Vec<Value>, page: u32, total: u64) -> Value {
    envelope(json!({
        "products": products,
        "pagination": {
            "page": page,
            "limit": 10,
            "total": total,
            "totalPages": (total + 9) / 10
        }
    }))
}

pub fn config(server: &MockServer) -> AdminConfig {
    AdminConfig::new(&format!("{}/api", server.uri()))
        .unwrap()
        .with_options(ClientOptions::default().with_cache_busting(false))
}

/// Client with an in-memory session store
pub fn client(server: &MockServer) -> CatalogAdmin {
    client_with_storage(server, Arc::new(MemoryStorage::new()))
}

pub fn client_with_storage(server: &MockServer, storage: Arc<dyn SessionStorage>) -> CatalogAdmin {
    CatalogAdmin::with_storage(config(server), storage).unwrap()
}

/// Client already holding a session for a user with `role`
pub fn logged_in(server: &MockServer, role: &str) -> CatalogAdmin {
    let admin = client(server);
    admin
        .auth
        .set_user(user(1, &format!("{}@example.com", role), role), TOKEN.to_string());
    admin
}
