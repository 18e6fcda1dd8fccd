//! Types for audit log queries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::pagination::Pagination;

/// What happened to a product
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restore,
    /// Actions this client does not know about yet
    Other(String),
}

impl AuditAction {
    pub fn as_str(&self) -> &str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Restore => "RESTORE",
            AuditAction::Other(s) => s,
        }
    }
}

impl From<&str> for AuditAction {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => AuditAction::Create,
            "UPDATE" => AuditAction::Update,
            "DELETE" => AuditAction::Delete,
            "RESTORE" => AuditAction::Restore,
            _ => AuditAction::Other(s.to_string()),
        }
    }
}

impl FromStr for AuditAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(Error::general("Audit action cannot be empty"));
        }
        Ok(AuditAction::from(s.trim()))
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AuditAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AuditAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(AuditAction::from(s.as_str()))
    }
}

/// One entry of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub action: AuditAction,
    pub user_email: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Free-form; the server sends either a string or an object
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl AuditLog {
    /// Details as display text
    pub fn details_text(&self) -> Option<String> {
        match self.details.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Default page size of the audit log
pub const DEFAULT_AUDIT_PAGE_SIZE: u32 = 20;

/// Query of `GET /audit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFilters {
    pub action: Option<AuditAction>,
    pub user_email: Option<String>,
    pub product_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
    pub limit: u32,
}

impl Default for AuditFilters {
    fn default() -> Self {
        Self {
            action: None,
            user_email: None,
            product_id: None,
            start_date: None,
            end_date: None,
            page: 1,
            limit: DEFAULT_AUDIT_PAGE_SIZE,
        }
    }
}

impl AuditFilters {
    /// Query parameters, leaving out unset filters
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(action) = &self.action {
            params.push(("action", action.to_string()));
        }
        if let Some(email) = self.user_email.as_deref().map(str::trim) {
            if !email.is_empty() {
                params.push(("user_email", email.to_string()));
            }
        }
        if let Some(product_id) = self.product_id {
            params.push(("product_id", product_id.to_string()));
        }
        if let Some(date) = self.start_date {
            params.push(("start_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            params.push(("end_date", date.format("%Y-%m-%d").to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// A partial update of [`AuditFilters`]; `Some(None)` clears a filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilterChange {
    pub action: Option<Option<AuditAction>>,
    pub user_email: Option<Option<String>>,
    pub product_id: Option<Option<i64>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub limit: Option<u32>,
}

/// `data` of `GET /audit`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogPage {
    #[serde(default)]
    pub logs: Vec<AuditLog>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}
