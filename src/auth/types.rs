//! Types for authentication and user management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Role of a dashboard user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Admins create, edit, delete and restore products and see users and audit logs
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(Error::general(format!("Unknown role: {}", other))),
        }
    }
}

/// User data as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/signup`
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// `data` of the auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    pub user: User,
    /// `/auth/me` may leave the token out
    #[serde(default)]
    pub token: Option<String>,
}

/// Payload of the bearer token issued by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT.
    ///
    /// The signature is not verified; the server remains the authority and
    /// this is only used to show when the local session runs out.
    pub fn decode(token: &str) -> Result<Self, Error> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| Error::general("Token is not a JWT"))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| Error::general(format!("Token payload is not base64: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// When the token expires, if it says
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| now >= exp).unwrap_or(false)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decode_claims() {
        let token = token_with(json!({
            "userId": 7,
            "email": "admin@example.com",
            "role": "admin",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600
        }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Admin);

        let before = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        let after = Utc.timestamp_opt(1_700_003_600, 0).unwrap();
        assert!(!claims.is_expired_at(before));
        assert!(claims.is_expired_at(after));
    }

    #[test]
    fn claims_without_exp_never_expire() {
        let token = token_with(json!({ "userId": 1, "email": "u@example.com", "role": "user" }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert!(!claims.is_expired());
    }

    #[test]
    fn decode_rejects_opaque_tokens() {
        assert!(TokenClaims::decode("opaque-token").is_err());
    }

    #[test]
    fn role_parsing() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::User);
    }
}
