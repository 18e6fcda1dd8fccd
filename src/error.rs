//! Error handling for the catalog admin client

use std::fmt;
use thiserror::Error;

use crate::forms::FormErrors;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the catalog admin client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Local file errors (session file, image files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The server rejected the credentials (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The current user lacks the role for this action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The server is throttling requests (HTTP 429)
    #[error("{}", rate_limit_message(.retry_after))]
    RateLimited {
        /// Seconds from the `Retry-After` header, if the server sent one
        retry_after: Option<u64>,
    },

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message from the response envelope, or the raw body
        message: String,
    },

    /// Form validation failed before anything was sent
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// The selected file is not an acceptable image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Session persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

pub(crate) fn rate_limit_message(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!("Rate limit exceeded. Please try again in {} seconds.", secs),
        None => "Rate limit exceeded. Please try again later.".to_string(),
    }
}

impl Error {
    /// Create a new unauthorized error
    pub fn unauthorized<T: fmt::Display>(msg: T) -> Self {
        Error::Unauthorized(msg.to_string())
    }

    /// Create a new forbidden error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new invalid image error
    pub fn invalid_image<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidImage(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Whether this error means the session is no longer valid
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }

    /// Short text suitable for a toast or an inline form error
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthorized(_) => "Your session has expired. Please log in again.".to_string(),
            Error::Forbidden(msg) | Error::InvalidImage(msg) | Error::General(msg) => msg.clone(),
            Error::RateLimited { retry_after } => rate_limit_message(retry_after),
            Error::Api { message, .. } => message.clone(),
            Error::Validation(errors) => errors.to_string(),
            Error::Http(e) if e.is_decode() => "Unexpected response from the server".to_string(),
            Error::Http(_) => "Could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_mentions_retry_after() {
        let err = Error::RateLimited { retry_after: Some(30) };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded. Please try again in 30 seconds."
        );

        let err = Error::RateLimited { retry_after: None };
        assert_eq!(err.user_message(), "Rate limit exceeded. Please try again later.");
    }

    #[test]
    fn api_error_user_message_is_server_message() {
        let err = Error::Api {
            status: 404,
            message: "Product not found".to_string(),
        };
        assert_eq!(err.user_message(), "Product not found");
        assert_eq!(err.to_string(), "API error (404): Product not found");
    }
}
