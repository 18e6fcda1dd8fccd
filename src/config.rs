//! Configuration options for the catalog admin client

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Base URL used when `CATALOG_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Session file used when `CATALOG_SESSION_PATH` is not set
pub const DEFAULT_SESSION_PATH: &str = ".catalog-admin/session.json";

/// Configuration options for the HTTP layer and the stores
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Whether login/signup persist the session to storage
    pub persist_session: bool,

    /// Whether product list requests carry a `_t` timestamp parameter
    pub cache_busting: bool,

    /// The `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            persist_session: true,
            cache_busting: true,
            user_agent: format!("catalog-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set whether list requests are cache-busted
    pub fn with_cache_busting(mut self, value: bool) -> Self {
        self.cache_busting = value;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, value: &str) -> Self {
        self.user_agent = value.to_string();
        self
    }
}

/// Where the API lives and where the session is kept
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub api_url: Url,
    pub session_path: PathBuf,
    pub options: ClientOptions,
}

impl AdminConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::general(format!(
                "API URL cannot be used as a base: {}",
                api_url
            )));
        }
        Ok(Self {
            api_url,
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            options: ClientOptions::default(),
        })
    }

    /// Loads `.env` if present and reads the `CATALOG_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_url =
            std::env::var("CATALOG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url)?;

        if let Ok(path) = std::env::var("CATALOG_SESSION_PATH") {
            config.session_path = PathBuf::from(path);
        }

        if let Ok(secs) = std::env::var("CATALOG_REQUEST_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| {
                Error::general(format!("CATALOG_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.options = config
                .options
                .with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(config)
    }

    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_path = path.into();
        self
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Joins an endpoint path onto the API base, keeping the base path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_valid() {
        let config = AdminConfig::new("http://localhost:3001/api").unwrap();
        assert_eq!(config.endpoint("/products"), "http://localhost:3001/api/products");
        assert_eq!(config.endpoint("auth/me"), "http://localhost:3001/api/auth/me");
        assert!(config.options.persist_session);
    }

    #[test]
    fn config_new_invalid_url() {
        let config = AdminConfig::new("not a valid url");
        match config.err().unwrap() {
            Error::Url(_) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let config = AdminConfig::new("http://localhost:3001/api/").unwrap();
        assert_eq!(config.endpoint("/users"), "http://localhost:3001/api/users");
    }

    #[test]
    fn options_builder() {
        let options = ClientOptions::default()
            .with_cache_busting(false)
            .with_request_timeout(None)
            .with_user_agent("test-agent");
        assert!(!options.cache_busting);
        assert!(options.request_timeout.is_none());
        assert_eq!(options.user_agent, "test-agent");
    }
}
