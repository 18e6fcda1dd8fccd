//! HTTP request builder for the catalog API
//!
//! Every response from the API is wrapped in an envelope of the form
//! `{ "success": bool, "message": string?, "data": T }`. [`FetchBuilder`]
//! unwraps `data` on success and turns error statuses into [`Error`] values.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{rate_limit_message, Error, Result};

/// Response envelope shared by all endpoints
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Error body returned by the API on failure
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

enum Body {
    Json(Vec<u8>),
    Multipart(Form),
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Body>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        Self {
            client,
            url: url.to_string(),
            method,
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(mut self, token: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            self.headers.insert(AUTHORIZATION, value);
        }
        self
    }

    /// Append query parameters, keeping their order
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Add a multipart form body to the request
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Some(Body::Multipart(form));
        self
    }

    /// The HTTP method of this request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path component of the target URL
    pub fn path(&self) -> String {
        Url::parse(&self.url)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| self.url.clone())
    }

    /// Whether an Authorization header has been set
    pub fn has_auth(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }

    fn build(self) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self.client.request(self.method, url.as_str());
        req = req.headers(self.headers);

        match self.body {
            Some(Body::Json(body)) => {
                req = req
                    .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .body(body);
            }
            Some(Body::Multipart(form)) => {
                req = req.multipart(form);
            }
            None => {}
        }

        Ok(req)
    }

    /// Execute the request and return the `data` field of the envelope
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.execute_raw().await?;
        let response = check_status(response).await?;
        let envelope = response.json::<ApiEnvelope<T>>().await?;
        Ok(envelope.data)
    }

    /// Execute the request, checking the status but ignoring the body
    pub async fn execute_empty(self) -> Result<()> {
        let response = self.execute_raw().await?;
        check_status(response).await?;
        Ok(())
    }

    /// Execute the request and return the raw response
    pub async fn execute_raw(self) -> Result<Response> {
        let method = self.method.clone();
        let path = self.path();
        let req = self.build()?;
        debug!(%method, %path, "sending request");
        let response = req.send().await?;
        debug!(%method, %path, status = %response.status(), "received response");
        Ok(response)
    }
}

/// Map a non-success response to the matching [`Error`]
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let text = response.text().await.unwrap_or_default();
    let message = error_message(&text, status);

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Rate limit exceeded: {}", rate_limit_message(&retry_after));
            Error::RateLimited { retry_after }
        }
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn error_message(text: &str, status: StatusCode) -> String {
    let body = serde_json::from_str::<ErrorBody>(text).unwrap_or_default();
    body.message
        .or(body.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                format!("Request failed with status {}", status)
            } else {
                text.trim().to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_envelope_message() {
        let msg = error_message(
            r#"{"success":false,"message":"Invalid credentials"}"#,
            StatusCode::UNAUTHORIZED,
        );
        assert_eq!(msg, "Invalid credentials");

        let msg = error_message(r#"{"error":"Not found"}"#, StatusCode::NOT_FOUND);
        assert_eq!(msg, "Not found");
    }

    #[test]
    fn error_message_falls_back_to_body_or_status() {
        assert_eq!(
            error_message("upstream exploded", StatusCode::BAD_GATEWAY),
            "upstream exploded"
        );
        assert_eq!(
            error_message("", StatusCode::INTERNAL_SERVER_ERROR),
            "Request failed with status 500 Internal Server Error"
        );
    }

    #[test]
    fn builder_reports_path_and_auth() {
        let client = Client::new();
        let req = FetchBuilder::new(
            &client,
            "http://localhost:3001/api/products/admin/deleted",
            Method::GET,
        )
        .bearer_auth("token");
        assert_eq!(req.path(), "/api/products/admin/deleted");
        assert!(req.has_auth());
        assert_eq!(req.method(), &Method::GET);
    }
}
