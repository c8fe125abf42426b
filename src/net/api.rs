//! JSON request wrapper for the auth-aware API client.
//!
//! Every call gets `Content-Type: application/json` (callers may override it)
//! and, when a token is present, `Authorization: Bearer <token>`. The
//! authorization header is always set by the wrapper and replaces any
//! caller-supplied value.
//!
//! ERROR HANDLING
//! ==============
//! Bodies that are not valid JSON are treated as an empty object instead of
//! failing the call. A non-2xx status becomes [`ApiError::Status`] carrying
//! the body's `error.message`, or [`DEFAULT_ERROR_MESSAGE`] when absent.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{ApiError, DEFAULT_ERROR_MESSAGE};
use crate::config::ClientConfig;

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Per-call options merged over the wrapper defaults.
#[derive(Clone, Debug)]
pub struct RequestOptions {
    pub method: Method,
    /// Extra headers, applied in order after the default content type.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: Vec::new(), body: None }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// `POST` with a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self { method: Method::POST, headers: Vec::new(), body: Some(body) }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Thin wrapper over `reqwest::Client` bound to one API origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `config.base_url`, applying any configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = {
            let mut builder = builder;
            if let Some(timeout) = config.request_timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(timeout) = config.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder
        };
        let http = builder.build()?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Issue a request and return the parsed JSON body.
    ///
    /// An empty `token` sends no `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when no response arrives,
    /// [`ApiError::Status`] for non-2xx responses, and
    /// [`ApiError::InvalidHeader`] for malformed caller headers.
    pub async fn request(&self, token: &str, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let headers = build_headers(token, &options.headers)?;
        let url = self.url(path);
        tracing::debug!(method = %options.method, %url, authorized = !token.is_empty(), "api request");

        let mut request = self.http.request(options.method, &url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let data = parse_body(&bytes);

        if !status.is_success() {
            let (code, message) = error_details(&data);
            tracing::debug!(status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::Status { status: status.as_u16(), code, message });
        }

        Ok(data)
    }

    /// [`ApiClient::request`] followed by decoding into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`ApiClient::request`] returns, plus [`ApiError::Decode`]
    /// when the body does not match `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let data = self.request(token, path, options).await?;
        Ok(serde_json::from_value(data)?)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Merge default, caller and authorization headers in precedence order.
pub(crate) fn build_headers(token: &str, extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        headers.insert(name, value);
    }

    if !token.is_empty() {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

fn parse_body(bytes: &[u8]) -> Value {
    serde_json::from_slice::<Value>(bytes).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// Pull `error.code` and `error.message` out of a failure body. Each field is
/// read on its own so a malformed sibling never hides the other.
fn error_details(data: &Value) -> (Option<String>, String) {
    let code = data.pointer("/error/code").and_then(|code| match code {
        Value::String(code) => Some(code.clone()),
        Value::Number(code) => Some(code.to_string()),
        _ => None,
    });
    let message = data
        .pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE)
        .to_owned();
    (code, message)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
