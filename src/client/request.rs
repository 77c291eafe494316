//! Request descriptors and the generic request path
//!
//! Every backend interaction goes through `ApiClient::request`, which owns
//! the error-normalization contract: callers never see raw HTML or unbounded
//! error text, only `"{status}: {message}"`.

use std::sync::Arc;

use lazy_regex::regex_is_match;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::error::ApiError;
use crate::client::transport::{Method, RawResponse, Transport};

/// Longest error-body excerpt surfaced to the user
const ERROR_EXCERPT_CHARS: usize = 200;

/// One backend call: resource key (doubles as the cache key), verb, optional
/// JSON payload, extra headers
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub resource: Vec<String>,
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    fn new(method: Method, resource: &[&str]) -> Self {
        Self {
            resource: resource.iter().map(|s| s.to_string()).collect(),
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(resource: &[&str]) -> Self {
        Self::new(Method::Get, resource)
    }

    pub fn post(resource: &[&str], body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::Post, resource)
        }
    }

    pub fn put(resource: &[&str], body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new(Method::Put, resource)
        }
    }

    pub fn delete(resource: &[&str]) -> Self {
        Self::new(Method::Delete, resource)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Slash-joined resource key; identical keys share a cache entry
    pub fn cache_key(&self) -> String {
        self.resource.join("/")
    }
}

/// Thin client binding a transport to a backend base URL
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn url_for(&self, resource: &[String]) -> String {
        format!("{}/{}", self.base_url, resource.join("/"))
    }

    /// Issue the call and normalize the outcome. 2xx with an empty body maps
    /// to JSON null; any other 2xx body must parse as JSON.
    pub fn request(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        let url = self.url_for(&descriptor.resource);
        let body = descriptor.body.as_ref().map(|v| v.to_string());

        let response = self
            .transport
            .execute(descriptor.method, &url, &descriptor.headers, body.as_deref())?;

        if !(200..300).contains(&response.status) {
            return Err(normalize_failure(&response));
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
            resource: descriptor.cache_key(),
            detail: e.to_string(),
        })
    }

    /// `request` plus decode into the endpoint's schema
    pub fn fetch<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T, ApiError> {
        let value = self.request(descriptor)?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode {
            resource: descriptor.cache_key(),
            detail: e.to_string(),
        })
    }
}

/// Triple-tier message normalization for non-2xx responses:
/// structured JSON `message`/`error` field, then HTML detection (generic
/// message, markup never surfaces), then a bounded text excerpt, then the
/// canonical status reason.
fn normalize_failure(response: &RawResponse) -> ApiError {
    let body = response.body.trim();

    let message = if let Some(structured) = structured_message(body) {
        structured
    } else if regex_is_match!(r"(?i)^\s*(<!doctype|<html)", body) {
        "Server error occurred".to_string()
    } else if !body.is_empty() {
        body.chars().take(ERROR_EXCERPT_CHARS).collect()
    } else {
        status_reason(response.status)
    };

    ApiError::Status {
        status: response.status,
        message,
    }
}

fn structured_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn status_reason(status: u16) -> String {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}
