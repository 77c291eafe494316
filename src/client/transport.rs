//! HTTP transport seam
//!
//! Commands talk to the backend through the `Transport` trait so pipeline
//! tests can substitute canned responses without a server.

use std::time::Duration;

use ureq::Agent;

use crate::client::error::ApiError;

/// HTTP verbs the backend contract uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Status and body of an HTTP exchange, before normalization
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub trait Transport: Send + Sync {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> Result<RawResponse, ApiError>;
}

/// Production transport backed by a shared `ureq::Agent`.
///
/// The agent keeps a cookie jar (session credentials ride on cookies) and is
/// configured to hand back non-2xx responses instead of erroring, so their
/// bodies stay readable for error normalization.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: Agent::new_with_config(config),
        }
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        log::debug!("{} {}", method.as_str(), url);

        let result = match method {
            Method::Get | Method::Delete => {
                let mut request = match method {
                    Method::Get => self.agent.get(url),
                    _ => self.agent.delete(url),
                };
                for (name, value) in headers {
                    request = request.header(name.as_str(), value.as_str());
                }
                request.call()
            }
            Method::Post | Method::Put => {
                let mut request = match method {
                    Method::Post => self.agent.post(url),
                    _ => self.agent.put(url),
                };
                request = request.header("Content-Type", "application/json");
                for (name, value) in headers {
                    request = request.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(payload) => request.send(payload.as_bytes()),
                    None => request.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;

        log::debug!("{} {} -> {} ({} bytes)", method.as_str(), url, status, body.len());
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
pub mod mock {
    //! Canned transports for pipeline tests

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Returns the same response for every call and counts invocations
    pub struct FixedTransport {
        pub status: u16,
        pub body: String,
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl FixedTransport {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        pub fn with_delay(status: u16, body: &str, delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new(status, body)
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for FixedTransport {
        fn execute(
            &self,
            _method: Method,
            _url: &str,
            _headers: &[(String, String)],
            _body: Option<&str>,
        ) -> Result<RawResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    /// Echoes the request body back, recording what it saw
    pub struct EchoTransport {
        pub seen: Mutex<Vec<(Method, String, Option<String>)>>,
    }

    impl EchoTransport {
        pub fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for EchoTransport {
        fn execute(
            &self,
            method: Method,
            url: &str,
            _headers: &[(String, String)],
            body: Option<&str>,
        ) -> Result<RawResponse, ApiError> {
            self.seen
                .lock()
                .unwrap()
                .push((method, url.to_string(), body.map(str::to_string)));
            Ok(RawResponse {
                status: 200,
                body: body.unwrap_or("null").to_string(),
            })
        }
    }
}
