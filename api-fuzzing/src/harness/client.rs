// api-fuzzing/src/harness/client.rs
//! HTTP dispatcher for fuzzed requests
//!
//! Any HTTP status, 4xx and 5xx included, is a successful dispatch. Only
//! transport faults become a [`DispatchError`].

use crate::generators::CookieSet;
use crate::mutators::JsonBody;
use crate::reporters;
use crate::utils;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Method, Url};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures of a single request
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The target URL could not be parsed
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No response within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Any other request failure
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
}

/// One request assembled by a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    pub cookies: Option<CookieSet>,
    pub body: Option<JsonBody>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            cookies: None,
            body: None,
        }
    }

    pub fn with_cookies(mut self, cookies: Option<CookieSet>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_body(mut self, body: JsonBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response with its body fully read
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, empty when absent
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status signals a client or server error
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Blocking client bound to one base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DispatchError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL of a request path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request, without retries
    pub fn send(&self, request: &ApiRequest) -> Result<ApiResponse, DispatchError> {
        let url = self.url(&request.path);
        let parsed = Url::parse(&url).map_err(|e| DispatchError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = self.client.request(request.method.clone(), parsed);
        if let Some(header) = request.cookies.as_ref().and_then(CookieSet::header_value) {
            builder = builder.header(COOKIE, header);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().map_err(|e| self.classify(e))?.to_vec();

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }

    /// Send one request and print its outcome
    ///
    /// Failures are reported here and handed back for tallying only; callers
    /// are expected to carry on with the next request.
    pub fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, DispatchError> {
        let url = self.url(&request.path);

        if log::log_enabled!(log::Level::Debug) {
            let body = request
                .body
                .as_ref()
                .map(|b| serde_json::to_string(b).unwrap_or_default())
                .unwrap_or_default();
            log::debug!(
                "{} {} cookies={:?} body={}",
                request.method,
                url,
                request.cookies,
                utils::truncate_chars(&body, 200)
            );
        }

        let result = self.send(request);
        let report = match &result {
            Ok(response) => reporters::render_response(request.method.as_str(), &url, response),
            Err(err) => reporters::render_failure(request.method.as_str(), &url, err),
        };
        // One write per report keeps concurrent reports from interleaving
        println!("{}", report);

        result
    }

    fn classify(&self, err: reqwest::Error) -> DispatchError {
        if err.is_timeout() {
            DispatchError::Timeout(self.timeout)
        } else if err.is_connect() {
            DispatchError::Connect(err)
        } else if err.is_body() || err.is_decode() {
            DispatchError::Body(err)
        } else {
            DispatchError::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::generators::AuthState;
    use serde_json::json;
    use std::net::TcpListener;

    /// A local URL nothing is listening on
    fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}", port)
    }

    #[test]
    fn test_error_statuses_are_not_failures() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/admin/projects")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"boom"}"#)
            .create();

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let response = client
            .dispatch(&ApiRequest::new(Method::GET, "/api/admin/projects"))
            .unwrap();

        mock.assert();
        assert_eq!(response.status, 500);
        assert!(response.is_error());
        assert_eq!(response.content_type, "application/json");
        assert_eq!(response.text(), r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_cookies_and_body_are_sent() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/projects")
            .match_header("cookie", "auth_token=tok; csrftoken=csrf")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({ "title": "x", "goal": 0 })))
            .with_status(201)
            .create();

        let cookies = AuthState::Full.cookies(&Credentials::new("tok", "csrf"));
        let body = match json!({ "title": "x", "goal": 0 }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let request = ApiRequest::new(Method::POST, "/api/projects")
            .with_cookies(cookies)
            .with_body(body);

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let response = client.send(&request).unwrap();

        mock.assert();
        assert_eq!(response.status, 201);
        assert!(!response.is_error());
    }

    #[test]
    fn test_empty_cookie_jar_sends_no_cookie_header() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/user/contributions")
            .match_header("cookie", mockito::Matcher::Missing)
            .with_status(401)
            .create();

        let cookies = AuthState::EmptyJar.cookies(&Credentials::new("tok", "csrf"));
        let request = ApiRequest::new(Method::GET, "/api/user/contributions").with_cookies(cookies);

        let client = ApiClient::new(server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.send(&request).unwrap().status, 401);
        mock.assert();
    }

    #[test]
    fn test_unreachable_host_is_a_dispatch_error() {
        let client = ApiClient::new(unreachable_url(), Duration::from_secs(2)).unwrap();
        let result = client.dispatch(&ApiRequest::new(Method::GET, "/api/projects"));

        match result {
            Err(DispatchError::Connect(_)) | Err(DispatchError::Request(_)) => {}
            other => panic!("expected a transport failure, got {:?}", other),
        }
    }

    #[test]
    fn test_silent_server_times_out() {
        // Bound but never accepted: the handshake completes, no response ever comes
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let timeout = Duration::from_millis(300);

        let client = ApiClient::new(url, timeout).unwrap();
        let result = client.dispatch(&ApiRequest::new(Method::GET, "/api/projects"));

        match &result {
            Err(err @ DispatchError::Timeout(elapsed)) => {
                assert_eq!(*elapsed, timeout);
                let report = reporters::render_failure("GET", "http://x/api/projects", err);
                assert!(report.ends_with("  ↳ Request timed out after 300ms"));
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
        drop(listener);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url("/api/projects/abc"), "http://localhost:3000/api/projects/abc");
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_url_is_a_dispatch_error() {
        let client = ApiClient::new("not a url", Duration::from_secs(1)).unwrap();
        let result = client.send(&ApiRequest::new(Method::GET, "/api/projects"));
        assert!(matches!(result, Err(DispatchError::InvalidUrl { .. })));
    }
}
