//! Transport layer for gateway communication

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::SdkError;

/// HTTP method of a gateway request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read-only call
    Get,
    /// State-changing transaction
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// One request handed to a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Form fields sent as the request body
    pub form: Option<Vec<(String, String)>>,
}

impl TransportRequest {
    /// GET request without body
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            form: None,
        }
    }

    /// POST request with a form body
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: BTreeMap::new(),
            form: Some(form),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Look up a form field by name
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport trait for gateway communication (object-safe)
///
/// Implementations return the raw response body. Status codes are not
/// interpreted; the body is always handed back for envelope parsing.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the request and return the response body text
    async fn execute(&self, request: TransportRequest) -> Result<String, SdkError>;
}

#[derive(Debug, Clone)]
enum MockReply {
    Body(String),
    Fault(String),
}

/// Mock transport for testing
///
/// Replies are keyed by absolute URL. Clones share state, so a test can keep
/// a clone after moving the transport into a client and inspect the requests
/// it received.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `{"response": value}`
    pub fn set_response(&self, url: &str, response: Value) {
        let body = serde_json::json!({ "response": response }).to_string();
        self.insert(url, MockReply::Body(body));
    }

    /// Reply with `{"error": error}`
    pub fn set_error(&self, url: &str, error: Value) {
        let body = serde_json::json!({ "error": error }).to_string();
        self.insert(url, MockReply::Body(body));
    }

    /// Reply with a raw body
    pub fn set_body(&self, url: &str, body: impl Into<String>) {
        self.insert(url, MockReply::Body(body.into()));
    }

    /// Fail the request at the transport level
    pub fn set_fault(&self, url: &str, message: impl Into<String>) {
        self.insert(url, MockReply::Fault(message.into()));
    }

    /// All requests received so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned")
            .clone()
    }

    /// The most recent request
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests
            .lock()
            .expect("MockTransport mutex poisoned")
            .last()
            .cloned()
    }

    /// Clear registered replies and recorded requests
    ///
    /// # Panics
    ///
    /// Panics if the mutex is poisoned.
    pub fn clear(&self) {
        self.replies.lock().expect("MockTransport mutex poisoned").clear();
        self.requests.lock().expect("MockTransport mutex poisoned").clear();
    }

    fn insert(&self, url: &str, reply: MockReply) {
        self.replies
            .lock()
            .expect("MockTransport mutex poisoned")
            .insert(url.to_string(), reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> Result<String, SdkError> {
        let reply = self
            .replies
            .lock()
            .map_err(|_| SdkError::Transport("MockTransport mutex poisoned".to_string()))?
            .get(&request.url)
            .cloned();

        let url = request.url.clone();
        self.requests
            .lock()
            .map_err(|_| SdkError::Transport("MockTransport mutex poisoned".to_string()))?
            .push(request);

        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Fault(message)) => Err(SdkError::Transport(message)),
            None => Err(SdkError::Transport(format!(
                "no mock reply registered for {}",
                url
            ))),
        }
    }
}

/// HTTP transport backed by reqwest
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, TLS)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<String, SdkError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        tracing::debug!(status = %response.status(), url = %request.url, "gateway responded");

        response
            .text()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))
    }
}
