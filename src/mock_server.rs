// In-memory backend used by the tests
//
// Routes are keyed by method and path (relative to the base URL). Every
// request is recorded so tests can assert how many network calls happened
// and what was sent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::auth::AuthSession;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::ApiError;
use crate::http::{HttpClient, HttpRequest, HttpResponse, Method, Transport};

#[derive(Debug, Clone)]
pub enum MockReply {
    Status { status: u16, body: Bytes },
    NetworkError(String),
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub reply: MockReply,
    pub delay: Duration,
}

impl MockResponse {
    // 200 with the payload wrapped in the backend's envelope
    pub fn ok(payload: Value) -> Self {
        Self::raw(200, json!({ "body": payload }))
    }

    pub fn raw(status: u16, body: Value) -> Self {
        Self {
            reply: MockReply::Status {
                status,
                body: Bytes::from(body.to_string()),
            },
            delay: Duration::ZERO,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            reply: MockReply::Status {
                status,
                body: Bytes::new(),
            },
            delay: Duration::ZERO,
        }
    }

    pub fn network_error(message: &str) -> Self {
        Self {
            reply: MockReply::NetworkError(message.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }
}

pub struct MockServer {
    base_url: String,
    routes: Mutex<HashMap<(Method, String), MockResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    request_count: AtomicUsize,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            request_count: AtomicUsize::new(0),
        }
    }

    pub fn route(&self, method: Method, path: &str, response: MockResponse) {
        self.routes
            .lock()
            .insert((method, path.to_string()), response);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.method == method && self.path_of(request) == path)
            .count()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    fn path_of<'a>(&self, request: &'a HttpRequest) -> &'a str {
        request
            .url
            .strip_prefix(self.base_url.as_str())
            .unwrap_or(request.url.as_str())
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let key = (request.method.clone(), self.path_of(&request).to_string());
        self.requests.lock().push(request);

        let response = self
            .routes
            .lock()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| MockResponse::raw(404, json!({ "message": "Not Found" })));

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        match response.reply {
            MockReply::Status { status, body } => Ok(HttpResponse { status, body }),
            MockReply::NetworkError(message) => Err(ApiError::NetworkError(message)),
        }
    }
}

pub fn mock_client() -> (HttpClient, Arc<MockServer>) {
    let server = Arc::new(MockServer::new());
    let client = HttpClient::with_transport(
        ClientConfig::default(),
        AuthSession::in_memory(),
        server.clone(),
    );
    (client, server)
}
