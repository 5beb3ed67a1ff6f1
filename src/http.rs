// The single configured HTTP client for the cinema backend
//
// Every service goes through `HttpClient`, which resolves paths against the
// base URL, attaches the bearer token, reports 401s to the auth session and
// unwraps the `{ "body": ... }` envelope. Nothing here retries.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};

pub use reqwest::Method;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    pub parts: Vec<(String, FormValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts
            .push((name.to_string(), FormValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: Bytes) -> Self {
        self.parts.push((
            name.to_string(),
            FormValue::File {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                bytes,
            },
        ));
        self
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(part, value)| match value {
            FormValue::Text(text) if part == name => Some(text.as_str()),
            _ => None,
        })
    }

    fn into_reqwest(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.parts {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

// Wire-level seam; production uses reqwest, tests use an in-memory server
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let is_multipart = matches!(request.body, RequestBody::Multipart(_));
        let mut builder = self.client.request(request.method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            // reqwest writes the multipart content type itself, boundary included
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    body: Option<T>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    message: Option<Value>,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    config: ClientConfig,
    session: AuthSession,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.config.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(config: ClientConfig, session: AuthSession) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    pub fn with_transport(
        config: ClientConfig,
        session: AuthSession,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(HttpClientInner {
                config,
                session,
                transport,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &AuthSession {
        &self.inner.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        self.get_with_query(path, Vec::new()).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Option<T>, ApiError> {
        let response = self
            .execute(Method::GET, path, query, RequestBody::Empty)
            .await?;
        decode_envelope(&response.body)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .execute(Method::POST, path, Vec::new(), json_body(body)?)
            .await?;
        decode_envelope(&response.body)
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let response = self
            .execute(Method::POST, path, Vec::new(), RequestBody::Empty)
            .await?;
        decode_envelope(&response.body)
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .execute(Method::PUT, path, Vec::new(), json_body(body)?)
            .await?;
        decode_envelope(&response.body)
    }

    // The response body of a delete is never interpreted
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, Vec::new(), RequestBody::Empty)
            .await
            .map(|_| ())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<Option<T>, ApiError> {
        let response = self
            .execute(Method::POST, path, Vec::new(), RequestBody::Multipart(form))
            .await?;
        decode_envelope(&response.body)
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<Option<T>, ApiError> {
        let response = self
            .execute(Method::PUT, path, Vec::new(), RequestBody::Multipart(form))
            .await?;
        decode_envelope(&response.body)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_request(method, path, query, body);
        let authorized = request.header("Authorization").is_some();
        debug!(method = %request.method, url = %request.url, "Sending request");

        let method = request.method.clone();
        let response = self.inner.transport.send(request).await.map_err(|e| {
            warn!(%method, path, error = %e, "Request failed before a response arrived");
            e
        })?;

        debug!(%method, path, status = response.status, "Received response");
        match response.status {
            200..=299 => Ok(response),
            // Only a rejected token ends the session; a failed login does not
            401 => {
                if authorized {
                    self.inner.session.handle_unauthorized().await;
                }
                Err(ApiError::Unauthorized {
                    message: error_message(401, &response.body),
                })
            }
            status_code => Err(ApiError::ApiResponseError {
                status_code,
                message: error_message(status_code, &response.body),
            }),
        }
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: RequestBody,
    ) -> HttpRequest {
        let content_type = match body {
            RequestBody::Multipart(_) => MULTIPART_CONTENT_TYPE,
            _ => JSON_CONTENT_TYPE,
        };
        let mut headers = vec![
            ("Content-Type".to_string(), content_type.to_string()),
            ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
        ];
        if let Some(token) = self.inner.session.access_token() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        HttpRequest {
            method,
            url: self.inner.config.url_for(path),
            headers,
            query,
            body,
        }
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, ApiError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ApiError::ClientError(format!("cannot serialize request body: {}", e)))
}

// An empty 2xx response counts as a missing body
pub fn decode_envelope<T: DeserializeOwned>(raw: &[u8]) -> Result<Option<T>, ApiError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Envelope<T>>(raw)
        .map(|envelope| envelope.body)
        .map_err(|e| ApiError::DecodeError(e.to_string()))
}

// Prefers the backend's `{ "message": ... }`, which may be a list of
// validation messages, over the bare status reason
fn error_message(status_code: u16, raw: &[u8]) -> String {
    let message = serde_json::from_slice::<ErrorEnvelope>(raw)
        .ok()
        .and_then(|envelope| envelope.message)
        .and_then(|message| match message {
            Value::String(text) => Some(text),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        });

    message.unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    })
}
