// Error types shared by the HTTP client, the services and the query layer

use thiserror::Error;

// Everything a single request can fail with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    // 401 from the backend; a signed-in session has already been cleared
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::ApiResponseError { status_code, .. } => Some(*status_code),
            ApiError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            ApiError::ClientError(error.to_string())
        } else if error.is_decode() {
            ApiError::DecodeError(error.to_string())
        } else {
            ApiError::NetworkError(error.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),

    #[error("Token storage error: {0}")]
    StorageError(String),
}

// Local failures (token storage, config) surface like any other request error
impl From<ClientError> for ApiError {
    fn from(error: ClientError) -> Self {
        ApiError::ClientError(error.to_string())
    }
}

// Misuse of the dashboard data provider, not a user-facing failure
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("dashboard data must be used within a DashboardDataProvider scope")]
    OutsideProvider,
}
