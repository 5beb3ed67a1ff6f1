use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{AuthTokens, Credentials, RefreshRequest};

pub async fn login_admin(
    client: &HttpClient,
    credentials: &Credentials,
) -> Result<Option<AuthTokens>, ApiError> {
    client.post("/auth/login/admin", credentials).await
}

pub async fn refresh(
    client: &HttpClient,
    refresh_token: &str,
) -> Result<Option<AuthTokens>, ApiError> {
    let request = RefreshRequest {
        refresh_token: refresh_token.to_string(),
    };
    client.post("/auth/refresh", &request).await
}
