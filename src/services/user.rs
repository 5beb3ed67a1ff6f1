use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::User;

// Relies on the bearer token carried by the client
pub async fn current_user(client: &HttpClient) -> Result<Option<User>, ApiError> {
    client.get("/user/me").await
}
