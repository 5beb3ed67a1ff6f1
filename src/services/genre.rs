use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::Genre;

pub async fn list_genres(client: &HttpClient) -> Result<Option<Vec<Genre>>, ApiError> {
    client.get("/genre").await
}
