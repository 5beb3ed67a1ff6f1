use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{Cinema, RecordId};

pub async fn list_cinemas(client: &HttpClient) -> Result<Option<Vec<Cinema>>, ApiError> {
    client.get("/cinema").await
}

pub async fn get_cinema(client: &HttpClient, id: &RecordId) -> Result<Option<Cinema>, ApiError> {
    client.get(&format!("/cinema/{}", id.path_segment())).await
}
