use serde::Serialize;

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{Discount, RecordId};

pub async fn list_discounts(client: &HttpClient) -> Result<Option<Vec<Discount>>, ApiError> {
    client.get("/discount/list").await
}

pub async fn get_discount(
    client: &HttpClient,
    id: &RecordId,
) -> Result<Option<Discount>, ApiError> {
    client.get(&format!("/discount/{}", id.path_segment())).await
}

pub async fn create_discount<B>(
    client: &HttpClient,
    payload: &B,
) -> Result<Option<Discount>, ApiError>
where
    B: Serialize + Sync + ?Sized,
{
    client.post("/discount", payload).await
}

pub async fn update_discount<B>(
    client: &HttpClient,
    id: &RecordId,
    payload: &B,
) -> Result<Option<Discount>, ApiError>
where
    B: Serialize + Sync + ?Sized,
{
    client.put(&format!("/discount/{}", id.path_segment()), payload).await
}

pub async fn delete_discount(client: &HttpClient, id: &RecordId) -> Result<(), ApiError> {
    client.delete(&format!("/discount/{}", id.path_segment())).await
}
