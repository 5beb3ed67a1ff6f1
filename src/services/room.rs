use serde::Serialize;

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{RecordId, Room};

// Screens and rooms are the same records; the dashboard uses both names
pub async fn screens_by_cinema(
    client: &HttpClient,
    cinema_id: &RecordId,
) -> Result<Option<Vec<Room>>, ApiError> {
    client.get(&format!("/room/cinema/{}", cinema_id.path_segment())).await
}

pub async fn list_rooms(
    client: &HttpClient,
    cinema_id: &RecordId,
) -> Result<Option<Vec<Room>>, ApiError> {
    screens_by_cinema(client, cinema_id).await
}

pub async fn get_room(client: &HttpClient, id: &RecordId) -> Result<Option<Room>, ApiError> {
    client.get(&format!("/room/{}", id.path_segment())).await
}

pub async fn create_room<B>(client: &HttpClient, payload: &B) -> Result<Option<Room>, ApiError>
where
    B: Serialize + Sync + ?Sized,
{
    client.post("/room", payload).await
}

pub async fn update_room<B>(
    client: &HttpClient,
    id: &RecordId,
    payload: &B,
) -> Result<Option<Room>, ApiError>
where
    B: Serialize + Sync + ?Sized,
{
    client.put(&format!("/room/{}", id.path_segment()), payload).await
}

pub async fn delete_room(client: &HttpClient, id: &RecordId) -> Result<(), ApiError> {
    client.delete(&format!("/room/{}", id.path_segment())).await
}
