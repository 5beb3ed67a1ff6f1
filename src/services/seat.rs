use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{RecordId, Seat};

pub async fn seats_by_room(
    client: &HttpClient,
    room_id: &RecordId,
) -> Result<Option<Vec<Seat>>, ApiError> {
    client.get(&format!("/seat/room/{}", room_id.path_segment())).await
}
