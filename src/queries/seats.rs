use super::{keys, QueryClient, QueryOptions, QueryResult};
use crate::models::{RecordId, Seat};
use crate::services::seat;

impl QueryClient {
    pub async fn seats_by_room(&self, room_id: Option<&RecordId>) -> QueryResult<Vec<Seat>> {
        let options = QueryOptions::new(keys::seats_by_room(room_id)).enabled(room_id.is_some());
        let http = self.http().clone();
        let room_id = room_id.cloned();
        self.query(options, move || async move {
            match room_id {
                Some(id) => Ok(seat::seats_by_room(&http, &id).await?.unwrap_or_default()),
                None => Ok(Vec::new()),
            }
        })
        .await
    }
}
