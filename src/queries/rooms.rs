use serde::Serialize;

use super::{keys, selected_cinema, CinemaFilter, MutationResult, QueryClient, QueryOptions, QueryResult};
use crate::cache::QueryKey;
use crate::models::{RecordId, Room};
use crate::services::room;

// Every write touches both list views plus the room itself
fn room_write_keys(id: Option<&RecordId>) -> Vec<QueryKey> {
    let mut prefixes = vec![keys::rooms(), keys::screens()];
    if let Some(id) = id {
        prefixes.push(keys::room(Some(id)));
    }
    prefixes
}

impl QueryClient {
    // Screens of the selected cinema. Skipped while no cinema, or "all",
    // is selected.
    pub async fn screens_by_cinema(&self, filter: Option<&CinemaFilter>) -> QueryResult<Vec<Room>> {
        let cinema_id = selected_cinema(filter);
        let options = QueryOptions::new(keys::screens_by_cinema(cinema_id.as_ref()))
            .enabled(cinema_id.is_some());
        let http = self.http().clone();
        self.query(options, move || async move {
            match cinema_id {
                Some(id) => Ok(room::screens_by_cinema(&http, &id).await?.unwrap_or_default()),
                None => Ok(Vec::new()),
            }
        })
        .await
    }

    pub async fn rooms(&self, filter: Option<&CinemaFilter>) -> QueryResult<Vec<Room>> {
        let cinema_id = selected_cinema(filter);
        let options = QueryOptions::new(keys::rooms_by_cinema(cinema_id.as_ref()))
            .enabled(cinema_id.is_some());
        let http = self.http().clone();
        self.query(options, move || async move {
            match cinema_id {
                Some(id) => Ok(room::list_rooms(&http, &id).await?.unwrap_or_default()),
                None => Ok(Vec::new()),
            }
        })
        .await
    }

    pub async fn room(&self, id: Option<&RecordId>) -> QueryResult<Option<Room>> {
        let options = QueryOptions::new(keys::room(id)).enabled(id.is_some());
        let http = self.http().clone();
        let id = id.cloned();
        self.query(options, move || async move {
            match id {
                Some(id) => room::get_room(&http, &id).await,
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn create_room<B>(&self, payload: &B) -> MutationResult<Option<Room>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.mutate(&room_write_keys(None), room::create_room(self.http(), payload))
            .await
    }

    pub async fn update_room<B>(&self, id: &RecordId, payload: &B) -> MutationResult<Option<Room>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.mutate(
            &room_write_keys(Some(id)),
            room::update_room(self.http(), id, payload),
        )
        .await
    }

    pub async fn delete_room(&self, id: &RecordId) -> MutationResult<()> {
        self.mutate(&room_write_keys(Some(id)), room::delete_room(self.http(), id))
            .await
    }
}
