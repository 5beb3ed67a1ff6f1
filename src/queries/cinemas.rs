use super::{keys, QueryClient, QueryOptions, QueryResult};
use crate::models::{Cinema, RecordId};
use crate::services::cinema;

impl QueryClient {
    pub async fn cinemas(&self) -> QueryResult<Vec<Cinema>> {
        let http = self.http().clone();
        self.query(QueryOptions::new(keys::cinemas()), move || async move {
            Ok(cinema::list_cinemas(&http).await?.unwrap_or_default())
        })
        .await
    }

    pub async fn cinema(&self, id: Option<&RecordId>) -> QueryResult<Option<Cinema>> {
        let options = QueryOptions::new(keys::cinema(id)).enabled(id.is_some());
        let http = self.http().clone();
        let id = id.cloned();
        self.query(options, move || async move {
            match id {
                Some(id) => cinema::get_cinema(&http, &id).await,
                None => Ok(None),
            }
        })
        .await
    }
}
