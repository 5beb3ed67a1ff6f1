use super::{keys, QueryClient, QueryOptions, QueryResult};
use crate::models::Genre;
use crate::services::genre;

impl QueryClient {
    pub async fn genres(&self) -> QueryResult<Vec<Genre>> {
        let http = self.http().clone();
        self.query(QueryOptions::new(keys::genres()), move || async move {
            Ok(genre::list_genres(&http).await?.unwrap_or_default())
        })
        .await
    }
}
