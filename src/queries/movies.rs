use super::{keys, QueryClient, QueryOptions, QueryResult};
use crate::models::{Movie, MovieStatus};
use crate::services::movie;

impl QueryClient {
    pub async fn movies(&self, status: MovieStatus) -> QueryResult<Vec<Movie>> {
        let http = self.http().clone();
        self.query(QueryOptions::new(keys::movies(status)), move || async move {
            Ok(movie::movies_by_status(&http, status).await?.unwrap_or_default())
        })
        .await
    }
}
