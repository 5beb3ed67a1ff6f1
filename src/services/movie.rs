use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{Movie, MovieStatus};

pub async fn movies_by_status(
    client: &HttpClient,
    status: MovieStatus,
) -> Result<Option<Vec<Movie>>, ApiError> {
    client
        .get_with_query(
            "/movie",
            vec![("status".to_string(), status.as_str().to_string())],
        )
        .await
}
