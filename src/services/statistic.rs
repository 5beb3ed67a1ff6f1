use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{DateRange, StatisticKind, StatisticRow};

pub async fn statistics(
    client: &HttpClient,
    kind: StatisticKind,
    range: &DateRange,
) -> Result<Option<Vec<StatisticRow>>, ApiError> {
    client
        .get_with_query(&format!("/statistic/{}", kind.path_segment()), range.query())
        .await
}
