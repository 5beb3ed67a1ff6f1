use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::{DateRange, Pagination, Payment, RecordId};

pub async fn payments_by_cinema(
    client: &HttpClient,
    cinema_id: &RecordId,
    range: &DateRange,
) -> Result<Option<Vec<Payment>>, ApiError> {
    client
        .get_with_query(
            &format!("/payment/cinema/{}", cinema_id.path_segment()),
            range.query(),
        )
        .await
}

pub async fn list_payments(
    client: &HttpClient,
    pagination: Pagination,
) -> Result<Option<Vec<Payment>>, ApiError> {
    client.get_with_query("/payment", pagination.query()).await
}

pub async fn accept_all_payments(client: &HttpClient) -> Result<Option<Value>, ApiError> {
    client.post_empty("/payment/accept-all").await
}
