use serde_json::Value;

use super::{keys, selected_cinema, CinemaFilter, MutationResult, QueryClient, QueryOptions, QueryResult};
use crate::models::{DateRange, Pagination, Payment};
use crate::services::payment;

impl QueryClient {
    // Payments of one cinema over a date range. Runs only once both a
    // concrete cinema and a range are known.
    pub async fn payments_by_cinema(
        &self,
        filter: Option<&CinemaFilter>,
        range: Option<DateRange>,
    ) -> QueryResult<Vec<Payment>> {
        let cinema_id = selected_cinema(filter);
        let options = QueryOptions::new(keys::payments_by_cinema(cinema_id.as_ref(), range.as_ref()))
            .enabled(cinema_id.is_some() && range.is_some());
        let http = self.http().clone();
        self.query(options, move || async move {
            match (cinema_id, range) {
                (Some(id), Some(range)) => Ok(payment::payments_by_cinema(&http, &id, &range)
                    .await?
                    .unwrap_or_default()),
                _ => Ok(Vec::new()),
            }
        })
        .await
    }

    pub async fn invoices(&self, pagination: Pagination) -> QueryResult<Vec<Payment>> {
        let http = self.http().clone();
        self.query(
            QueryOptions::new(keys::invoices_page(pagination)),
            move || async move {
                Ok(payment::list_payments(&http, pagination)
                    .await?
                    .unwrap_or_default())
            },
        )
        .await
    }

    pub async fn accept_all_payments(&self) -> MutationResult<Option<Value>> {
        self.mutate(
            &[keys::payments(), keys::invoices()],
            payment::accept_all_payments(self.http()),
        )
        .await
    }
}
