use super::{keys, QueryClient, QueryOptions, QueryResult};
use crate::models::{DateRange, StatisticKind, StatisticRow};
use crate::services::statistic;

impl QueryClient {
    // Aggregated rows for one statistic over a date range; skipped until
    // the range is picked.
    pub async fn statistics(
        &self,
        kind: StatisticKind,
        range: Option<DateRange>,
    ) -> QueryResult<Vec<StatisticRow>> {
        let options =
            QueryOptions::new(keys::statistics_for(kind, range.as_ref())).enabled(range.is_some());
        let http = self.http().clone();
        self.query(options, move || async move {
            match range {
                Some(range) => Ok(statistic::statistics(&http, kind, &range)
                    .await?
                    .unwrap_or_default()),
                None => Ok(Vec::new()),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::mock_server::MockResponse;
    use crate::queries::tests::query_client;
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn test_kinds_are_cached_separately() {
        let (client, server) = query_client();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        );
        server.route(
            Method::GET,
            "/statistic/combo",
            MockResponse::ok(json!([{"name": "Popcorn", "total": 12}])),
        );
        server.route(Method::GET, "/statistic/movie-revenue", MockResponse::ok(json!([])));

        let combos = client.statistics(StatisticKind::Combo, Some(range)).await;
        let movies = client.statistics(StatisticKind::MovieRevenue, Some(range)).await;
        client.statistics(StatisticKind::Combo, Some(range)).await;

        assert_eq!(combos.data.map(|rows| rows.len()), Some(1));
        assert_eq!(movies.data, Some(Vec::new()));
        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_range_skips_fetch() {
        let (client, server) = query_client();
        let result = client.statistics(StatisticKind::CinemaRevenue, None).await;
        assert!(!result.is_loading());
        assert_eq!(result.data, None);
        assert_eq!(server.request_count(), 0);
    }
}
