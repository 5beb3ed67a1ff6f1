use serde::Serialize;

use super::{keys, MutationResult, QueryClient, QueryOptions, QueryResult};
use crate::models::{Discount, RecordId};
use crate::services::discount;

impl QueryClient {
    pub async fn discounts(&self) -> QueryResult<Vec<Discount>> {
        let http = self.http().clone();
        self.query(QueryOptions::new(keys::discounts()), move || async move {
            Ok(discount::list_discounts(&http).await?.unwrap_or_default())
        })
        .await
    }

    pub async fn discount(&self, id: Option<&RecordId>) -> QueryResult<Option<Discount>> {
        let options = QueryOptions::new(keys::discount(id)).enabled(id.is_some());
        let http = self.http().clone();
        let id = id.cloned();
        self.query(options, move || async move {
            match id {
                Some(id) => discount::get_discount(&http, &id).await,
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn create_discount<B>(&self, payload: &B) -> MutationResult<Option<Discount>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.mutate(
            &[keys::discounts()],
            discount::create_discount(self.http(), payload),
        )
        .await
    }

    pub async fn update_discount<B>(
        &self,
        id: &RecordId,
        payload: &B,
    ) -> MutationResult<Option<Discount>>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.mutate(
            &[keys::discounts(), keys::discount(Some(id))],
            discount::update_discount(self.http(), id, payload),
        )
        .await
    }

    pub async fn delete_discount(&self, id: &RecordId) -> MutationResult<()> {
        self.mutate(
            &[keys::discounts(), keys::discount(Some(id))],
            discount::delete_discount(self.http(), id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::mock_server::MockResponse;
    use crate::queries::tests::query_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_update_refetches_list_and_detail() {
        let (client, server) = query_client();
        let id = RecordId::Number(5);
        server.route(Method::GET, "/discount/list", MockResponse::ok(json!([{"id": 5}])));
        server.route(Method::GET, "/discount/5", MockResponse::ok(json!({"id": 5, "percent": 10})));
        server.route(Method::PUT, "/discount/5", MockResponse::ok(json!({"id": 5, "percent": 20})));

        client.discounts().await;
        client.discount(Some(&id)).await;
        let updated = client.update_discount(&id, &json!({"percent": 20})).await;
        assert!(updated.is_success());
        client.discounts().await;
        client.discount(Some(&id)).await;

        assert_eq!(server.calls(Method::GET, "/discount/list"), 2);
        assert_eq!(server.calls(Method::GET, "/discount/5"), 2);
    }

    #[tokio::test]
    async fn test_unrelated_resources_stay_cached() {
        let (client, server) = query_client();
        server.route(Method::GET, "/genre", MockResponse::ok(json!([])));
        server.route(Method::POST, "/discount", MockResponse::ok(json!({"id": 1})));

        client.genres().await;
        client.create_discount(&json!({"code": "SPRING"})).await;
        client.genres().await;

        assert_eq!(server.calls(Method::GET, "/genre"), 1);
    }
}
