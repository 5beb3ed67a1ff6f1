use super::{keys, MutationResult, QueryClient, QueryOptions, QueryResult};
use crate::models::{Combo, ComboForm, RecordId};
use crate::services::combo;

impl QueryClient {
    pub async fn combos(&self) -> QueryResult<Vec<Combo>> {
        let http = self.http().clone();
        self.query(QueryOptions::new(keys::combos()), move || async move {
            Ok(combo::list_combos(&http).await?.unwrap_or_default())
        })
        .await
    }

    pub async fn combo(&self, id: Option<&RecordId>) -> QueryResult<Option<Combo>> {
        let options = QueryOptions::new(keys::combo(id)).enabled(id.is_some());
        let http = self.http().clone();
        let id = id.cloned();
        self.query(options, move || async move {
            match id {
                Some(id) => combo::get_combo(&http, &id).await,
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn create_combo(&self, form: ComboForm) -> MutationResult<Option<Combo>> {
        self.mutate(&[keys::combos()], combo::create_combo(self.http(), form))
            .await
    }

    pub async fn update_combo(&self, id: &RecordId, form: ComboForm) -> MutationResult<Option<Combo>> {
        self.mutate(
            &[keys::combos(), keys::combo(Some(id))],
            combo::update_combo(self.http(), id, form),
        )
        .await
    }

    pub async fn delete_combo(&self, id: &RecordId) -> MutationResult<()> {
        self.mutate(
            &[keys::combos(), keys::combo(Some(id))],
            combo::delete_combo(self.http(), id),
        )
        .await
    }
}
