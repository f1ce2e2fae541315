use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use super::ResultStore;
use crate::error::RenderError;
use crate::models::{Call, RaceMeta, RaceResult};
use crate::resolver::{Resolution, ResultRow};
use crate::select::Selection;

/// A snapshot held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    results: Vec<(RaceResult, Option<Call>)>,
    metas: HashMap<String, RaceMeta>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_result(&mut self, result: RaceResult, call: Option<Call>) {
        self.results.push((result, call));
    }

    pub fn insert_meta(&mut self, meta: RaceMeta) {
        self.metas.insert(meta.raceid.clone(), meta);
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn select(&self, selection: &Selection) -> Result<Vec<ResultRow>, RenderError> {
        let mut rows = Vec::new();
        for (result, call) in &self.results {
            let Some(meta) = selection.admit(result, self.metas.get(&result.raceid))? else {
                continue;
            };
            let resolution = Resolution::from_call(result, meta, call.as_ref());
            rows.push(ResultRow {
                result: result.clone(),
                meta: meta.clone(),
                resolution,
            });
        }
        Ok(rows)
    }

    async fn states(&self) -> Result<Vec<String>, RenderError> {
        let states: BTreeSet<&String> = self.results.iter().map(|(r, _)| &r.statepostal).collect();
        Ok(states.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Office;
    use crate::testing::{meta, result};

    #[tokio::test]
    async fn missing_meta_is_an_error() {
        let mut store = MemoryStore::new();
        store.insert_result(result("1", "Dem", 10), None);
        let err = store
            .select(&Selection::chamber(Office::Senate))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingMeta { raceid, .. } if raceid == "1"));
    }

    #[tokio::test]
    async fn orphan_is_not_hidden_by_voting_member_filter() {
        let mut store = MemoryStore::new();
        let mut orphan = result("9", "Dem", 10);
        orphan.officename = "U.S. House".to_string();
        orphan.winner = true;
        store.insert_result(orphan, None);

        let err = store
            .select(&Selection::chamber(Office::House))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingMeta { raceid, .. } if raceid == "9"));
    }

    #[tokio::test]
    async fn select_resolves_calls() {
        let mut store = MemoryStore::new();
        store.insert_meta(meta("1"));
        let mut dem = result("1", "Dem", 10);
        dem.winner = true;
        store.insert_result(dem, None);
        store.insert_result(
            result("1", "GOP", 9),
            Some(Call {
                accept_ap: false,
                override_winner: true,
            }),
        );

        let rows = store.select(&Selection::chamber(Office::Senate)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].resolution.npr_winner);
        assert!(rows[1].resolution.npr_winner);
    }

    #[tokio::test]
    async fn states_are_distinct_and_sorted() {
        let mut store = MemoryStore::new();
        let mut md = result("2", "Dem", 1);
        md.statepostal = "MD".to_string();
        store.insert_result(result("1", "Dem", 1), None);
        store.insert_result(md, None);
        store.insert_result(result("3", "Dem", 1), None);
        assert_eq!(store.states().await.unwrap(), vec!["MD", "VA"]);
    }
}
