//! ScriptedProvider - 候補リストを事前に登録しておく開発用プロバイダ
//!
//! `acquire` は本物のプロバイダと同じ副作用を持ちます：アイテムのロックを
//! 握って `Snatched` にし、永続化してからロックを離します。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::domain::{
    AcquisitionResult, Candidate, CandidateId, ItemKey, ProviderError, TrackedItem,
};
use crate::observability::record_status_transition;
use crate::ports::{IdGenerator, ItemStore, Provider};

pub struct ScriptedProvider {
    store: Arc<dyn ItemStore>,
    ids: Arc<dyn IdGenerator>,
    candidates: RwLock<HashMap<ItemKey, Vec<Candidate>>>,
    acquired: Mutex<Vec<Candidate>>,
}

impl ScriptedProvider {
    pub fn new(store: Arc<dyn ItemStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            ids,
            candidates: RwLock::new(HashMap::new()),
            acquired: Mutex::new(Vec::new()),
        }
    }

    /// Candidates returned for `key`, in preference order. Replaces any earlier script.
    pub async fn script(&self, key: ItemKey, candidates: Vec<Candidate>) {
        self.candidates.write().await.insert(key, candidates);
    }

    /// Every candidate passed to `acquire`, in call order.
    pub async fn acquired(&self) -> Vec<Candidate> {
        self.acquired.lock().await.clone()
    }

    async fn locate(&self, candidate: &Candidate) -> Result<Arc<TrackedItem>, ProviderError> {
        let key = candidate.item;
        let show = self
            .store
            .resolve_owner(key.show_id)
            .await
            .map_err(|e| acquire_error(&candidate.id, e.to_string()))?;
        show.item(key.season, key.episode)
            .ok_or_else(|| acquire_error(&candidate.id, format!("no item {key}")))
    }
}

fn acquire_error(candidate: &CandidateId, reason: String) -> ProviderError {
    ProviderError::Acquire {
        candidate: candidate.clone(),
        reason,
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn find_candidates(&self, item: &TrackedItem) -> Result<Vec<Candidate>, ProviderError> {
        let scripted = self.candidates.read().await;
        Ok(scripted.get(&item.key()).cloned().unwrap_or_default())
    }

    async fn acquire(&self, candidate: &Candidate) -> Result<AcquisitionResult, ProviderError> {
        self.acquired.lock().await.push(candidate.clone());
        let item = self.locate(candidate).await?;
        let acquisition_id = self.ids.generate_acquisition_id();

        let mut state = item.lock().await;
        let before = *state;
        let Some(previous) = state.mark_snatched() else {
            debug!(item = %candidate.item, "item already snatched");
            return Ok(AcquisitionResult {
                acquisition_id,
                candidate_id: candidate.id.clone(),
                item: candidate.item,
                accepted: false,
                detail: Some("already snatched".to_string()),
            });
        };

        if let Err(e) = self.store.persist_status(candidate.item, &state).await {
            *state = before;
            return Err(acquire_error(&candidate.id, e.to_string()));
        }
        record_status_transition(candidate.item, previous, state.status);

        Ok(AcquisitionResult {
            acquisition_id,
            candidate_id: candidate.id.clone(),
            item: candidate.item,
            accepted: true,
            detail: Some(candidate.title.clone()),
        })
    }
}
