//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use ulid::Ulid;

use crate::domain::{
    AcquisitionId, AcquisitionResult, Candidate, CandidateId, ItemKey, ItemRecord, ItemState,
    ProviderError, Show, ShowId, Status, StoreError, TrackedItem,
};
use crate::ports::{ItemStore, Provider};

pub(crate) fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// The "today" every test clock is fixed to.
pub(crate) fn today() -> NaiveDate {
    date(10)
}

/// A store over a single show whose query or persist always fails.
pub(crate) struct FailingStore {
    show: Arc<Show>,
    fail_query: bool,
}

impl FailingStore {
    pub(crate) fn query_fails() -> Self {
        Self {
            show: Arc::new(Show::new(ShowId(1), "Empty")),
            fail_query: true,
        }
    }

    pub(crate) fn persist_fails(show: Show) -> Self {
        Self {
            show: Arc::new(show),
            fail_query: false,
        }
    }

    pub(crate) fn show(&self) -> Arc<Show> {
        Arc::clone(&self.show)
    }
}

#[async_trait]
impl ItemStore for FailingStore {
    async fn query_by_status_before(
        &self,
        status: Status,
        cutoff: NaiveDate,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        if self.fail_query {
            return Err(StoreError::Query(
                "database disk image is malformed".to_string(),
            ));
        }
        let mut rows = Vec::new();
        for item in self.show.items() {
            let record = item.snapshot().await;
            if record.state.status == status && record.state.air_date < cutoff {
                rows.push(record);
            }
        }
        Ok(rows)
    }

    async fn resolve_owner(&self, show_id: ShowId) -> Result<Arc<Show>, StoreError> {
        if show_id == self.show.id() {
            Ok(self.show())
        } else {
            Err(StoreError::OwnerNotFound(show_id))
        }
    }

    async fn persist_status(&self, key: ItemKey, _state: &ItemState) -> Result<(), StoreError> {
        Err(StoreError::Persist {
            key,
            reason: "attempt to write a readonly database".to_string(),
        })
    }
}

/// Provider that records every call and never changes item status.
#[derive(Default)]
pub(crate) struct RecordingProvider {
    scripted: HashMap<ItemKey, Result<Vec<Candidate>, String>>,
    delay: Option<Duration>,
    searched: Mutex<Vec<(ItemKey, Status)>>,
    acquired: Mutex<Vec<CandidateId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_candidates(mut self, key: ItemKey, ids: &[&str]) -> Self {
        let candidates = ids
            .iter()
            .map(|id| Candidate::new(*id, key, format!("{key} via {id}")))
            .collect();
        self.scripted.insert(key, Ok(candidates));
        self
    }

    pub(crate) fn with_search_error(mut self, key: ItemKey, reason: &str) -> Self {
        self.scripted.insert(key, Err(reason.to_string()));
        self
    }

    /// Make each search take this long.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (key, status at search time) for each search, in call order.
    pub(crate) fn searched(&self) -> Vec<(ItemKey, Status)> {
        self.searched.lock().unwrap().clone()
    }

    pub(crate) fn acquired(&self) -> Vec<CandidateId> {
        self.acquired.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    async fn find_candidates(&self, item: &TrackedItem) -> Result<Vec<Candidate>, ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let status = item.lock().await.status;
        self.searched.lock().unwrap().push((item.key(), status));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.scripted.get(&item.key()) {
            None => Ok(Vec::new()),
            Some(Ok(candidates)) => Ok(candidates.clone()),
            Some(Err(reason)) => Err(ProviderError::Search {
                item: item.key(),
                reason: reason.clone(),
            }),
        }
    }

    async fn acquire(&self, candidate: &Candidate) -> Result<AcquisitionResult, ProviderError> {
        self.acquired.lock().unwrap().push(candidate.id.clone());
        Ok(AcquisitionResult {
            acquisition_id: AcquisitionId::from_ulid(Ulid::new()),
            candidate_id: candidate.id.clone(),
            item: candidate.item,
            accepted: true,
            detail: None,
        })
    }
}
