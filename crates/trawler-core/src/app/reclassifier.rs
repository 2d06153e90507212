//! Reclassifier - 期限切れの Unaired を Missed にする
//!
//! # フロー
//! 1. ItemStore::query_by_status_before(Unaired, today) で候補行を取得
//! 2. 行ごとに ShowId から所有者を解決（曖昧なら残りを打ち切る）
//! 3. アイテムのロックを握って Missed にし、永続化してからロックを離す

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::app::status::ReclassifyReport;
use crate::domain::{ItemRecord, Status, StoreError};
use crate::observability::record_status_transition;
use crate::ports::{Clock, ItemStore};

pub struct Reclassifier {
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
}

impl Reclassifier {
    pub fn new(store: Arc<dyn ItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Mark every `Unaired` item dated strictly before today as `Missed`.
    ///
    /// # Errors
    ///
    /// Query and persistence failures are returned: a partial pass would
    /// leave the worklist stale. An ambiguous owner is not an error; the
    /// pass stops and the report says so.
    pub async fn run(&self) -> Result<ReclassifyReport, StoreError> {
        let today = self.clock.today();
        info!(%today, "changing all old unaired items to status missed");

        let records = self
            .store
            .query_by_status_before(Status::Unaired, today)
            .await
            .inspect_err(|e| error!(error = %e, "fatal error querying stale unaired items"))?;

        let mut report = ReclassifyReport {
            matched: records.len(),
            ..ReclassifyReport::default()
        };

        for record in records {
            match self.reclassify_one(&record, today).await {
                Ok(true) => report.reclassified += 1,
                Ok(false) => report.skipped += 1,
                Err(e @ StoreError::AmbiguousOwner { .. }) => {
                    error!(item = %record.key, error = %e, "aborting reclassification");
                    report.aborted = true;
                    return Ok(report);
                }
                Err(StoreError::OwnerNotFound(show_id)) => {
                    warn!(item = %record.key, %show_id, "no show owns this item, skipping");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            matched = report.matched,
            reclassified = report.reclassified,
            skipped = report.skipped,
            "reclassification finished"
        );
        Ok(report)
    }

    /// Returns `Ok(false)` when the row no longer applies.
    async fn reclassify_one(
        &self,
        record: &ItemRecord,
        today: chrono::NaiveDate,
    ) -> Result<bool, StoreError> {
        let key = record.key;
        let show = self.store.resolve_owner(key.show_id).await?;
        let Some(item) = show.item(key.season, key.episode) else {
            warn!(item = %key, show = show.name(), "show has no such item, skipping");
            return Ok(false);
        };

        let mut state = item.lock().await;
        let before = *state;
        if !state.mark_missed_if_stale(today) {
            debug!(item = %key, status = %state.status, "item changed since query, skipping");
            return Ok(false);
        }

        if let Err(e) = self.store.persist_status(key, &state).await {
            *state = before;
            error!(item = %key, error = %e, "failed to persist missed status");
            return Err(e);
        }
        record_status_transition(key, before.status, state.status);
        Ok(true)
    }
}
