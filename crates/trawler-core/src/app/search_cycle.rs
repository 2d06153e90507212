//! SearchCycle - 1 回分の検索と取得
//!
//! # フロー
//! 1. Reclassifier で期限切れの Unaired を Missed にする
//! 2. missing / airing / upcoming ビューを再計算（ロックの外で）
//! 3. サイクル全体のロックを取る（同時に走る本体は常に 1 つ）
//! 4. missing ∪ airing をワークリストにする
//! 5. アイテムごとに候補を検索し、先頭の候補だけを取得する
//!
//! アイテム単位の失敗はログに出して次のアイテムへ進みます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, warn};

use crate::app::reclassifier::Reclassifier;
use crate::app::scheduler::CycleRunner;
use crate::app::status::CycleReport;
use crate::domain::{CycleId, TrackedItem, TrawlerError, WorkList};
use crate::observability::cycle_span;
use crate::ports::{AggregateViews, Clock, IdGenerator, ItemStore, Provider};

pub struct SearchCycle {
    reclassifier: Reclassifier,
    views: Arc<dyn AggregateViews>,
    provider: Arc<dyn Provider>,
    ids: Arc<dyn IdGenerator>,
    /// Held for worklist build and dispatch.
    lock: Mutex<()>,
}

impl SearchCycle {
    pub fn new(
        store: Arc<dyn ItemStore>,
        views: Arc<dyn AggregateViews>,
        provider: Arc<dyn Provider>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reclassifier: Reclassifier::new(store, clock),
            views,
            provider,
            ids,
            lock: Mutex::new(()),
        }
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Reclassification and view refresh failures end the cycle. Provider
    /// failures never do.
    pub async fn run(&self) -> Result<CycleReport, TrawlerError> {
        let cycle_id = self.ids.generate_cycle_id();
        self.run_with_id(cycle_id)
            .instrument(cycle_span(cycle_id))
            .await
    }

    async fn run_with_id(&self, cycle_id: CycleId) -> Result<CycleReport, TrawlerError> {
        let mut report = CycleReport::new(cycle_id);
        report.reclassify = self.reclassifier.run().await?;

        let missing = self.views.refresh_missing().await?;
        let airing = self.views.refresh_airing().await?;
        let upcoming = self.views.refresh_upcoming().await?;
        debug!(
            missing = missing.len(),
            airing = airing.len(),
            upcoming = upcoming.len(),
            "views refreshed"
        );

        let _cycle = self.lock.lock().await;
        debug!("beginning search for today's items");

        let worklist = WorkList::union([&missing, &airing]);
        report.worklist = worklist.len();
        if worklist.is_empty() {
            info!("no items were found to download");
            return Ok(report);
        }

        for item in worklist.iter() {
            self.search_one(item, &mut report).await;
        }

        info!(
            worklist = report.worklist,
            acquired = report.acquired,
            no_candidates = report.no_candidates,
            failed = report.failed,
            "search cycle finished"
        );
        Ok(report)
    }

    async fn search_one(&self, item: &TrackedItem, report: &mut CycleReport) {
        let candidates = match self.provider.find_candidates(item).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(item = %item.key(), error = %e, "candidate search failed");
                report.failed += 1;
                return;
            }
        };

        // first returned wins
        let Some(candidate) = candidates.first() else {
            info!(item = %item.pretty_name(), "unable to find candidates");
            report.no_candidates += 1;
            return;
        };

        match self.provider.acquire(candidate).await {
            Ok(result) => {
                info!(
                    item = %item.key(),
                    candidate = %result.candidate_id,
                    acquisition = %result.acquisition_id,
                    accepted = result.accepted,
                    detail = result.detail.as_deref().unwrap_or(""),
                    "acquisition requested"
                );
                report.acquired += 1;
            }
            Err(e) => {
                warn!(item = %item.key(), candidate = %candidate.id, error = %e, "acquisition failed");
                report.failed += 1;
            }
        }
    }
}

#[async_trait]
impl CycleRunner for SearchCycle {
    async fn run_cycle(&self) -> Result<CycleReport, TrawlerError> {
        self.run().await
    }
}
