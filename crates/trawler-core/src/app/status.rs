//! Status - サイクルとスケジューラの集計ビュー
//!
//! どれも Serialize できる値で、ホストはそのまま JSON にして出せます。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::CycleId;

/// Outcome of one reclassification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclassifyReport {
    /// Rows returned by the stale-item query.
    pub matched: usize,
    /// Items moved to `Missed`.
    pub reclassified: usize,
    /// Rows skipped (owner or item missing, or already changed).
    pub skipped: usize,
    /// Stopped early on an ambiguous owner.
    pub aborted: bool,
}

/// Outcome of one search cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub reclassify: ReclassifyReport,
    /// Items in the worklist.
    pub worklist: usize,
    /// Acquisitions requested (first candidate of an item).
    pub acquired: usize,
    pub no_candidates: usize,
    /// Items whose search or acquisition failed.
    pub failed: usize,
}

impl CycleReport {
    pub fn new(cycle_id: CycleId) -> Self {
        Self {
            cycle_id,
            reclassify: ReclassifyReport::default(),
            worklist: 0,
            acquired: 0,
            no_candidates: 0,
            failed: 0,
        }
    }
}

/// Scheduler state as seen by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    /// Wall-clock time the last cycle started.
    pub last_run_at: Option<DateTime<Utc>>,
    pub cycles_started: u64,
    /// Cycles that returned an error or panicked.
    pub cycles_failed: u64,
    /// Report of the last cycle that completed.
    pub last_report: Option<CycleReport>,
}
