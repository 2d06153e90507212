//! ItemStore port - 追跡アイテムの正本（source of truth）
//!
//! ItemStore は以下を提供します：
//! - 状態と日付による検索（再分類の入力）
//! - ShowId からの所有者解決
//! - アイテム状態の永続化
//!
//! 検索結果は行のコピー（`ItemRecord`）で、ライブなアイテムは
//! `resolve_owner` で得た `Show` から引きます。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ItemKey, ItemRecord, ItemState, Show, ShowId, Status, StoreError};

/// ItemStore はアイテムの検索・所有者解決・永続化を担う
///
/// # 設計原則
/// - ストア自身の整合性はストアが守る（trawler はロックを跨がない）
/// - 状態の書き込みは呼び出し側がアイテムのロックを握った状態で行う
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Rows with the given status whose air date is strictly before `cutoff`.
    async fn query_by_status_before(
        &self,
        status: Status,
        cutoff: NaiveDate,
    ) -> Result<Vec<ItemRecord>, StoreError>;

    /// The single show with this id.
    ///
    /// `StoreError::AmbiguousOwner` when more than one matches,
    /// `StoreError::OwnerNotFound` when none does.
    async fn resolve_owner(&self, show_id: ShowId) -> Result<Arc<Show>, StoreError>;

    /// Write the item's state back to storage.
    async fn persist_status(&self, key: ItemKey, state: &ItemState) -> Result<(), StoreError>;
}
