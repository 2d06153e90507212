//! InMemoryItemStore - 開発用・テスト用のアイテムストア
//!
//! # 実装詳細
//! - `shows`: ライブなアイテムを持つ Show の一覧（同じ id の重複も許す）
//! - `rows`: 永続化された状態のテーブル。検索はここを読み、persist はここに書く
//!
//! 重複した Show を登録できるので、`AmbiguousOwner` をそのまま再現できます。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::domain::{ItemKey, ItemRecord, ItemState, Show, ShowId, Status, StoreError, TrackedItem};
use crate::ports::ItemStore;

#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    shows: RwLock<Vec<Arc<Show>>>,
    rows: RwLock<BTreeMap<ItemKey, ItemState>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a show and persist the current state of each of its items.
    pub async fn add_show(&self, show: Show) -> Arc<Show> {
        let show = Arc::new(show);
        {
            let mut rows = self.rows.write().await;
            for item in show.items() {
                let record = item.snapshot().await;
                rows.insert(record.key, record.state);
            }
        }
        self.shows.write().await.push(Arc::clone(&show));
        show
    }

    /// Live item by key, from the first show with a matching id.
    pub async fn item(&self, key: ItemKey) -> Option<Arc<TrackedItem>> {
        let shows = self.shows.read().await;
        shows
            .iter()
            .find(|show| show.id() == key.show_id)
            .and_then(|show| show.item(key.season, key.episode))
    }

    /// Every live item of every registered show.
    pub async fn live_items(&self) -> Vec<Arc<TrackedItem>> {
        let shows = self.shows.read().await;
        shows
            .iter()
            .flat_map(|show| show.items().cloned())
            .collect()
    }

    /// The persisted state of one item.
    pub async fn persisted(&self, key: ItemKey) -> Option<ItemState> {
        self.rows.read().await.get(&key).copied()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn query_by_status_before(
        &self,
        status: Status,
        cutoff: NaiveDate,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|(_, state)| state.status == status && state.air_date < cutoff)
            .map(|(key, state)| ItemRecord {
                key: *key,
                state: *state,
            })
            .collect())
    }

    async fn resolve_owner(&self, show_id: ShowId) -> Result<Arc<Show>, StoreError> {
        let shows = self.shows.read().await;
        let mut matches = shows.iter().filter(|show| show.id() == show_id);
        let first = matches.next().ok_or(StoreError::OwnerNotFound(show_id))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(StoreError::AmbiguousOwner {
                show_id,
                matches: extra + 1,
            });
        }
        Ok(Arc::clone(first))
    }

    async fn persist_status(&self, key: ItemKey, state: &ItemState) -> Result<(), StoreError> {
        self.rows.write().await.insert(key, *state);
        Ok(())
    }
}
