//! InMemoryViews - ライブなアイテムから集計ビューを作る
//!
//! - missing: status が Missed
//! - airing: Unaired かつ今日が availability date
//! - upcoming: Unaired かつ明日から `UPCOMING_WINDOW_DAYS` 日以内
//!
//! 最新のスナップショットは `latest()` でいつでも読めます。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tokio::sync::RwLock;

use crate::domain::{ItemState, Status, StoreError, ViewKind, ViewSnapshot};
use crate::impls::InMemoryItemStore;
use crate::ports::{AggregateViews, Clock};

/// How far ahead the upcoming view looks.
pub const UPCOMING_WINDOW_DAYS: u64 = 7;

pub struct InMemoryViews {
    store: Arc<InMemoryItemStore>,
    clock: Arc<dyn Clock>,
    latest: RwLock<HashMap<ViewKind, ViewSnapshot>>,
}

impl InMemoryViews {
    pub fn new(store: Arc<InMemoryItemStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            latest: RwLock::new(HashMap::new()),
        }
    }

    /// The most recent snapshot of a view (empty before the first refresh).
    pub async fn latest(&self, kind: ViewKind) -> ViewSnapshot {
        self.latest
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ViewSnapshot::empty(kind))
    }

    async fn refresh(&self, kind: ViewKind) -> ViewSnapshot {
        let today = self.clock.today();
        let mut items = Vec::new();
        for item in self.store.live_items().await {
            let state = *item.lock().await;
            if belongs_to(kind, &state, today) {
                items.push(item);
            }
        }

        let snapshot = ViewSnapshot::new(kind, items, self.clock.now());
        self.latest.write().await.insert(kind, snapshot.clone());
        snapshot
    }
}

fn belongs_to(kind: ViewKind, state: &ItemState, today: NaiveDate) -> bool {
    match kind {
        ViewKind::Missing => state.status == Status::Missed,
        ViewKind::Airing => state.is_airing_on(today),
        ViewKind::Upcoming => {
            let horizon = today
                .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MAX);
            state.status == Status::Unaired && state.air_date > today && state.air_date <= horizon
        }
    }
}

#[async_trait]
impl AggregateViews for InMemoryViews {
    async fn refresh_missing(&self) -> Result<ViewSnapshot, StoreError> {
        Ok(self.refresh(ViewKind::Missing).await)
    }

    async fn refresh_airing(&self) -> Result<ViewSnapshot, StoreError> {
        Ok(self.refresh(ViewKind::Airing).await)
    }

    async fn refresh_upcoming(&self) -> Result<ViewSnapshot, StoreError> {
        Ok(self.refresh(ViewKind::Upcoming).await)
    }
}
