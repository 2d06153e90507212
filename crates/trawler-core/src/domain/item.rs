//! Item model: tracked items, the shows that own them, and store rows.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use super::ids::ShowId;
use super::status::ItemState;

/// Composite key of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub show_id: ShowId,
    pub season: u32,
    pub episode: u32,
}

impl ItemKey {
    pub fn new(show_id: ShowId, season: u32, episode: u32) -> Self {
        Self {
            show_id,
            season,
            episode,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:S{:02}E{:02}",
            self.show_id, self.season, self.episode
        )
    }
}

/// A row as the store returns it: key plus a copy of the persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub key: ItemKey,
    pub state: ItemState,
}

/// A live, shared item.
///
/// `state` is the item's own lock. Holding it for one item never blocks
/// readers of another item.
#[derive(Debug)]
pub struct TrackedItem {
    key: ItemKey,
    name: String,
    state: Mutex<ItemState>,
}

impl TrackedItem {
    pub fn new(key: ItemKey, name: impl Into<String>, state: ItemState) -> Self {
        Self {
            key,
            name: name.into(),
            state: Mutex::new(state),
        }
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take the item's lock.
    pub async fn lock(&self) -> MutexGuard<'_, ItemState> {
        self.state.lock().await
    }

    /// Copy of the current state (takes and releases the lock).
    pub async fn snapshot(&self) -> ItemRecord {
        ItemRecord {
            key: self.key,
            state: *self.state.lock().await,
        }
    }

    /// "<key> <name>" for log lines.
    pub fn pretty_name(&self) -> String {
        format!("{} {}", self.key, self.name)
    }
}

/// The collection that owns tracked items.
#[derive(Debug)]
pub struct Show {
    id: ShowId,
    name: String,
    items: BTreeMap<(u32, u32), Arc<TrackedItem>>,
}

impl Show {
    pub fn new(id: ShowId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    /// Add an episode. Replaces any existing item with the same season/episode.
    pub fn with_item(mut self, season: u32, episode: u32, name: &str, state: ItemState) -> Self {
        let key = ItemKey::new(self.id, season, episode);
        self.items
            .insert((season, episode), Arc::new(TrackedItem::new(key, name, state)));
        self
    }

    pub fn id(&self) -> ShowId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up one episode. Never creates it.
    pub fn item(&self, season: u32, episode: u32) -> Option<Arc<TrackedItem>> {
        self.items.get(&(season, episode)).cloned()
    }

    /// Items in season/episode order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<TrackedItem>> {
        self.items.values()
    }
}
