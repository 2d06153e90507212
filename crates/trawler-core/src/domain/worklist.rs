//! View snapshots and the per-cycle worklist.
//!
//! Views are immutable: a refresh produces a new `ViewSnapshot` and readers
//! keep whatever snapshot they already hold. The worklist borrows nothing
//! from the views; it clones the `Arc`s it needs and is dropped at the end of
//! the cycle.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::TrackedItem;

/// Which aggregate view a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Items whose availability date passed without acquisition.
    Missing,
    /// Unaired items whose availability date is today.
    Airing,
    /// Unaired items due in the next few days.
    Upcoming,
}

/// Immutable result of one view refresh.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    kind: ViewKind,
    items: Arc<[Arc<TrackedItem>]>,
    refreshed_at: DateTime<Utc>,
}

impl ViewSnapshot {
    pub fn new(kind: ViewKind, items: Vec<Arc<TrackedItem>>, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            items: items.into(),
            refreshed_at,
        }
    }

    /// A snapshot that has never been refreshed.
    pub fn empty(kind: ViewKind) -> Self {
        Self::new(kind, Vec::new(), DateTime::<Utc>::default())
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn items(&self) -> &[Arc<TrackedItem>] {
        &self.items
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Items eligible for acquisition in one cycle.
#[derive(Debug, Default)]
pub struct WorkList {
    items: Vec<Arc<TrackedItem>>,
}

impl WorkList {
    /// Union of the given snapshots, in order. An item that appears in more
    /// than one snapshot keeps its first position.
    pub fn union<'a>(snapshots: impl IntoIterator<Item = &'a ViewSnapshot>) -> Self {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for snapshot in snapshots {
            for item in snapshot.items() {
                if seen.insert(item.key()) {
                    items.push(Arc::clone(item));
                }
            }
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TrackedItem>> {
        self.items.iter()
    }
}
