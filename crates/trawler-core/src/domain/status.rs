//! Status - 追跡アイテムの取得状態と遷移ルール
//!
//! State transitions:
//! - Unaired -> Missed (availability date strictly in the past, see `mark_missed_if_stale`)
//! - Unknown | Unaired | Missed | Predownloaded -> Snatched (successful acquisition only)
//!
//! Snatched is terminal. Nothing in this crate moves an item out of it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Acquisition status of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Nothing is known about the item yet.
    Unknown,

    /// Not available yet (availability date today or in the future).
    Unaired,

    /// Availability date passed without the item being acquired.
    Missed,

    /// Acquired ahead of its availability date.
    Predownloaded,

    /// Acquired by a provider.
    Snatched,
}

impl Status {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Snatched)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::Unaired => "unaired",
            Status::Missed => "missed",
            Status::Predownloaded => "predownloaded",
            Status::Snatched => "snatched",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mutable part of a tracked item.
///
/// Only mutate this through the item's own lock (`TrackedItem::lock`),
/// and persist before releasing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub status: Status,

    /// Date after which acquisition is possible.
    pub air_date: NaiveDate,
}

impl ItemState {
    pub fn new(status: Status, air_date: NaiveDate) -> Self {
        Self { status, air_date }
    }

    /// `Unaired -> Missed` when `air_date` is strictly before `today`.
    ///
    /// Returns `true` if the status changed.
    pub fn mark_missed_if_stale(&mut self, today: NaiveDate) -> bool {
        if self.status == Status::Unaired && self.air_date < today {
            self.status = Status::Missed;
            true
        } else {
            false
        }
    }

    /// Record a successful acquisition.
    ///
    /// Returns the previous status, or `None` if the item was already snatched.
    pub fn mark_snatched(&mut self) -> Option<Status> {
        if self.status.is_terminal() {
            return None;
        }
        let previous = self.status;
        self.status = Status::Snatched;
        Some(previous)
    }

    /// Still waiting for its availability date, and that date is `today`.
    pub fn is_airing_on(&self, today: NaiveDate) -> bool {
        self.status == Status::Unaired && self.air_date == today
    }
}
