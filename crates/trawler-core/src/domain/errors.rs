//! Errors - エラー型と分類
//!
//! - `StoreError`: item store / view の失敗。query と persist はサイクル全体を止める。
//! - `ProviderError`: 1 アイテム分の失敗。サイクルは次のアイテムへ進む。
//! - `TrawlerError`: サイクルの外へ出る唯一のエラー型。

use thiserror::Error;

use super::candidate::CandidateId;
use super::ids::ShowId;
use super::item::ItemKey;

/// Failure reported by an `ItemStore` or `AggregateViews` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed query or storage fault.
    #[error("store query failed: {0}")]
    Query(String),

    /// More than one owner matched an id that must be unique.
    #[error("expected a single show matching show_id={show_id}, found {matches}")]
    AmbiguousOwner { show_id: ShowId, matches: usize },

    #[error("no show matching show_id={0}")]
    OwnerNotFound(ShowId),

    #[error("failed to persist status for {key}: {reason}")]
    Persist { key: ItemKey, reason: String },
}

/// Failure reported by a `Provider` for one item or one candidate.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("candidate search failed for {item}: {reason}")]
    Search { item: ItemKey, reason: String },

    #[error("acquisition of candidate {candidate} failed: {reason}")]
    Acquire {
        candidate: CandidateId,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum TrawlerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
