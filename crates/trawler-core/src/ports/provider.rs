//! Provider port - 外部ソースへの検索と取得
//!
//! 取得に成功したアイテムを `Snatched` にするのはプロバイダ側の責務です。
//! サーチサイクルは結果をログに出すだけで、状態には触りません。

use async_trait::async_trait;

use crate::domain::{AcquisitionResult, Candidate, ProviderError, TrackedItem};

#[async_trait]
pub trait Provider: Send + Sync {
    /// Candidates for one item, most preferred first. An empty list is not an error.
    async fn find_candidates(&self, item: &TrackedItem) -> Result<Vec<Candidate>, ProviderError>;

    /// Acquire one candidate. Marks the underlying item acquired as a side effect.
    async fn acquire(&self, candidate: &Candidate) -> Result<AcquisitionResult, ProviderError>;
}
