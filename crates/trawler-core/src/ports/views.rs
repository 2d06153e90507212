//! AggregateViews port - missing / airing / upcoming ビューの再計算
//!
//! 再計算の結果は不変なスナップショットとして返します。ホスト側の他の
//! 読み手は直前のスナップショットを持ち続けられます。

use async_trait::async_trait;

use crate::domain::{StoreError, ViewSnapshot};

#[async_trait]
pub trait AggregateViews: Send + Sync {
    async fn refresh_missing(&self) -> Result<ViewSnapshot, StoreError>;

    async fn refresh_airing(&self) -> Result<ViewSnapshot, StoreError>;

    async fn refresh_upcoming(&self) -> Result<ViewSnapshot, StoreError>;
}
