//! App - アプリケーション層
//!
//! ports を組み合わせて検索サイクルとそのスケジューラを実装します。
//!
//! # 主要コンポーネント
//! - **Reclassifier**: 放送日を過ぎた Unaired を Missed にする
//! - **SearchCycle**: 再分類 → ビュー更新 → ワークリストの検索と取得
//! - **CycleScheduler**: 一定間隔でサイクルを回すバックグラウンドループ
//! - **status**: ホスト向けのレポート型

pub mod reclassifier;
pub mod scheduler;
pub mod search_cycle;
pub mod status;

pub use self::reclassifier::Reclassifier;
pub use self::scheduler::{CycleRunner, CycleScheduler};
pub use self::search_cycle::SearchCycle;
pub use self::status::{CycleReport, ReclassifyReport, SchedulerStatus};
