//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部の協力者（アイテムストア、集計ビュー、検索プロバイダ）への
//! インターフェースで、実装の詳細を隠蔽します。
//!
//! 開発用・テスト用の実装は `impls` にあります。

pub mod clock;
pub mod id_generator;
pub mod item_store;
pub mod provider;
pub mod views;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::item_store::ItemStore;
pub use self::provider::Provider;
pub use self::views::AggregateViews;
