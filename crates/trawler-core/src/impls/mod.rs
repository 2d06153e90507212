//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryItemStore**: 行テーブルとライブな Show を持つアイテムストア
//! - **InMemoryViews**: ライブなアイテムから作る集計ビュー
//! - **ScriptedProvider**: 事前登録した候補を返すプロバイダ
//!
//! # 本番用実装
//! 本番のストアやプロバイダはホストアプリ側で ports の trait を実装します。

pub mod inmem_store;
pub mod inmem_views;
pub mod scripted_provider;

pub use self::inmem_store::InMemoryItemStore;
pub use self::inmem_views::{InMemoryViews, UPCOMING_WINDOW_DAYS};
pub use self::scripted_provider::ScriptedProvider;
