//! trawler-core
//!
//! Periodic backlog search for tracked episodic items.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, item, candidate, worklist, errors）
//! - **ports**: 抽象化レイヤー（ItemStore, AggregateViews, Provider, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（reclassifier, search_cycle, scheduler, status）
//! - **impls**: 実装（インメモリのストアとビュー、台本どおりに動く Provider）
//! - **config**: 環境変数からのスケジューラ設定
//! - **observability**: tracing の初期化とスパン

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;
