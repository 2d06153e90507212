//! Observability - tracing の初期化とスパンのヘルパー
//!
//! ライブラリ側はマクロでイベントを出すだけで、subscriber の設定は
//! ホスト（CLI など）が `init_tracing` を呼んで行います。

use tracing::Span;

use crate::domain::{CycleId, ItemKey, Status, TrawlerError};

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"` or `"trawler_core=debug"`).
///
/// # Errors
///
/// Returns an error if the directive does not parse or a global subscriber
/// is already set.
pub fn init_tracing(default_directive: &str) -> Result<(), TrawlerError> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| TrawlerError::Config(format!("bad log directive: {e}")))?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
        .map_err(|e| TrawlerError::Config(format!("failed to init tracing subscriber: {e}")))
}

/// Span wrapping one search cycle.
pub fn cycle_span(cycle_id: CycleId) -> Span {
    tracing::info_span!("search.cycle", "cycle.id" = %cycle_id)
}

/// Emit a status transition event for one item.
pub fn record_status_transition(item: ItemKey, from: Status, to: Status) {
    tracing::info!(item = %item, from = %from, to = %to, "status_transition");
}
