//! Clock port - 時刻の抽象化
//!
//! 再分類の基準日（today）と ID のタイムスタンプはここから取ります。
//! スケジューラの周期判定は単調時計（`tokio::time::Instant`）を使うので、
//! この trait は通りません。

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Clock は現在時刻と今日の日付を提供
///
/// # テスト容易性
/// - trait により時刻を差し替え可能
/// - テストでは FixedClock を使用
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for availability comparisons.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// 本番用: システム時刻。`today()` はローカルタイムゾーンの日付。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// テスト用: 常に同じ時刻を返す
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Noon (UTC) on the given date.
    pub fn on(date: NaiveDate) -> Self {
        let at = date
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_default();
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
