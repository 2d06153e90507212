//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース。タイムスタンプ部分は Clock から取る

use std::sync::Arc;

use ulid::Ulid;

use crate::domain::ids::{AcquisitionId, CycleId};
use crate::ports::Clock;

/// IdGenerator はサイクルと取得操作の ID を生成
pub trait IdGenerator: Send + Sync {
    fn generate_cycle_id(&self) -> CycleId;

    fn generate_acquisition_id(&self) -> AcquisitionId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡すとタイムスタンプ部分が固定されます（ランダム部分は毎回変わる）。
pub struct UlidGenerator {
    clock: Arc<dyn Clock>,
}

impl UlidGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl IdGenerator for UlidGenerator {
    fn generate_cycle_id(&self) -> CycleId {
        CycleId::from(self.next_ulid())
    }

    fn generate_acquisition_id(&self) -> AcquisitionId {
        AcquisitionId::from(self.next_ulid())
    }
}
