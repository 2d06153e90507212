//! Domain model (IDs, status, items, candidates, views, errors).
//!
//! ここには I/O を持たない型だけを置きます。ストアやプロバイダへの
//! アクセスは `ports` の trait 越しに行います。

pub mod candidate;
pub mod errors;
pub mod ids;
pub mod item;
pub mod status;
pub mod worklist;

pub use self::candidate::{AcquisitionResult, Candidate, CandidateId};
pub use self::errors::{ProviderError, StoreError, TrawlerError};
pub use self::ids::{AcquisitionId, CycleId, Id, IdMarker, ShowId};
pub use self::item::{ItemKey, ItemRecord, Show, TrackedItem};
pub use self::status::{ItemState, Status};
pub use self::worklist::{ViewKind, ViewSnapshot, WorkList};
