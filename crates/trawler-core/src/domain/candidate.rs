//! Candidate model: what a provider returns for one item, and what it
//! reports back after an acquisition.
//!
//! Candidates are opaque beyond their id. The order of a provider's list is
//! the preference order; nothing here scores them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AcquisitionId;
use super::item::ItemKey;

/// Provider-assigned candidate identifier (opaque).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One possible source for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub item: ItemKey,
    pub title: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, item: ItemKey, title: impl Into<String>) -> Self {
        Self {
            id: CandidateId::new(id),
            item,
            title: title.into(),
        }
    }
}

/// What the provider reports after `acquire`.
///
/// The search cycle only logs this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionResult {
    pub acquisition_id: AcquisitionId,
    pub candidate_id: CandidateId,
    pub item: ItemKey,
    pub accepted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
