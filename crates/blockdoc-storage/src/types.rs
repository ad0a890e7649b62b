//! Storage-layer types for the recovery record.
//!
//! [`RecoveryRecord`] is defined here (not in blockdoc-core) because the
//! saved-at stamp is a storage concern: document states only gain one when
//! they are mirrored to durable storage.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use blockdoc_core::{Block, BlockContent, BlockId, DocumentState};

/// Well-known key the live document is mirrored under.
pub const RECOVERY_KEY: &str = "blockdoc-editor-recovery";

/// The durable `{ blocks, blockIds }` mirror of the live document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryRecord<C = BlockContent> {
    pub blocks: IndexMap<BlockId, Block<C>>,
    pub block_ids: Vec<BlockId>,
    /// Absent in records written by older editors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl<C: Clone> RecoveryRecord<C> {
    /// Captures `state` as of `saved_at`.
    pub fn from_state(state: &DocumentState<C>, saved_at: DateTime<Utc>) -> Self {
        RecoveryRecord {
            blocks: state.blocks.clone(),
            block_ids: state.block_ids.clone(),
            saved_at: Some(saved_at),
        }
    }
}

impl<C> RecoveryRecord<C> {
    pub fn into_state(self) -> DocumentState<C> {
        DocumentState {
            blocks: self.blocks,
            block_ids: self.block_ids,
        }
    }
}
