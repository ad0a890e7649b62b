//! The renderable document state.
//!
//! [`DocumentState`] pairs a block map with the ordered list of block ids
//! that defines render order. The UI only ever renders from a state derived
//! by the projector; nothing mutates it in place.
//!
//! Invariant: `block_ids` contains exactly the keys of `blocks`, each once,
//! and every block is stored under its own id. [`DocumentState::validate`]
//! checks this for states that arrive from outside (recovery records,
//! caller-supplied initial states).

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::content::BlockContent;
use crate::error::CoreError;
use crate::id::BlockId;

/// `{ blocks, blockIds }` -- everything the editor renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState<C = BlockContent> {
    pub blocks: IndexMap<BlockId, Block<C>>,
    pub block_ids: Vec<BlockId>,
}

impl<C> Default for DocumentState<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C> DocumentState<C> {
    /// An empty document.
    pub fn empty() -> Self {
        DocumentState {
            blocks: IndexMap::new(),
            block_ids: Vec::new(),
        }
    }

    /// Builds a document whose order is the iteration order of `blocks`.
    ///
    /// Later blocks with a repeated id replace earlier ones in place.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block<C>>) -> Self {
        let mut state = Self::empty();
        for block in blocks {
            if !state.blocks.contains_key(&block.id) {
                state.block_ids.push(block.id.clone());
            }
            state.blocks.insert(block.id.clone(), block);
        }
        state
    }

    pub fn len(&self) -> usize {
        self.block_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.block_ids.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block<C>> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Render position of `id`, if present.
    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.block_ids.iter().position(|b| b == id)
    }

    /// Blocks in render order. Ids without a block are skipped.
    pub fn ordered_blocks(&self) -> impl Iterator<Item = &Block<C>> {
        self.block_ids.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Checks the map/order invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut seen = HashSet::with_capacity(self.block_ids.len());
        for id in &self.block_ids {
            if !seen.insert(id) {
                return Err(CoreError::Inconsistent {
                    reason: format!("duplicate id '{}' in blockIds", id),
                });
            }
            if !self.blocks.contains_key(id) {
                return Err(CoreError::Inconsistent {
                    reason: format!("blockIds references missing block '{}'", id),
                });
            }
        }

        for (key, block) in &self.blocks {
            if key != &block.id {
                return Err(CoreError::Inconsistent {
                    reason: format!("block '{}' stored under key '{}'", block.id, key),
                });
            }
            if !seen.contains(key) {
                return Err(CoreError::Inconsistent {
                    reason: format!("block '{}' missing from blockIds", key),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn para(id: &str) -> Block {
        Block::new(id, BlockContent::Paragraph { text: id.into() })
    }

    fn ids(state: &DocumentState) -> Vec<&str> {
        state.block_ids.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn test_from_blocks_preserves_order() {
        let state = DocumentState::from_blocks([para("a"), para("b"), para("c")]);
        assert_eq!(ids(&state), vec!["a", "b", "c"]);
        assert_eq!(state.index_of(&"b".into()), Some(1));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_from_blocks_dedups_ids() {
        let state = DocumentState::from_blocks([para("a"), para("a")]);
        assert_eq!(state.len(), 1);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_order_entry() {
        let mut state = DocumentState::from_blocks([para("a")]);
        state.block_ids.push("a".into());
        assert!(matches!(
            state.validate(),
            Err(CoreError::Inconsistent { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_orphan_block() {
        let mut state = DocumentState::from_blocks([para("a"), para("b")]);
        state.block_ids.retain(|id| id.as_str() != "b");
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_block() {
        let mut state: DocumentState = DocumentState::empty();
        state.block_ids.push("ghost".into());
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_key() {
        let mut state: DocumentState = DocumentState::empty();
        state.blocks.insert("x".into(), para("y"));
        state.block_ids.push("x".into());
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_json_shape_uses_block_ids_key() {
        let state = DocumentState::from_blocks([para("a")]);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["blockIds"], json!(["a"]));
        assert_eq!(value["blocks"]["a"]["content"]["type"], "paragraph");
    }

    #[test]
    fn test_ordered_blocks_follow_block_ids() {
        let mut state = DocumentState::from_blocks([para("a"), para("b")]);
        state.block_ids.reverse();
        let order: Vec<&str> = state.ordered_blocks().map(|b| b.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
