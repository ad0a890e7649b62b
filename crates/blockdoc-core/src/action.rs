//! Replayable edit actions.
//!
//! An [`Action`] is an immutable record of one edit. Its [`ActionPayload`]
//! carries everything needed to apply the edit to a document state, so any
//! state can be rebuilt by replaying actions from an initial state; no
//! inverse operation is ever stored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockPatch};
use crate::content::BlockContent;
use crate::id::{ActionId, BlockId};

/// Kind of an action, independent of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    AddBlock,
    UpdateBlock,
    DeleteBlock,
    MoveBlock,
    DuplicateBlock,
    ReorderBlocks,
}

impl ActionKind {
    /// Description used when the caller did not supply one.
    pub fn default_description(self) -> &'static str {
        match self {
            ActionKind::AddBlock => "Add block",
            ActionKind::UpdateBlock => "Update block",
            ActionKind::DeleteBlock => "Delete block",
            ActionKind::MoveBlock => "Move block",
            ActionKind::DuplicateBlock => "Duplicate block",
            ActionKind::ReorderBlocks => "Reorder blocks",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::AddBlock => "AddBlock",
            ActionKind::UpdateBlock => "UpdateBlock",
            ActionKind::DeleteBlock => "DeleteBlock",
            ActionKind::MoveBlock => "MoveBlock",
            ActionKind::DuplicateBlock => "DuplicateBlock",
            ActionKind::ReorderBlocks => "ReorderBlocks",
        };
        f.write_str(name)
    }
}

/// Where an added block lands in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    /// Immediately after the given block.
    After(BlockId),
    /// Immediately before the given block.
    Before(BlockId),
    /// At the end of the document.
    #[default]
    End,
}

impl Anchor {
    /// Resolves the optional `after`/`before` pair the UI supplies.
    /// `after` wins when both are given.
    pub fn from_options(after: Option<BlockId>, before: Option<BlockId>) -> Self {
        match (after, before) {
            (Some(id), _) => Anchor::After(id),
            (None, Some(id)) => Anchor::Before(id),
            (None, None) => Anchor::End,
        }
    }
}

/// Data needed to apply one edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionPayload<C = BlockContent> {
    /// A new block inserted at `anchor`.
    AddBlock {
        block: Block<C>,
        #[serde(default)]
        anchor: Anchor,
    },
    /// Top-level fields of an existing block replaced.
    #[serde(rename_all = "camelCase")]
    UpdateBlock {
        block_id: BlockId,
        updates: BlockPatch<C>,
    },
    /// A block removed.
    #[serde(rename_all = "camelCase")]
    DeleteBlock { block_id: BlockId },
    /// A block moved from one render position to another (list splice).
    #[serde(rename_all = "camelCase")]
    MoveBlock {
        block_id: BlockId,
        previous_index: usize,
        new_index: usize,
    },
    /// An already-cloned block (fresh id) placed after its original.
    #[serde(rename_all = "camelCase")]
    DuplicateBlock { original_id: BlockId, block: Block<C> },
    /// Render order replaced wholesale.
    #[serde(rename_all = "camelCase")]
    ReorderBlocks { block_ids: Vec<BlockId> },
}

impl<C> ActionPayload<C> {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::AddBlock { .. } => ActionKind::AddBlock,
            ActionPayload::UpdateBlock { .. } => ActionKind::UpdateBlock,
            ActionPayload::DeleteBlock { .. } => ActionKind::DeleteBlock,
            ActionPayload::MoveBlock { .. } => ActionKind::MoveBlock,
            ActionPayload::DuplicateBlock { .. } => ActionKind::DuplicateBlock,
            ActionPayload::ReorderBlocks { .. } => ActionKind::ReorderBlocks,
        }
    }
}

/// Descriptive metadata attached to every recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMetadata {
    pub description: String,
    pub undoable: bool,
}

/// An action as submitted for recording, before it has an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAction<C = BlockContent> {
    pub payload: ActionPayload<C>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_undoable")]
    pub undoable: bool,
}

fn default_undoable() -> bool {
    true
}

impl<C> NewAction<C> {
    /// An undoable action with the default description for its kind.
    pub fn new(payload: ActionPayload<C>) -> Self {
        NewAction {
            payload,
            description: None,
            undoable: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Stamps the action with a fresh id and the current time.
    pub fn into_action(self) -> Action<C> {
        let kind = self.payload.kind();
        Action {
            id: ActionId::new(),
            timestamp: Utc::now(),
            metadata: ActionMetadata {
                description: self
                    .description
                    .unwrap_or_else(|| kind.default_description().to_string()),
                undoable: self.undoable,
            },
            payload: self.payload,
        }
    }
}

impl<C> From<ActionPayload<C>> for NewAction<C> {
    fn from(payload: ActionPayload<C>) -> Self {
        NewAction::new(payload)
    }
}

/// An immutable, recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action<C = BlockContent> {
    pub id: ActionId,
    pub timestamp: DateTime<Utc>,
    pub payload: ActionPayload<C>,
    pub metadata: ActionMetadata,
}

impl<C> Action<C> {
    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_description_filled_by_kind() {
        let action: Action = NewAction::new(ActionPayload::DeleteBlock {
            block_id: "a".into(),
        })
        .into_action();
        assert_eq!(action.metadata.description, "Delete block");
        assert!(action.metadata.undoable);
        assert_eq!(action.kind(), ActionKind::DeleteBlock);
    }

    #[test]
    fn test_explicit_description_kept() {
        let action: Action = NewAction::new(ActionPayload::ReorderBlocks { block_ids: vec![] })
            .with_description("Drag reorder")
            .into_action();
        assert_eq!(action.metadata.description, "Drag reorder");
    }

    #[test]
    fn test_anchor_prefers_after() {
        assert_eq!(
            Anchor::from_options(Some("a".into()), Some("b".into())),
            Anchor::After("a".into())
        );
        assert_eq!(
            Anchor::from_options(None, Some("b".into())),
            Anchor::Before("b".into())
        );
        assert_eq!(Anchor::from_options(None, None), Anchor::End);
    }

    #[test]
    fn test_new_action_json_shape() {
        let json = json!({
            "payload": {
                "type": "MoveBlock",
                "blockId": "p1",
                "previousIndex": 1,
                "newIndex": 0
            }
        });
        let action: NewAction = serde_json::from_value(json).unwrap();
        assert!(action.undoable);
        assert_eq!(
            action.payload,
            ActionPayload::MoveBlock {
                block_id: "p1".into(),
                previous_index: 1,
                new_index: 0,
            }
        );
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Plain {
        body: String,
    }

    #[test]
    fn test_update_payload_with_custom_content() {
        let json = json!({
            "type": "UpdateBlock",
            "blockId": "n1",
            "updates": { "content": { "body": "hello" } }
        });
        let payload: ActionPayload<Plain> = serde_json::from_value(json).unwrap();
        assert_eq!(
            payload,
            ActionPayload::UpdateBlock {
                block_id: "n1".into(),
                updates: BlockPatch::content(Plain {
                    body: "hello".into()
                }),
            }
        );
    }

    #[test]
    fn test_add_block_anchor_defaults_to_end() {
        let json = json!({
            "type": "AddBlock",
            "block": { "id": "d", "content": { "type": "divider" } }
        });
        let payload: ActionPayload = serde_json::from_value(json).unwrap();
        match payload {
            ActionPayload::AddBlock { anchor, .. } => assert_eq!(anchor, Anchor::End),
            other => panic!("unexpected payload: {:?}", other),
        }
    }
}
