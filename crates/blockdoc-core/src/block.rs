//! Blocks and shallow block patches.
//!
//! [`Block`] is generic over its content type so the history engine can be
//! reused for any serializable payload; the page editor instantiates it with
//! [`BlockContent`](crate::content::BlockContent), which is the default.

use serde::{Deserialize, Serialize};

use crate::content::BlockContent;
use crate::id::BlockId;

/// Opaque presentation metadata (style, layout, animation settings).
pub type Meta = serde_json::Value;

/// One independently editable content unit of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block<C = BlockContent> {
    pub id: BlockId,
    pub content: C,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Meta>,
}

impl<C> Block<C> {
    /// Creates a block with no presentation metadata.
    pub fn new(id: impl Into<BlockId>, content: C) -> Self {
        Block {
            id: id.into(),
            content,
            style: None,
            layout: None,
            animation: None,
        }
    }

    pub fn with_style(mut self, style: Meta) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_layout(mut self, layout: Meta) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_animation(mut self, animation: Meta) -> Self {
        self.animation = Some(animation);
        self
    }
}

impl<C: Clone> Block<C> {
    /// Returns this block with `patch` shallow-merged on top.
    ///
    /// The id never changes.
    pub fn apply_patch(&self, patch: &BlockPatch<C>) -> Block<C> {
        Block {
            id: self.id.clone(),
            content: patch
                .content
                .clone()
                .unwrap_or_else(|| self.content.clone()),
            style: patch.style.clone().or_else(|| self.style.clone()),
            layout: patch.layout.clone().or_else(|| self.layout.clone()),
            animation: patch.animation.clone().or_else(|| self.animation.clone()),
        }
    }

    /// Clones this block under a fresh id (used for duplication).
    pub fn duplicate(&self) -> Block<C> {
        Block {
            id: BlockId::new(),
            ..self.clone()
        }
    }
}

/// Top-level fields to replace on a block. Absent fields are kept.
///
/// Missing keys deserialize as `None` without requiring `C: Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPatch<C = BlockContent> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<C>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Meta>,
}

impl<C> Default for BlockPatch<C> {
    fn default() -> Self {
        BlockPatch {
            content: None,
            style: None,
            layout: None,
            animation: None,
        }
    }
}

impl<C> BlockPatch<C> {
    /// A patch replacing only the content.
    pub fn content(content: C) -> Self {
        BlockPatch {
            content: Some(content),
            ..Default::default()
        }
    }

    /// A patch replacing only the style.
    pub fn style(style: Meta) -> Self {
        BlockPatch {
            style: Some(style),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.style.is_none()
            && self.layout.is_none()
            && self.animation.is_none()
    }
}
