//! Document model for the block editor history engine.
//!
//! A page is a collection of typed content blocks. This crate defines the
//! blocks themselves, the document state the UI renders from, the
//! replayable edit actions, and the pure projector that folds actions into
//! states.
//!
//! # Modules
//!
//! - [`id`]: BlockId, ActionId, SnapshotId newtypes
//! - [`content`]: BlockContent tagged union and BlockType tags
//! - [`block`]: Block and BlockPatch (shallow merge)
//! - [`document`]: DocumentState and its invariant check
//! - [`action`]: Action, ActionPayload, NewAction, Anchor
//! - [`projector`]: apply_action / replay
//! - [`error`]: CoreError

pub mod action;
pub mod block;
pub mod content;
pub mod document;
pub mod error;
pub mod id;
pub mod projector;

// Re-export commonly used types
pub use action::{Action, ActionKind, ActionMetadata, ActionPayload, Anchor, NewAction};
pub use block::{Block, BlockPatch, Meta};
pub use content::{BlockContent, BlockType, GalleryImage};
pub use document::DocumentState;
pub use error::CoreError;
pub use id::{ActionId, BlockId, SnapshotId};
pub use projector::{apply_action, apply_payload, replay};
