//! Editor error types.
//!
//! [`EditorError`] is the unified error type for constructing and driving
//! the editor. Most runtime failures never reach callers: storage problems
//! are logged and editing continues in memory, and out-of-range undo/redo
//! are plain no-ops. What remains are configuration mistakes and explicit
//! user actions that need a visible notice.

use blockdoc_core::{CoreError, SnapshotId};
use blockdoc_storage::StorageError;

use crate::shortcuts::ShortcutError;

/// Errors surfaced by the editor.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// A named snapshot was requested with a blank name.
    #[error("snapshot name required")]
    SnapshotNameRequired,

    /// No snapshot with the given id exists.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),

    /// Configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A keyboard shortcut binding failed to parse.
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    /// A supplied document violates the block map / order invariant.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage backend could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
