//! Editing history engine for the block editor.
//!
//! Wraps the pure document model from `blockdoc-core` with linear
//! undo/redo, snapshots, crash recovery and keyboard shortcuts. The
//! [`Editor`] facade is what a UI holds; the other modules are usable on
//! their own.
//!
//! # Modules
//!
//! - [`history`]: HistoryEngine action log, cursor and pruning
//! - [`snapshot`]: Snapshot and the bounded SnapshotStore
//! - [`recovery`]: RecoveryBridge and the startup RecoveryPrompt
//! - [`shortcuts`]: chords, default bindings and focus guarding
//! - [`editor`]: the Editor facade
//! - [`timers`]: tokio autosave tasks over a shared editor
//! - [`config`]: EditorConfig and its JSON loading
//! - [`error`]: EditorError

pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod recovery;
pub mod shortcuts;
pub mod snapshot;
pub mod timers;

pub use config::{AutosaveConfig, EditorConfig, HistoryConfig, ShortcutConfig};
pub use editor::{paragraph_factory, BlockFactory, Editor, SaveHandler};
pub use error::EditorError;
pub use history::{HistoryEngine, HistoryEntry};
pub use recovery::{RecoveryBridge, RecoveryPrompt};
pub use shortcuts::{
    Chord, EditorCommand, FocusTarget, Key, KeyEvent, Modifiers, ShortcutError, ShortcutMap,
};
pub use snapshot::{Snapshot, SnapshotMetadata, SnapshotStore};
pub use timers::{AutosaveTimers, SharedEditor};
