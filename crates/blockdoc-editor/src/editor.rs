//! The editor facade.
//!
//! [`Editor`] is the single object a UI talks to. It owns the history, the
//! published document state, the recovery bridge and the shortcut map.
//! Every mutation records an action, re-derives the published state from
//! the history and hands that state to the recovery bridge's on-change
//! trigger.
//!
//! Editors are caller-owned: construct one per open document and drop it
//! (after [`Editor::dispose`]) when the document closes.

use serde::de::DeserializeOwned;
use serde::Serialize;

use blockdoc_core::{
    ActionId, ActionPayload, Anchor, Block, BlockContent, BlockId, BlockPatch, DocumentState,
    NewAction, SnapshotId,
};
use blockdoc_storage::RecoveryStore;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::history::{HistoryEngine, HistoryEntry};
use crate::recovery::{RecoveryBridge, RecoveryPrompt};
use crate::shortcuts::{EditorCommand, KeyEvent, ShortcutMap};
use crate::snapshot::Snapshot;

/// Produces the block inserted by the add-block shortcut.
pub type BlockFactory<C> = Box<dyn FnMut() -> Block<C> + Send>;

/// Receives the current document when the save shortcut fires.
pub type SaveHandler<C> = Box<dyn FnMut(&DocumentState<C>) + Send>;

/// Factory producing an empty paragraph with a fresh id.
pub fn paragraph_factory() -> BlockFactory<BlockContent> {
    Box::new(|| {
        Block::new(
            BlockId::new(),
            BlockContent::Paragraph {
                text: String::new(),
            },
        )
    })
}

/// Editing session over one document.
pub struct Editor<S, C = BlockContent> {
    history: HistoryEngine<C>,
    state: DocumentState<C>,
    recovery: RecoveryBridge<S, C>,
    prompt: Option<RecoveryPrompt<C>>,
    shortcuts: ShortcutMap,
    active_block: Option<BlockId>,
    block_factory: BlockFactory<C>,
    save_handler: Option<SaveHandler<C>>,
}

impl<S: RecoveryStore> Editor<S, BlockContent> {
    /// Opens an editor whose add-block shortcut inserts empty paragraphs.
    pub fn new(
        initial_state: DocumentState,
        config: EditorConfig,
        store: S,
    ) -> Result<Self, EditorError> {
        Editor::with_factory(initial_state, config, store, paragraph_factory())
    }
}

impl<S, C> Editor<S, C>
where
    S: RecoveryStore,
    C: Clone + Serialize + DeserializeOwned,
{
    /// Opens an editor with a custom add-block factory.
    ///
    /// Any recovery record already in `store` is read here, before the
    /// editor writes anything, and is available from
    /// [`recovery_prompt`](Self::recovery_prompt).
    pub fn with_factory(
        initial_state: DocumentState<C>,
        config: EditorConfig,
        store: S,
        block_factory: BlockFactory<C>,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        initial_state.validate()?;
        let shortcuts = ShortcutMap::from_config(&config.shortcuts)?;

        let mut recovery = RecoveryBridge::new(store, config.autosave.persist_debounce);
        let prompt = recovery.take_prompt();
        let history = HistoryEngine::new(initial_state.clone(), config.history);

        tracing::info!(
            "Editor opened with {} block(s){}",
            initial_state.len(),
            if prompt.is_some() {
                ", recovery data available"
            } else {
                ""
            }
        );

        Ok(Editor {
            history,
            state: initial_state,
            recovery,
            prompt,
            shortcuts,
            active_block: None,
            block_factory,
            save_handler: None,
        })
    }

    /// Replaces the add-block factory.
    pub fn with_block_factory(mut self, factory: BlockFactory<C>) -> Self {
        self.block_factory = factory;
        self
    }

    /// Installs the callback run by the save shortcut.
    pub fn with_save_handler(mut self, handler: SaveHandler<C>) -> Self {
        self.save_handler = Some(handler);
        self
    }

    /// The published document state.
    pub fn state(&self) -> &DocumentState<C> {
        &self.state
    }

    pub fn history(&self) -> &HistoryEngine<C> {
        &self.history
    }

    pub fn shortcuts(&self) -> &ShortcutMap {
        &self.shortcuts
    }

    pub fn recovery(&self) -> &RecoveryBridge<S, C> {
        &self.recovery
    }

    fn publish(&mut self) {
        self.state = self.history.current_state();
        self.recovery.note_change(&self.state);
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Records an arbitrary action.
    pub fn record(&mut self, action: impl Into<NewAction<C>>) -> ActionId {
        let id = self.history.record_action(action);
        self.publish();
        id
    }

    /// Adds `block` after `after`, else before `before`, else at the end.
    pub fn record_add_block(
        &mut self,
        block: Block<C>,
        after: Option<BlockId>,
        before: Option<BlockId>,
    ) -> ActionId {
        self.record(ActionPayload::AddBlock {
            block,
            anchor: Anchor::from_options(after, before),
        })
    }

    pub fn record_update_block(&mut self, block_id: BlockId, updates: BlockPatch<C>) -> ActionId {
        self.record(ActionPayload::UpdateBlock { block_id, updates })
    }

    pub fn record_delete_block(&mut self, block_id: BlockId) -> ActionId {
        self.record(ActionPayload::DeleteBlock { block_id })
    }

    pub fn record_move_block(
        &mut self,
        block_id: BlockId,
        previous_index: usize,
        new_index: usize,
    ) -> ActionId {
        self.record(ActionPayload::MoveBlock {
            block_id,
            previous_index,
            new_index,
        })
    }

    /// Records a duplicate. `block` is the already-cloned copy with its own id.
    pub fn record_duplicate_block(&mut self, original_id: BlockId, block: Block<C>) -> ActionId {
        self.record(ActionPayload::DuplicateBlock { original_id, block })
    }

    pub fn record_reorder_blocks(&mut self, block_ids: Vec<BlockId>) -> ActionId {
        self.record(ActionPayload::ReorderBlocks { block_ids })
    }

    // -----------------------------------------------------------------------
    // Undo / redo
    // -----------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(state) => {
                self.state = state;
                self.recovery.note_change(&self.state);
                true
            }
            None => false,
        }
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(state) => {
                self.state = state;
                self.recovery.note_change(&self.state);
                true
            }
            None => false,
        }
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.history_entries()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Saves a named snapshot. A blank name is rejected with a warning.
    pub fn save_snapshot(&mut self, name: &str) -> Option<SnapshotId> {
        match self.history.save_named_snapshot(name) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Snapshot not saved: {}", e);
                None
            }
        }
    }

    /// Restores a snapshot. Returns false for an unknown id.
    pub fn restore_snapshot(&mut self, id: &SnapshotId) -> bool {
        match self.history.restore_snapshot(id) {
            Some(state) => {
                self.state = state;
                self.recovery.note_change(&self.state);
                true
            }
            None => {
                tracing::warn!("Cannot restore: {}", EditorError::SnapshotNotFound(id.clone()));
                false
            }
        }
    }

    /// Snapshots newest first.
    pub fn snapshots(&self) -> Vec<&Snapshot<C>> {
        self.history.snapshots()
    }

    pub fn delete_snapshot(&mut self, id: &SnapshotId) -> bool {
        self.history.delete_snapshot(id)
    }

    /// Timed snapshot, driven by the autosave timer.
    pub fn auto_snapshot(&mut self) -> SnapshotId {
        self.history.auto_snapshot()
    }

    // -----------------------------------------------------------------------
    // Recovery
    // -----------------------------------------------------------------------

    /// The recovery record found when the editor opened, if any. Yields it
    /// at most once.
    pub fn recovery_prompt(&mut self) -> Option<RecoveryPrompt<C>> {
        self.prompt.take()
    }

    /// Accepts a recovery prompt. The recovered document becomes the new
    /// initial state and the history starts over from it.
    pub fn recover(&mut self, prompt: RecoveryPrompt<C>) {
        tracing::info!("Recovering document saved at {}", prompt.label);
        let state = prompt.recover();
        self.history.clear(state);
        self.active_block = None;
        self.publish();
    }

    /// Declines a recovery prompt and deletes the stored record.
    pub fn discard_recovery(&mut self, prompt: RecoveryPrompt<C>) -> bool {
        self.recovery.discard(prompt)
    }

    /// Recovery backstop: writes the published state if a change was held
    /// back or rejected, or if the stored record has gone missing.
    pub fn flush_recovery(&mut self) -> bool {
        self.recovery.flush(&self.state)
    }

    /// Final flush before the editor is dropped.
    pub fn dispose(&mut self) {
        self.recovery.flush(&self.state);
        tracing::debug!("Editor disposed");
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    pub fn active_block(&self) -> Option<&BlockId> {
        self.active_block.as_ref()
    }

    pub fn set_active_block(&mut self, block_id: Option<BlockId>) {
        self.active_block = block_id;
    }

    /// Active block, if it still exists, and its render position.
    fn active_position(&self) -> Option<(BlockId, usize)> {
        let id = self.active_block.as_ref()?;
        self.state.index_of(id).map(|idx| (id.clone(), idx))
    }

    /// Resolves and runs a key press. Returns the matched command, even
    /// when running it was a no-op, so the caller can suppress the
    /// browser default.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<EditorCommand> {
        let command = self.shortcuts.resolve(event)?;
        let ran = self.execute(command);
        tracing::debug!("Shortcut {:?} (ran: {})", command, ran);
        Some(command)
    }

    /// Runs a command. Returns false when its precondition does not hold.
    pub fn execute(&mut self, command: EditorCommand) -> bool {
        match command {
            EditorCommand::Save => match self.save_handler.as_mut() {
                Some(handler) => {
                    handler(&self.state);
                    true
                }
                None => false,
            },
            EditorCommand::Undo => self.undo(),
            EditorCommand::Redo => self.redo(),
            EditorCommand::AddBlock => {
                let block = (self.block_factory)();
                let new_id = block.id.clone();
                let after = self.active_position().map(|(id, _)| id);
                self.record_add_block(block, after, None);
                self.active_block = Some(new_id);
                true
            }
            EditorCommand::DeleteBlock => {
                let Some((id, idx)) = self.active_position() else {
                    return false;
                };
                self.record_delete_block(id);
                let ids = &self.state.block_ids;
                self.active_block = ids
                    .get(idx)
                    .or_else(|| idx.checked_sub(1).and_then(|prev| ids.get(prev)))
                    .cloned();
                true
            }
            EditorCommand::DuplicateBlock => {
                let Some((id, _)) = self.active_position() else {
                    return false;
                };
                let Some(copy) = self.state.get(&id).map(Block::duplicate) else {
                    return false;
                };
                let copy_id = copy.id.clone();
                self.record_duplicate_block(id, copy);
                self.active_block = Some(copy_id);
                true
            }
            EditorCommand::MoveUp => match self.active_position() {
                Some((id, idx)) if idx > 0 => {
                    self.record_move_block(id, idx, idx - 1);
                    true
                }
                _ => false,
            },
            EditorCommand::MoveDown => match self.active_position() {
                Some((id, idx)) if idx + 1 < self.state.len() => {
                    self.record_move_block(id, idx, idx + 1);
                    true
                }
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::{FocusTarget, Key, Modifiers};
    use blockdoc_storage::{InMemoryStore, RECOVERY_KEY};
    use std::sync::{Arc, Mutex};

    fn para(id: &str) -> Block {
        Block::new(id, BlockContent::Paragraph { text: id.into() })
    }

    fn doc(ids: &[&str]) -> DocumentState {
        DocumentState::from_blocks(ids.iter().map(|id| para(id)))
    }

    fn order(editor: &Editor<InMemoryStore>) -> Vec<String> {
        editor
            .state()
            .block_ids
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    fn editor(ids: &[&str]) -> Editor<InMemoryStore> {
        Editor::new(doc(ids), EditorConfig::default(), InMemoryStore::new()).unwrap()
    }

    fn key(spec: &str) -> KeyEvent {
        let chord = crate::shortcuts::Chord::parse(spec).unwrap();
        KeyEvent::new(chord.key, chord.modifiers)
    }

    #[test]
    fn test_record_publishes_and_persists() {
        let mut ed = editor(&[]);
        ed.record_add_block(para("a"), None, None);
        assert_eq!(order(&ed), vec!["a"]);
        assert!(ed.recovery().store().read(RECOVERY_KEY).unwrap().is_some());
    }

    #[test]
    fn test_invalid_initial_state_rejected() {
        let mut bad = doc(&["a"]);
        bad.block_ids.push("ghost".into());
        let result = Editor::new(bad, EditorConfig::default(), InMemoryStore::new());
        assert!(matches!(result, Err(EditorError::Core(_))));
    }

    #[test]
    fn test_undo_redo_noops_return_false() {
        let mut ed = editor(&["a"]);
        assert!(!ed.undo());
        assert!(!ed.redo());
        ed.record_delete_block("a".into());
        assert!(ed.undo());
        assert_eq!(order(&ed), vec!["a"]);
        assert!(ed.redo());
        assert!(ed.state().is_empty());
    }

    #[test]
    fn test_blank_snapshot_name_is_rejected() {
        let mut ed = editor(&["a"]);
        assert!(ed.save_snapshot("  ").is_none());
        assert_eq!(ed.snapshots().len(), 1);
    }

    #[test]
    fn test_add_block_shortcut_inserts_after_active() {
        let mut ed = editor(&["a", "b"]);
        ed.set_active_block(Some("a".into()));
        assert_eq!(ed.handle_key(&key("alt+a")), Some(EditorCommand::AddBlock));

        assert_eq!(ed.state().len(), 3);
        let new_id = ed.active_block().cloned().unwrap();
        assert_eq!(ed.state().index_of(&new_id), Some(1));
    }

    #[test]
    fn test_delete_shortcut_moves_focus_to_neighbour() {
        let mut ed = editor(&["a", "b", "c"]);
        ed.set_active_block(Some("c".into()));
        ed.execute(EditorCommand::DeleteBlock);
        assert_eq!(order(&ed), vec!["a", "b"]);
        assert_eq!(ed.active_block(), Some(&BlockId::from("b")));

        ed.set_active_block(Some("a".into()));
        ed.execute(EditorCommand::DeleteBlock);
        assert_eq!(ed.active_block(), Some(&BlockId::from("b")));
    }

    #[test]
    fn test_block_commands_without_active_block_are_noops() {
        let mut ed = editor(&["a"]);
        for command in [
            EditorCommand::DeleteBlock,
            EditorCommand::DuplicateBlock,
            EditorCommand::MoveUp,
            EditorCommand::MoveDown,
        ] {
            assert!(!ed.execute(command));
        }
        ed.set_active_block(Some("gone".into()));
        assert!(!ed.execute(EditorCommand::DeleteBlock));
        assert_eq!(ed.history().action_count(), 0);
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut ed = editor(&["a", "b"]);
        ed.set_active_block(Some("a".into()));
        assert!(!ed.execute(EditorCommand::MoveUp));
        assert!(ed.execute(EditorCommand::MoveDown));
        assert_eq!(order(&ed), vec!["b", "a"]);
        assert!(!ed.execute(EditorCommand::MoveDown));
    }

    #[test]
    fn test_duplicate_shortcut_copies_active_block() {
        let mut ed = editor(&["a", "b"]);
        ed.set_active_block(Some("a".into()));
        assert!(ed.execute(EditorCommand::DuplicateBlock));
        let copy = ed.active_block().cloned().unwrap();
        assert_ne!(copy, BlockId::from("a"));
        assert_eq!(ed.state().index_of(&copy), Some(1));
        assert_eq!(ed.state().get(&copy).unwrap().content, para("a").content);
    }

    #[test]
    fn test_save_shortcut_calls_handler() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&saved);
        let mut ed = editor(&["a"]).with_save_handler(Box::new(move |state: &DocumentState| {
            sink.lock().unwrap().push(state.len());
        }));

        let event = KeyEvent::new(Key::Char('s'), Modifiers::META);
        assert_eq!(ed.handle_key(&event), Some(EditorCommand::Save));
        assert_eq!(*saved.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_save_without_handler_is_noop() {
        let mut ed = editor(&["a"]);
        assert!(!ed.execute(EditorCommand::Save));
    }

    #[test]
    fn test_shortcuts_ignored_in_text_input() {
        let mut ed = editor(&["a"]);
        ed.record_delete_block("a".into());
        let event = key("ctrl+z").with_focus(FocusTarget::TextArea);
        assert_eq!(ed.handle_key(&event), None);
        assert!(ed.state().is_empty());
    }

    #[test]
    fn test_recovery_prompt_and_recover() {
        let mut first = editor(&[]);
        first.record_add_block(para("x"), None, None);
        let store = first.recovery().store().clone();

        let mut second = Editor::new(doc(&[]), EditorConfig::default(), store).unwrap();
        let prompt = second.recovery_prompt().unwrap();
        assert!(second.recovery_prompt().is_none());

        second.recover(prompt);
        assert_eq!(order(&second), vec!["x"]);
        assert!(!second.can_undo());
    }

    #[test]
    fn test_discard_recovery_clears_store() {
        let mut first = editor(&[]);
        first.record_add_block(para("x"), None, None);
        let store = first.recovery().store().clone();

        let mut second = Editor::new(doc(&[]), EditorConfig::default(), store).unwrap();
        let prompt = second.recovery_prompt().unwrap();
        assert!(second.discard_recovery(prompt));
        assert!(second.recovery().store().is_empty());
        assert!(second.state().is_empty());
    }

    #[test]
    fn test_backstop_mirrors_state_after_record_removed() {
        let mut ed = editor(&["a"]);
        ed.record_add_block(para("b"), None, None);
        ed.recovery.store_mut().remove(RECOVERY_KEY).unwrap();

        assert!(ed.flush_recovery());
        let stored = ed.recovery().store().read(RECOVERY_KEY).unwrap().unwrap();
        assert!(stored.contains("\"b\""));
    }
}
