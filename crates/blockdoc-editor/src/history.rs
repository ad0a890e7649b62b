//! The action log and its cursor.
//!
//! [`HistoryEngine`] owns the initial document state, the ordered list of
//! recorded actions and a cursor (`current_action_index`, where -1 means
//! "at the initial state"). The current state is always
//! `replay(initial_state, actions[0..=cursor])`; undo and redo only move the
//! cursor. Recording after an undo discards everything past the cursor, so
//! history is strictly linear.
//!
//! The log is capped at `max_history_size` actions. Pruned actions are
//! folded into the initial state, so the current state never changes when
//! pruning happens, but the pruned edits can no longer be undone.

use chrono::{DateTime, Utc};
use serde::Serialize;

use blockdoc_core::{
    apply_action, replay, Action, ActionId, ActionKind, BlockContent, DocumentState, NewAction,
    SnapshotId,
};

use crate::config::HistoryConfig;
use crate::error::EditorError;
use crate::snapshot::{Snapshot, SnapshotStore};

/// Description of the snapshot taken when a history is created.
pub const INITIAL_SNAPSHOT_DESCRIPTION: &str = "Initial state";

/// Timestamp format used in generated snapshot descriptions.
pub(crate) const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One line of the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: ActionId,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub kind: ActionKind,
    /// True for actions past the cursor (available to redo).
    pub undone: bool,
}

/// Linear undo/redo history with snapshots.
#[derive(Debug, Clone)]
pub struct HistoryEngine<C = BlockContent> {
    initial_state: DocumentState<C>,
    actions: Vec<Action<C>>,
    current_action_index: isize,
    config: HistoryConfig,
    snapshots: SnapshotStore<C>,
    /// Last action folded into `initial_state`, if any.
    base_action_id: Option<ActionId>,
    recorded_count: usize,
}

impl<C: Clone> HistoryEngine<C> {
    /// Creates a history rooted at `initial_state` and takes the
    /// "Initial state" snapshot.
    pub fn new(initial_state: DocumentState<C>, config: HistoryConfig) -> Self {
        let initial = Snapshot::capture(
            initial_state.clone(),
            ActionId::initial(),
            INITIAL_SNAPSHOT_DESCRIPTION,
            false,
        );
        let snapshots = SnapshotStore::new(initial, config.max_snapshots());
        HistoryEngine {
            initial_state,
            actions: Vec::new(),
            current_action_index: -1,
            config,
            snapshots,
            base_action_id: None,
            recorded_count: 0,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// The state the retained log replays from.
    pub fn initial_state(&self) -> &DocumentState<C> {
        &self.initial_state
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn current_action_index(&self) -> isize {
        self.current_action_index
    }

    pub fn actions(&self) -> &[Action<C>] {
        &self.actions
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Records an action at the cursor and returns its id.
    ///
    /// Any redo branch past the cursor is discarded first.
    pub fn record_action(&mut self, action: impl Into<NewAction<C>>) -> ActionId {
        let action = action.into().into_action();
        let id = action.id.clone();

        let keep = (self.current_action_index + 1) as usize;
        if keep < self.actions.len() {
            tracing::debug!(
                "Discarding {} redo action(s) past cursor {}",
                self.actions.len() - keep,
                self.current_action_index
            );
            self.actions.truncate(keep);
        }

        tracing::debug!("Recording {} action {}", action.kind(), id);
        self.actions.push(action);
        self.current_action_index = self.actions.len() as isize - 1;
        self.prune();

        self.recorded_count += 1;
        let interval = self.config.snapshot_interval_actions;
        if interval > 0 && self.recorded_count % interval == 0 {
            let description = format!("Auto-snapshot after {} actions", self.recorded_count);
            self.create_snapshot(self.current_state(), description, true);
        }

        id
    }

    /// Folds the oldest actions into the initial state until the log fits.
    fn prune(&mut self) {
        let max = self.config.max_history_size;
        if self.actions.len() <= max {
            return;
        }

        let excess = self.actions.len() - max;
        for action in self.actions.drain(..excess) {
            self.initial_state = apply_action(&action, &self.initial_state);
            self.base_action_id = Some(action.id);
        }
        self.current_action_index = (self.current_action_index - excess as isize).max(0);
        tracing::debug!("Pruned {} action(s) into the base state", excess);
    }

    // -----------------------------------------------------------------------
    // Cursor movement
    // -----------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.current_action_index >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_action_index < self.actions.len() as isize - 1
    }

    /// Steps the cursor back one action. `None` when already at the
    /// initial state.
    pub fn undo(&mut self) -> Option<DocumentState<C>> {
        if !self.can_undo() {
            return None;
        }
        self.current_action_index -= 1;
        Some(self.current_state())
    }

    /// Steps the cursor forward one action. `None` when already at the tip.
    pub fn redo(&mut self) -> Option<DocumentState<C>> {
        if !self.can_redo() {
            return None;
        }
        self.current_action_index += 1;
        Some(self.current_state())
    }

    /// Replays the log up to and including the cursor.
    pub fn current_state(&self) -> DocumentState<C> {
        let upto = (self.current_action_index + 1) as usize;
        replay(&self.initial_state, &self.actions[..upto])
    }

    /// Id of the action the cursor is on, or the base anchor when the
    /// cursor is at the initial state.
    pub fn cursor_action_id(&self) -> ActionId {
        if self.current_action_index >= 0 {
            self.actions[self.current_action_index as usize].id.clone()
        } else {
            self.base_anchor()
        }
    }

    fn base_anchor(&self) -> ActionId {
        self.base_action_id.clone().unwrap_or_else(ActionId::initial)
    }

    /// Resets the log so `state` becomes the new initial state.
    ///
    /// All actions and snapshots are dropped and a fresh "Initial state"
    /// snapshot is taken.
    pub fn clear(&mut self, state: DocumentState<C>) {
        self.actions.clear();
        self.current_action_index = -1;
        self.base_action_id = None;
        self.recorded_count = 0;
        self.snapshots.reset(Snapshot::capture(
            state.clone(),
            ActionId::initial(),
            INITIAL_SNAPSHOT_DESCRIPTION,
            false,
        ));
        self.initial_state = state;
        tracing::info!("History cleared");
    }

    /// Actions newest first, flagging the ones past the cursor.
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.actions
            .iter()
            .enumerate()
            .rev()
            .map(|(idx, action)| HistoryEntry {
                id: action.id.clone(),
                timestamp: action.timestamp,
                description: action.metadata.description.clone(),
                kind: action.kind(),
                undone: idx as isize > self.current_action_index,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Captures `state`, anchored to the action at the cursor.
    pub fn create_snapshot(
        &mut self,
        state: DocumentState<C>,
        description: impl Into<String>,
        auto_saved: bool,
    ) -> SnapshotId {
        let snapshot = Snapshot::capture(state, self.cursor_action_id(), description, auto_saved);
        tracing::info!(
            "Snapshot {} taken at action {} ({})",
            snapshot.id,
            snapshot.action_id,
            snapshot.metadata.description
        );
        self.snapshots.push(snapshot)
    }

    /// Captures the current state under a user-supplied name.
    pub fn save_named_snapshot(&mut self, name: &str) -> Result<SnapshotId, EditorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::SnapshotNameRequired);
        }
        Ok(self.create_snapshot(self.current_state(), name, false))
    }

    /// Timed snapshot of the current state.
    pub fn auto_snapshot(&mut self) -> SnapshotId {
        let description = format!("Auto-save {}", Utc::now().format(LABEL_FORMAT));
        self.create_snapshot(self.current_state(), description, true)
    }

    /// Returns the document to a snapshot.
    ///
    /// When the snapshot's action is still in the log the cursor moves
    /// there and redo stays available. Otherwise the snapshot's state
    /// becomes the new base of an empty log. `None` for an unknown id.
    pub fn restore_snapshot(&mut self, id: &SnapshotId) -> Option<DocumentState<C>> {
        let snapshot = self.snapshots.get(id)?;
        let anchor = snapshot.action_id.clone();

        if let Some(idx) = self.actions.iter().position(|a| a.id == anchor) {
            self.current_action_index = idx as isize;
            tracing::info!("Restored snapshot {} by moving cursor to {}", id, idx);
            return Some(self.current_state());
        }

        if anchor == self.base_anchor() {
            self.current_action_index = -1;
            tracing::info!("Restored snapshot {} at the base state", id);
            return Some(self.current_state());
        }

        let state = snapshot.state.clone();
        tracing::info!(
            "Snapshot {} anchor {} is no longer in the log; rebasing history on it",
            id,
            anchor
        );
        self.actions.clear();
        self.current_action_index = -1;
        self.base_action_id = if anchor.is_initial() {
            None
        } else {
            Some(anchor)
        };
        self.initial_state = state.clone();
        Some(state)
    }

    /// Snapshots newest first.
    pub fn snapshots(&self) -> Vec<&Snapshot<C>> {
        self.snapshots.newest_first()
    }

    pub fn snapshot(&self, id: &SnapshotId) -> Option<&Snapshot<C>> {
        self.snapshots.get(id)
    }

    /// Deletes a snapshot. The initial snapshot is kept.
    pub fn delete_snapshot(&mut self, id: &SnapshotId) -> bool {
        self.snapshots.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockdoc_core::{ActionPayload, Anchor, Block};

    fn add(id: &str) -> ActionPayload {
        ActionPayload::AddBlock {
            block: Block::new(id, BlockContent::Paragraph { text: id.into() }),
            anchor: Anchor::End,
        }
    }

    fn order(state: &DocumentState) -> Vec<String> {
        state.block_ids.iter().map(|id| id.to_string()).collect()
    }

    fn engine(max: usize, interval: usize) -> HistoryEngine {
        HistoryEngine::new(
            DocumentState::empty(),
            HistoryConfig {
                max_history_size: max,
                snapshot_interval_actions: interval,
            },
        )
    }

    #[test]
    fn test_new_engine_has_initial_snapshot() {
        let history = engine(10, 0);
        assert_eq!(history.current_action_index(), -1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        let snaps = history.snapshots();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].metadata.description, INITIAL_SNAPSHOT_DESCRIPTION);
        assert!(snaps[0].action_id.is_initial());
    }

    #[test]
    fn test_record_moves_cursor_to_tip() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.record_action(add("b"));
        assert_eq!(history.current_action_index(), 1);
        assert_eq!(order(&history.current_state()), vec!["a", "b"]);
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.record_action(add("b"));

        assert_eq!(order(&history.undo().unwrap()), vec!["a"]);
        assert_eq!(order(&history.undo().unwrap()), Vec::<String>::new());
        assert!(history.undo().is_none());
        assert_eq!(history.current_action_index(), -1);

        assert_eq!(order(&history.redo().unwrap()), vec!["a"]);
        assert_eq!(order(&history.redo().unwrap()), vec!["a", "b"]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_after_undo_truncates() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.record_action(add("b"));
        history.undo();
        history.record_action(add("c"));

        assert_eq!(history.action_count(), 2);
        assert!(!history.can_redo());
        assert_eq!(order(&history.current_state()), vec!["a", "c"]);
    }

    #[test]
    fn test_pruning_keeps_current_state() {
        let mut history = engine(3, 0);
        for id in ["a", "b", "c", "d", "e"] {
            history.record_action(add(id));
        }
        assert_eq!(history.action_count(), 3);
        assert_eq!(history.current_action_index(), 2);
        assert_eq!(order(&history.current_state()), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(order(history.initial_state()), vec!["a", "b"]);

        while history.undo().is_some() {}
        assert_eq!(order(&history.current_state()), vec!["a", "b"]);
    }

    #[test]
    fn test_action_count_snapshot_trigger() {
        let mut history = engine(50, 2);
        history.record_action(add("a"));
        assert_eq!(history.snapshots().len(), 1);
        history.record_action(add("b"));
        let snaps = history.snapshots();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].metadata.description, "Auto-snapshot after 2 actions");
        assert!(snaps[0].metadata.auto_saved);
    }

    #[test]
    fn test_named_snapshot_requires_name() {
        let mut history = engine(10, 0);
        assert!(matches!(
            history.save_named_snapshot("   "),
            Err(EditorError::SnapshotNameRequired)
        ));
        let id = history.save_named_snapshot(" Draft ").unwrap();
        assert_eq!(history.snapshot(&id).unwrap().metadata.description, "Draft");
    }

    #[test]
    fn test_restore_moves_cursor_and_keeps_redo() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        let snap = history.save_named_snapshot("after a").unwrap();
        history.record_action(add("b"));

        let restored = history.restore_snapshot(&snap).unwrap();
        assert_eq!(order(&restored), vec!["a"]);
        assert_eq!(history.current_action_index(), 0);
        assert!(history.can_redo());
    }

    #[test]
    fn test_restore_initial_snapshot_moves_to_start() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        let initial = history.snapshots().last().unwrap().id.clone();

        let restored = history.restore_snapshot(&initial).unwrap();
        assert!(restored.is_empty());
        assert_eq!(history.current_action_index(), -1);
        assert_eq!(history.action_count(), 1);
    }

    #[test]
    fn test_restore_unknown_snapshot_is_none() {
        let mut history = engine(10, 0);
        assert!(history.restore_snapshot(&SnapshotId::new()).is_none());
    }

    #[test]
    fn test_restore_of_truncated_anchor_rebases() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.record_action(add("b"));
        let snap = history.save_named_snapshot("ab").unwrap();
        history.undo();
        history.record_action(add("c"));

        let restored = history.restore_snapshot(&snap).unwrap();
        assert_eq!(order(&restored), vec!["a", "b"]);
        assert_eq!(history.action_count(), 0);
        assert!(!history.can_undo());

        history.record_action(add("d"));
        assert_eq!(order(&history.current_state()), vec!["a", "b", "d"]);
        assert_eq!(order(&history.undo().unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn test_history_entries_newest_first() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.record_action(NewAction::new(add("b")).with_description("Second"));
        history.undo();

        let entries = history.history_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "Second");
        assert!(entries[0].undone);
        assert_eq!(entries[1].description, "Add block");
        assert!(!entries[1].undone);
    }

    #[test]
    fn test_clear_resets_log_and_snapshots() {
        let mut history = engine(10, 0);
        history.record_action(add("a"));
        history.save_named_snapshot("x").unwrap();

        let base = history.current_state();
        history.clear(base.clone());
        assert_eq!(history.action_count(), 0);
        assert_eq!(history.current_state(), base);
        assert_eq!(history.snapshots().len(), 1);
    }

    #[test]
    fn test_delete_snapshot_keeps_initial() {
        let mut history = engine(10, 0);
        let initial = history.snapshots()[0].id.clone();
        let named = history.save_named_snapshot("n").unwrap();
        assert!(!history.delete_snapshot(&initial));
        assert!(history.delete_snapshot(&named));
        assert!(history.snapshot(&named).is_none());
    }
}
