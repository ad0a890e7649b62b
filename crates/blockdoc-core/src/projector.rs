//! The state projector: derives document state by replaying actions.
//!
//! [`apply_action`] is pure and total. It never panics on a malformed
//! payload; any part of an action that references a block id no longer in
//! the document is skipped. Every call returns a freshly built state, so
//! replaying the same log from the same initial state any number of times
//! yields structurally equal results without touching the inputs.
//!
//! Undo and redo are implemented entirely in terms of [`replay`]: the cost
//! of deriving a state is linear in the number of retained actions, which
//! the history's `max_history_size` caps.

use std::collections::HashSet;

use crate::action::{Action, ActionPayload, Anchor};
use crate::block::Block;
use crate::document::DocumentState;
use crate::id::BlockId;

/// Applies one recorded action to `state`, returning the next state.
pub fn apply_action<C: Clone>(action: &Action<C>, state: &DocumentState<C>) -> DocumentState<C> {
    apply_payload(&action.payload, state)
}

/// Applies an action payload to `state`, returning the next state.
///
/// `MoveBlock` is a list splice that only happens when both indices are in
/// bounds and `block_ids[previous_index]` is the moved block; a move
/// recorded against a different order is skipped.
pub fn apply_payload<C: Clone>(
    payload: &ActionPayload<C>,
    state: &DocumentState<C>,
) -> DocumentState<C> {
    let mut next = state.clone();

    match payload {
        ActionPayload::AddBlock { block, anchor } => {
            insert_block(&mut next, block, anchor);
        }
        ActionPayload::UpdateBlock { block_id, updates } => {
            if let Some(existing) = next.blocks.get_mut(block_id) {
                *existing = existing.apply_patch(updates);
            }
        }
        ActionPayload::DeleteBlock { block_id } => {
            next.blocks.shift_remove(block_id);
            next.block_ids.retain(|id| id != block_id);
        }
        ActionPayload::MoveBlock {
            block_id,
            previous_index,
            new_index,
        } => {
            let len = next.block_ids.len();
            // Skip when the recorded position no longer holds the moved block.
            if *previous_index < len
                && *new_index < len
                && next.block_ids[*previous_index] == *block_id
            {
                let moved = next.block_ids.remove(*previous_index);
                next.block_ids.insert(*new_index, moved);
            }
        }
        ActionPayload::DuplicateBlock { original_id, block } => {
            let anchor = if next.contains(original_id) {
                Anchor::After(original_id.clone())
            } else {
                Anchor::End
            };
            insert_block(&mut next, block, &anchor);
        }
        ActionPayload::ReorderBlocks { block_ids } => {
            next.block_ids = reconcile_order(&next, block_ids);
        }
    }

    next
}

/// Folds `actions` over `initial`.
pub fn replay<'a, C: Clone + 'a>(
    initial: &DocumentState<C>,
    actions: impl IntoIterator<Item = &'a Action<C>>,
) -> DocumentState<C> {
    actions
        .into_iter()
        .fold(initial.clone(), |state, action| apply_action(action, &state))
}

/// Inserts `block` at `anchor`, replacing any block already stored under
/// the same id so ids stay unique.
fn insert_block<C: Clone>(state: &mut DocumentState<C>, block: &Block<C>, anchor: &Anchor) {
    if state.blocks.contains_key(&block.id) {
        state.block_ids.retain(|id| id != &block.id);
    }
    state.blocks.insert(block.id.clone(), block.clone());

    let position = match anchor {
        Anchor::After(id) => state.index_of(id).map(|idx| idx + 1),
        Anchor::Before(id) => state.index_of(id),
        Anchor::End => None,
    };

    match position {
        Some(idx) => state.block_ids.insert(idx, block.id.clone()),
        None => state.block_ids.push(block.id.clone()),
    }
}

/// Builds a render order from a requested one, keeping the document
/// invariant: unknown and repeated ids are dropped, and blocks the request
/// left out keep their relative order at the end.
fn reconcile_order<C>(state: &DocumentState<C>, requested: &[BlockId]) -> Vec<BlockId> {
    let mut seen: HashSet<&BlockId> = HashSet::with_capacity(requested.len());
    let mut order: Vec<BlockId> = requested
        .iter()
        .filter(|id| state.contains(id) && seen.insert(*id))
        .cloned()
        .collect();

    for id in &state.block_ids {
        if !seen.contains(id) {
            order.push(id.clone());
        }
    }
    order
}
