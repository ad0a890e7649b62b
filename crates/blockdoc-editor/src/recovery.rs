//! Crash recovery: mirroring the live document to durable storage.
//!
//! [`RecoveryBridge`] writes the published document to a [`RecoveryStore`]
//! under [`RECOVERY_KEY`]. Two triggers share the single [`persist`] path:
//! an on-change trigger debounced by `persist_debounce`, and a periodic
//! [`flush`] backstop that writes the live state whenever a change is
//! outstanding (held back or rejected) or the record is missing. Storage
//! failures are logged and swallowed; the in-memory document stays
//! authoritative.
//!
//! On startup the bridge offers at most one [`RecoveryPrompt`]. The prompt is
//! consumed by value, either through [`RecoveryPrompt::recover`] or
//! [`RecoveryBridge::discard`], so it can only be resolved once.
//!
//! [`persist`]: RecoveryBridge::persist
//! [`flush`]: RecoveryBridge::flush

use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;

use blockdoc_core::{BlockContent, DocumentState};
use blockdoc_storage::{decode_record, encode_record, RecoveryStore, RECOVERY_KEY};

use crate::history::LABEL_FORMAT;

/// A recovery record found at startup, awaiting the user's decision.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPrompt<C = BlockContent> {
    pub state: DocumentState<C>,
    pub saved_at: Option<DateTime<Utc>>,
    /// Human-readable save time for the prompt text.
    pub label: String,
}

impl<C> RecoveryPrompt<C> {
    fn new(state: DocumentState<C>, saved_at: Option<DateTime<Utc>>) -> Self {
        let label = match saved_at {
            Some(at) => at.format(LABEL_FORMAT).to_string(),
            None => "unknown time".to_string(),
        };
        RecoveryPrompt {
            state,
            saved_at,
            label,
        }
    }

    /// Accepts the prompt, yielding the recovered document.
    pub fn recover(self) -> DocumentState<C> {
        self.state
    }
}

/// Debounced writer of the recovery record.
pub struct RecoveryBridge<S, C = BlockContent> {
    store: S,
    debounce: Duration,
    last_write: Option<Instant>,
    /// The live state has changed since the last successful write.
    dirty: bool,
    prompt_checked: bool,
    _content: PhantomData<fn() -> C>,
}

impl<S: RecoveryStore, C: Clone + Serialize + DeserializeOwned> RecoveryBridge<S, C> {
    pub fn new(store: S, debounce: Duration) -> Self {
        RecoveryBridge {
            store,
            debounce,
            last_write: None,
            dirty: false,
            prompt_checked: false,
            _content: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Whether the live state still needs writing: held back by the
    /// debounce, or rejected by the store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes `state` now. Returns false if the store rejected it, leaving
    /// the bridge dirty so the next [`flush`](Self::flush) retries.
    pub fn persist(&mut self, state: &DocumentState<C>) -> bool {
        let written = encode_record(state, Utc::now())
            .and_then(|raw| self.store.write(RECOVERY_KEY, &raw));
        match written {
            Ok(()) => {
                self.last_write = Some(Instant::now());
                self.dirty = false;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to persist recovery data: {}", e);
                self.dirty = true;
                false
            }
        }
    }

    /// On-change trigger. Writes immediately unless the previous write was
    /// within the debounce window, in which case the change waits for
    /// [`flush`](Self::flush).
    pub fn note_change(&mut self, state: &DocumentState<C>) {
        let recent = self
            .last_write
            .is_some_and(|at| at.elapsed() < self.debounce);
        if recent {
            self.dirty = true;
        } else {
            self.persist(state);
        }
    }

    /// Time-driven backstop: writes the live `state` when a change is
    /// outstanding or the store holds no record. Returns whether it wrote.
    pub fn flush(&mut self, state: &DocumentState<C>) -> bool {
        let missing = matches!(self.store.read(RECOVERY_KEY), Ok(None));
        if !self.dirty && !missing {
            return false;
        }
        self.persist(state)
    }

    /// Reads the stored record the first time it is called; later calls
    /// return `None`. Malformed data is logged and treated as absent.
    pub fn take_prompt(&mut self) -> Option<RecoveryPrompt<C>> {
        if self.prompt_checked {
            return None;
        }
        self.prompt_checked = true;

        let raw = match self.store.read(RECOVERY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read recovery data: {}", e);
                return None;
            }
        };

        match decode_record::<C>(&raw) {
            Ok(record) => {
                let saved_at = record.saved_at;
                let prompt = RecoveryPrompt::new(record.into_state(), saved_at);
                tracing::info!(
                    "Found recovery data with {} block(s) saved at {}",
                    prompt.state.len(),
                    prompt.label
                );
                Some(prompt)
            }
            Err(e) => {
                tracing::warn!("Ignoring malformed recovery data: {}", e);
                None
            }
        }
    }

    /// Declines the prompt and deletes the stored record.
    pub fn discard(&mut self, _prompt: RecoveryPrompt<C>) -> bool {
        match self.store.remove(RECOVERY_KEY) {
            Ok(removed) => {
                tracing::info!("Discarded recovery data");
                removed
            }
            Err(e) => {
                tracing::warn!("Failed to discard recovery data: {}", e);
                false
            }
        }
    }
}
