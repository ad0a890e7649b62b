//! Background autosave tasks.
//!
//! [`AutosaveTimers`] runs two tokio interval tasks against a shared
//! editor: the recovery backstop, which flushes debounced recovery writes,
//! and the periodic auto-snapshot. Both tasks are aborted by
//! [`AutosaveTimers::dispose`] or when the handle is dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use blockdoc_core::BlockContent;
use blockdoc_storage::RecoveryStore;

use crate::config::EditorConfig;
use crate::editor::Editor;

/// An editor shared between the UI and the timer tasks.
pub type SharedEditor<S, C = BlockContent> = Arc<Mutex<Editor<S, C>>>;

/// Handle to the running autosave tasks.
pub struct AutosaveTimers {
    storage: JoinHandle<()>,
    snapshot: JoinHandle<()>,
}

impl AutosaveTimers {
    /// Starts both timers. Neither fires until its first full period has
    /// elapsed.
    pub fn spawn<S, C>(editor: SharedEditor<S, C>, config: &EditorConfig) -> Self
    where
        S: RecoveryStore + Send + 'static,
        C: Clone + Serialize + DeserializeOwned + Send + 'static,
    {
        let storage = every(
            config.autosave.storage_interval,
            Arc::clone(&editor),
            |editor| {
                if editor.flush_recovery() {
                    tracing::debug!("Recovery backstop flushed pending changes");
                }
            },
        );
        let snapshot = every(config.autosave.auto_save_interval, editor, |editor| {
            editor.auto_snapshot();
        });
        AutosaveTimers { storage, snapshot }
    }

    /// Whether either task is still running.
    pub fn is_running(&self) -> bool {
        !self.storage.is_finished() || !self.snapshot.is_finished()
    }

    /// Stops both tasks.
    pub fn dispose(&mut self) {
        self.storage.abort();
        self.snapshot.abort();
        tracing::debug!("Autosave timers stopped");
    }
}

impl Drop for AutosaveTimers {
    fn drop(&mut self) {
        self.storage.abort();
        self.snapshot.abort();
    }
}

fn every<S, C, F>(period: Duration, editor: SharedEditor<S, C>, mut task: F) -> JoinHandle<()>
where
    S: RecoveryStore + Send + 'static,
    C: Clone + Serialize + DeserializeOwned + Send + 'static,
    F: FnMut(&mut Editor<S, C>) + Send + 'static,
{
    tokio::spawn(async move {
        let mut tick = tokio::time::interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tick.tick().await;
            let mut guard = editor.lock().await;
            task(&mut guard);
        }
    })
}
