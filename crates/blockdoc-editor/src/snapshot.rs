//! Point-in-time document snapshots.
//!
//! A [`Snapshot`] stores a full [`DocumentState`] together with the id of
//! the action the history cursor was on when it was taken. The
//! [`SnapshotStore`] keeps them in insertion order; the first entry is the
//! "Initial state" snapshot taken when the history was created and it is
//! never pruned or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blockdoc_core::{ActionId, BlockContent, DocumentState, SnapshotId};

/// Descriptive data attached to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub description: String,
    /// True for timer and action-count snapshots, false for named ones.
    pub auto_saved: bool,
}

/// A captured document state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<C = BlockContent> {
    pub id: SnapshotId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub state: DocumentState<C>,
    /// Action the cursor was on, or `"initial"` for the base state.
    pub action_id: ActionId,
    pub metadata: SnapshotMetadata,
}

impl<C> Snapshot<C> {
    /// Captures `state` now with a fresh id.
    pub fn capture(
        state: DocumentState<C>,
        action_id: ActionId,
        description: impl Into<String>,
        auto_saved: bool,
    ) -> Self {
        Snapshot {
            id: SnapshotId::new(),
            timestamp: Utc::now(),
            state,
            action_id,
            metadata: SnapshotMetadata {
                description: description.into(),
                auto_saved,
            },
        }
    }
}

/// Bounded, insertion-ordered snapshot list.
#[derive(Debug, Clone)]
pub struct SnapshotStore<C = BlockContent> {
    snapshots: Vec<Snapshot<C>>,
    capacity: usize,
}

impl<C> SnapshotStore<C> {
    /// A store seeded with its permanent first snapshot.
    pub fn new(initial: Snapshot<C>, capacity: usize) -> Self {
        SnapshotStore {
            snapshots: vec![initial],
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The permanent first snapshot.
    pub fn initial(&self) -> Option<&Snapshot<C>> {
        self.snapshots.first()
    }

    pub fn get(&self, id: &SnapshotId) -> Option<&Snapshot<C>> {
        self.snapshots.iter().find(|s| &s.id == id)
    }

    /// Appends `snapshot` and prunes down to capacity.
    ///
    /// Pruning keeps the first snapshot plus the newest remainder by
    /// timestamp; entries with equal timestamps keep insertion order.
    pub fn push(&mut self, snapshot: Snapshot<C>) -> SnapshotId {
        let id = snapshot.id.clone();
        self.snapshots.push(snapshot);
        self.prune();
        id
    }

    fn prune(&mut self) {
        if self.snapshots.len() <= self.capacity {
            return;
        }

        let keep_rest = self.capacity - 1;
        let mut rest: Vec<usize> = (1..self.snapshots.len()).collect();
        rest.sort_by_key(|&idx| self.snapshots[idx].timestamp);
        let mut keep = vec![false; self.snapshots.len()];
        keep[0] = true;
        for &idx in rest.iter().rev().take(keep_rest) {
            keep[idx] = true;
        }

        let before = self.snapshots.len();
        let mut flags = keep.into_iter();
        self.snapshots.retain(|_| flags.next().unwrap_or(false));
        tracing::debug!(
            "Pruned {} snapshot(s), {} retained",
            before - self.snapshots.len(),
            self.snapshots.len()
        );
    }

    /// Snapshots sorted newest first. Equal timestamps list the later
    /// insertion first.
    pub fn newest_first(&self) -> Vec<&Snapshot<C>> {
        let mut ordered: Vec<(usize, &Snapshot<C>)> = self.snapshots.iter().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| b.timestamp.cmp(&a.timestamp).then(ib.cmp(ia)));
        ordered.into_iter().map(|(_, s)| s).collect()
    }

    /// Deletes a snapshot. The first snapshot cannot be removed.
    pub fn remove(&mut self, id: &SnapshotId) -> bool {
        match self.snapshots.iter().position(|s| &s.id == id) {
            Some(0) | None => false,
            Some(idx) => {
                self.snapshots.remove(idx);
                true
            }
        }
    }

    /// Drops every snapshot and starts over from `initial`.
    pub fn reset(&mut self, initial: Snapshot<C>) {
        self.snapshots.clear();
        self.snapshots.push(initial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn snap(desc: &str, offset_secs: i64) -> Snapshot {
        let mut s = Snapshot::capture(DocumentState::empty(), ActionId::initial(), desc, true);
        s.timestamp = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(offset_secs);
        s
    }

    fn descriptions<'a>(list: impl IntoIterator<Item = &'a Snapshot>) -> Vec<&'a str> {
        list.into_iter()
            .map(|s| s.metadata.description.as_str())
            .collect()
    }

    #[test]
    fn test_push_within_capacity_keeps_all() {
        let mut store = SnapshotStore::new(snap("initial", 0), 3);
        store.push(snap("one", 1));
        store.push(snap("two", 2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_prune_keeps_first_and_newest() {
        let mut store = SnapshotStore::new(snap("initial", 0), 3);
        for (i, name) in ["one", "two", "three", "four"].iter().enumerate() {
            store.push(snap(name, i as i64 + 1));
        }
        assert_eq!(store.len(), 3);
        assert_eq!(
            descriptions(store.newest_first()),
            vec!["four", "three", "initial"]
        );
    }

    #[test]
    fn test_newest_first_ties_prefer_later_insertion() {
        let mut store = SnapshotStore::new(snap("initial", 5), 10);
        store.push(snap("a", 5));
        store.push(snap("b", 5));
        assert_eq!(descriptions(store.newest_first()), vec!["b", "a", "initial"]);
    }

    #[test]
    fn test_initial_cannot_be_removed() {
        let initial = snap("initial", 0);
        let initial_id = initial.id.clone();
        let mut store = SnapshotStore::new(initial, 5);
        let other = store.push(snap("other", 1));

        assert!(!store.remove(&initial_id));
        assert!(store.remove(&other));
        assert!(!store.remove(&other));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_replaces_everything() {
        let mut store = SnapshotStore::new(snap("initial", 0), 5);
        store.push(snap("x", 1));
        store.reset(snap("fresh", 2));
        assert_eq!(descriptions(store.newest_first()), vec!["fresh"]);
    }

    #[test]
    fn test_snapshot_json_flattens_state() {
        let s = snap("named", 0);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("blocks").is_some());
        assert!(json.get("blockIds").is_some());
        assert_eq!(json["actionId"], "initial");
        assert_eq!(json["metadata"]["autoSaved"], true);
    }
}
